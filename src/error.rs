use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TelemetryError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("sample {index} is missing {field}")]
    MissingValue { index: usize, field: &'static str },
}

impl TelemetryError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        TelemetryError::InvalidInput(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Fails on empty input and on distances that are not finite and non-decreasing.
pub(crate) fn check_distances<I>(distances: I) -> Result<()>
where
    I: IntoIterator<Item = f64>,
{
    let mut prev: Option<f64> = None;
    let mut count = 0usize;
    for (i, d) in distances.into_iter().enumerate() {
        if !d.is_finite() {
            return Err(TelemetryError::invalid(format!(
                "distance at sample {} is not finite",
                i
            )));
        }
        if let Some(p) = prev {
            if d < p {
                return Err(TelemetryError::invalid(format!(
                    "distance decreases at sample {} ({:.1}m after {:.1}m)",
                    i, d, p
                )));
            }
        }
        prev = Some(d);
        count += 1;
    }
    if count == 0 {
        return Err(TelemetryError::invalid("empty sample sequence"));
    }
    Ok(())
}
