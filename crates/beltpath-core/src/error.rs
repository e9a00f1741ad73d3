use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BeltError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("at least two pulleys are required, got {count}")]
    InsufficientPulleys { count: usize },

    #[error(
        "pulleys {first} and {second} are too close together: {distance} < {minimum}"
    )]
    PulleysTooClose {
        first: usize,
        second: usize,
        distance: f64,
        minimum: f64,
    },

    /// A belt can only pull. Raised when the solved tension distribution
    /// would need a segment to push.
    #[error("you can't push on a rope: tension in segment {index} is {tension}")]
    NegativeTension { index: usize, tension: f64 },

    #[error(
        "belt length did not converge after {iterations} iterations: {length} vs target {target} ({hint})"
    )]
    NoConvergence {
        iterations: usize,
        length: f64,
        target: f64,
        hint: &'static str,
    },
}

impl BeltError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn index_out_of_range(name: &str, index: usize, len: usize) -> Self {
        Self::InvalidArgument(format!(
            "{name} index must be between 0 and {}, got {index}",
            len.saturating_sub(1)
        ))
    }
}

pub type Result<T> = std::result::Result<T, BeltError>;

/// Rejects NaN and infinities.
pub(crate) fn ensure_finite(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(BeltError::invalid_argument(format!(
            "{name} must be a finite number, got {value}"
        )))
    }
}

/// Finite and not negative. Used for tensions and display scales.
pub(crate) fn ensure_non_negative(name: &str, value: f64) -> Result<f64> {
    ensure_finite(name, value)?;
    if value < 0.0 {
        return Err(BeltError::invalid_argument(format!(
            "{name} cannot be a negative number, got {value}"
        )));
    }
    Ok(value)
}

/// Finite and strictly positive. Used for lengths and tolerances.
pub(crate) fn ensure_positive(name: &str, value: f64) -> Result<f64> {
    ensure_finite(name, value)?;
    if value <= 0.0 {
        return Err(BeltError::invalid_argument(format!(
            "{name} must be positive, got {value}"
        )));
    }
    Ok(value)
}
