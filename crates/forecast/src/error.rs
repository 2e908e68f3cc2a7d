//! Engine error model.

use thiserror::Error;

/// Failure inside the forecasting pipeline.
///
/// These never reach callers of [`crate::DemandForecaster::forecast`]; the
/// degradation policy turns each of them into a tagged fallback result.
/// Only [`crate::DemandForecaster::new`] surfaces one (invalid configuration).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ForecastError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("model training failed: {0}")]
    Training(String),

    #[error("prediction failed: {0}")]
    Prediction(String),

    /// A date fell outside the representable calendar range.
    #[error("calendar overflow after {0}")]
    CalendarOverflow(chrono::NaiveDate),

    #[error("fallback estimate is not finite: {0}")]
    NonFinite(f64),

    /// A panic was captured at the engine boundary.
    #[error("internal panic: {0}")]
    Panicked(String),
}

impl ForecastError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn training(msg: impl Into<String>) -> Self {
        Self::Training(msg.into())
    }

    pub fn prediction(msg: impl Into<String>) -> Self {
        Self::Prediction(msg.into())
    }

    /// Build a `Panicked` error from a `catch_unwind` payload.
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let msg = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::Panicked(msg)
    }
}
