use serde::{Deserialize, Serialize};

/// Which stage produced a [`ForecastResult`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ForecastMethod {
    /// Recursive forecast from the trained regressor.
    Model,
    NoHistory,
    /// No timestamp could be parsed; mean of raw quantities.
    MeanErrorDate,
    /// Too little history for a model; mean of the daily series.
    MeanSimple,
    /// The regressor failed to fit; mean of the daily series.
    MeanErrorTrain,
    /// Unexpected failure; mean of raw quantities.
    MeanErrorCritical,
    /// Even the critical fallback failed.
    Error,
}

impl ForecastMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastMethod::Model => "model",
            ForecastMethod::NoHistory => "no-history",
            ForecastMethod::MeanErrorDate => "mean-error-date",
            ForecastMethod::MeanSimple => "mean-simple",
            ForecastMethod::MeanErrorTrain => "mean-error-train",
            ForecastMethod::MeanErrorCritical => "mean-error-critical",
            ForecastMethod::Error => "error",
        }
    }
}

impl core::fmt::Display for ForecastMethod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one forecast call. Always produced, whatever went wrong.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Total expected consumption over the horizon (>= 0, 2 decimals).
    pub total: f64,

    /// Days actually covered; below `horizon` only for a partial model run.
    pub days_predicted: u32,

    pub horizon: u32,

    pub method: ForecastMethod,

    /// Human-readable diagnostic.
    pub message: String,

    /// Per-day predictions (model runs only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub daily: Vec<f64>,

    /// Events dropped for unparseable timestamps.
    #[serde(default)]
    pub discarded_events: usize,
}

impl ForecastResult {
    pub fn new(method: ForecastMethod, total: f64, days_predicted: u32, horizon: u32) -> Self {
        Self {
            total: round_to(total.max(0.0), 2),
            days_predicted,
            horizon,
            method,
            message: String::new(),
            daily: Vec::new(),
            discarded_events: 0,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_daily(mut self, daily: Vec<f64>) -> Self {
        self.daily = daily;
        self
    }

    pub fn with_discarded_events(mut self, discarded: usize) -> Self {
        self.discarded_events = discarded;
        self
    }

    pub fn is_complete(&self) -> bool {
        self.days_predicted >= self.horizon
    }
}

/// Round half away from zero to `decimals` places.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn methods_serialize_as_kebab_tags() {
        let json = serde_json::to_string(&ForecastMethod::MeanErrorCritical).unwrap();
        assert_eq!(json, "\"mean-error-critical\"");
        for method in [
            ForecastMethod::Model,
            ForecastMethod::NoHistory,
            ForecastMethod::MeanErrorDate,
            ForecastMethod::MeanSimple,
            ForecastMethod::MeanErrorTrain,
            ForecastMethod::MeanErrorCritical,
            ForecastMethod::Error,
        ] {
            let json = serde_json::to_string(&method).unwrap();
            assert_eq!(json, format!("\"{}\"", method.as_str()));
        }
    }

    #[test]
    fn totals_are_clamped_and_rounded() {
        let r = ForecastResult::new(ForecastMethod::MeanSimple, 12.34567, 7, 7);
        assert_eq!(r.total, 12.35);

        let r = ForecastResult::new(ForecastMethod::Model, -0.4, 1, 7);
        assert_eq!(r.total, 0.0);
        assert!(!r.is_complete());
    }

    #[test]
    fn empty_daily_is_omitted_from_json() {
        let r = ForecastResult::new(ForecastMethod::NoHistory, 0.0, 0, 7).with_message("none");
        let value = serde_json::to_value(&r).unwrap();
        assert!(value.get("daily").is_none());
        assert_eq!(value["method"], "no-history");
        assert_eq!(value["message"], "none");
    }
}
