//! Forecast entry point and the degradation chain around it.
//!
//! Stages run in order (aggregate, features, train, roll out). A stage that
//! cannot continue returns a [`Degraded`] variant; the first one short-circuits
//! the chain and is turned into a tagged [`ForecastResult`]. Panics are caught
//! at the entry point, so callers always get a result back.

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, info, warn};

use crate::config::{DEFAULT_HORIZON_DAYS, ForecastConfig};
use crate::daily::{Aggregation, aggregate_daily, mean_or_zero};
use crate::error::ForecastError;
use crate::event::ConsumptionEvent;
use crate::features::FeatureBuilder;
use crate::model::ModelTrainer;
use crate::result::{ForecastMethod, ForecastResult};
use crate::rollout::IterativeForecaster;

/// Why the pipeline stopped before producing a model forecast.
#[derive(Debug, Clone, PartialEq)]
pub enum Degraded {
    NoHistory,
    UnparseableDates {
        raw_mean: f64,
        discarded: usize,
    },
    InsufficientHistory {
        rows: usize,
        required: usize,
        /// Days of history that would yield `required` rows.
        days_needed: usize,
        daily_mean: f64,
        discarded: usize,
    },
    TrainingFailed {
        source: ForecastError,
        daily_mean: f64,
        discarded: usize,
    },
    Critical(ForecastError),
}

impl Degraded {
    pub fn method(&self) -> ForecastMethod {
        match self {
            Degraded::NoHistory => ForecastMethod::NoHistory,
            Degraded::UnparseableDates { .. } => ForecastMethod::MeanErrorDate,
            Degraded::InsufficientHistory { .. } => ForecastMethod::MeanSimple,
            Degraded::TrainingFailed { .. } => ForecastMethod::MeanErrorTrain,
            Degraded::Critical(_) => ForecastMethod::MeanErrorCritical,
        }
    }

    /// Fallback result for this tier.
    pub fn into_result(self, events: &[ConsumptionEvent], horizon: u32) -> ForecastResult {
        let days = f64::from(horizon);
        match self {
            Degraded::NoHistory => ForecastResult::new(ForecastMethod::NoHistory, 0.0, 0, horizon)
                .with_message("No consumption history."),
            Degraded::UnparseableDates {
                raw_mean,
                discarded,
            } => ForecastResult::new(ForecastMethod::MeanErrorDate, raw_mean * days, horizon, horizon)
                .with_message(format!(
                    "No valid timestamp among {discarded} event(s). Using historical mean."
                ))
                .with_discarded_events(discarded),
            Degraded::InsufficientHistory {
                rows,
                required,
                days_needed,
                daily_mean,
                discarded,
            } => ForecastResult::new(ForecastMethod::MeanSimple, daily_mean * days, horizon, horizon)
                .with_message(format!(
                    "Insufficient history for a model ({rows} feature row(s), need {required}, i.e. {days_needed} days). Using historical daily mean."
                ))
                .with_discarded_events(discarded),
            Degraded::TrainingFailed {
                source,
                daily_mean,
                discarded,
            } => ForecastResult::new(ForecastMethod::MeanErrorTrain, daily_mean * days, horizon, horizon)
                .with_message(format!("{source}. Using historical daily mean."))
                .with_discarded_events(discarded),
            Degraded::Critical(cause) => critical_fallback(raw_mean(events), horizon, &cause),
        }
    }
}

/// Raw-mean estimate after a critical failure, or the terminal `error` tier
/// when even that total is unusable.
fn critical_fallback(mean: f64, horizon: u32, cause: &ForecastError) -> ForecastResult {
    match fallback_total(mean, horizon) {
        Ok(total) => ForecastResult::new(ForecastMethod::MeanErrorCritical, total, horizon, horizon)
            .with_message(format!("Unexpected error ({cause}). Using historical mean.")),
        Err(err) => ForecastResult::new(ForecastMethod::Error, 0.0, 0, horizon)
            .with_message(format!("Unrecoverable error ({cause}; {err}).")),
    }
}

/// `mean * horizon`, rejected when not finite.
///
/// Means of `u32` quantities are always finite; the check guards the
/// contract that a result never carries NaN or infinity.
fn fallback_total(mean: f64, horizon: u32) -> Result<f64, ForecastError> {
    let total = mean * f64::from(horizon);
    if !total.is_finite() {
        return Err(ForecastError::NonFinite(total));
    }
    Ok(total)
}

fn raw_mean(events: &[ConsumptionEvent]) -> f64 {
    let quantities: Vec<f64> = events.iter().map(|e| f64::from(e.quantity)).collect();
    mean_or_zero(&quantities)
}

/// Stateless demand forecaster.
///
/// Every call aggregates, builds features and trains its own model; nothing
/// is kept between calls, so one instance can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct DemandForecaster {
    config: ForecastConfig,
    builder: FeatureBuilder,
    trainer: ModelTrainer,
}

impl Default for DemandForecaster {
    fn default() -> Self {
        Self::from_valid(ForecastConfig::default())
    }
}

impl DemandForecaster {
    pub fn new(config: ForecastConfig) -> Result<Self, ForecastError> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: ForecastConfig) -> Self {
        Self {
            builder: FeatureBuilder::new(config.lags, config.window),
            trainer: ModelTrainer::from_config(&config),
            config,
        }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Forecast total consumption over the next `horizon` days.
    ///
    /// Never fails and never panics past this boundary.
    pub fn forecast(&self, events: &[ConsumptionEvent], horizon: u32) -> ForecastResult {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run_stages(events, horizon)));

        let result = match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(degraded)) => {
                warn!(method = %degraded.method(), reason = ?degraded, "forecast degraded to fallback");
                degraded.into_result(events, horizon)
            }
            Err(payload) => {
                let cause = ForecastError::from_panic(payload);
                warn!(error = %cause, "forecast pipeline panicked");
                Degraded::Critical(cause).into_result(events, horizon)
            }
        };

        info!(
            events = events.len(),
            horizon,
            method = %result.method,
            total = result.total,
            days_predicted = result.days_predicted,
            "forecast complete"
        );
        result
    }

    fn run_stages(
        &self,
        events: &[ConsumptionEvent],
        horizon: u32,
    ) -> Result<ForecastResult, Degraded> {
        if events.is_empty() {
            return Err(Degraded::NoHistory);
        }

        let Aggregation { series, discarded } = aggregate_daily(events);
        let series = series.ok_or_else(|| Degraded::UnparseableDates {
            raw_mean: raw_mean(events),
            discarded,
        })?;

        let matrix = self.builder.build(&series).map_err(Degraded::Critical)?;
        debug!(days = series.len(), rows = matrix.len(), "built feature matrix");

        if matrix.len() < self.config.min_training_rows {
            return Err(Degraded::InsufficientHistory {
                rows: matrix.len(),
                required: self.config.min_training_rows,
                days_needed: self.config.warmup_days() + self.config.min_training_rows,
                daily_mean: series.mean(),
                discarded,
            });
        }

        let model = self
            .trainer
            .fit(&matrix)
            .map_err(|source| Degraded::TrainingFailed {
                source,
                daily_mean: series.mean(),
                discarded,
            })?;

        let history = matrix.target_series().ok_or_else(|| {
            Degraded::Critical(ForecastError::prediction("feature matrix has no rows"))
        })?;

        let rollout = IterativeForecaster::new(&model, self.builder)
            .run(history, horizon)
            .map_err(Degraded::Critical)?;

        let mut message = format!(
            "Forecast ({}/{} days) generated with {}.",
            rollout.days_predicted(),
            horizon,
            model.name()
        );
        if !rollout.is_complete() {
            message.push_str(" Forecast may be partial: not enough history to cover the full horizon.");
        }

        Ok(ForecastResult::new(
            ForecastMethod::Model,
            rollout.total(),
            rollout.days_predicted(),
            horizon,
        )
        .with_message(message)
        .with_daily(rollout.daily)
        .with_discarded_events(discarded))
    }
}

/// Forecast with the default configuration.
pub fn forecast_consumption(events: &[ConsumptionEvent], horizon: u32) -> ForecastResult {
    DemandForecaster::default().forecast(events, horizon)
}

/// Forecast the default horizon with the default configuration.
pub fn forecast_default_horizon(events: &[ConsumptionEvent]) -> ForecastResult {
    forecast_consumption(events, DEFAULT_HORIZON_DAYS)
}
