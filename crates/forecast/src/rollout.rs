//! Recursive one-step-ahead forecasting.
//!
//! Each step builds features for the next day from the history so far,
//! predicts it, and appends the prediction to that history. The same model
//! therefore serves any horizon, at the cost of compounding its own errors.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::daily::DailySeries;
use crate::error::ForecastError;
use crate::features::FeatureBuilder;
use crate::model::TrainedModel;
use crate::result::round_to;

/// Per-day predictions of one rollout.
#[derive(Debug, Clone, PartialEq)]
pub struct Rollout {
    pub daily: Vec<f64>,
    pub horizon: u32,
}

impl Rollout {
    pub fn total(&self) -> f64 {
        self.daily.iter().sum()
    }

    pub fn days_predicted(&self) -> u32 {
        self.daily.len() as u32
    }

    pub fn is_complete(&self) -> bool {
        self.days_predicted() >= self.horizon
    }
}

/// Drives a [`TrainedModel`] forward day by day.
#[derive(Debug)]
pub struct IterativeForecaster<'m> {
    model: &'m TrainedModel,
    builder: FeatureBuilder,
}

impl<'m> IterativeForecaster<'m> {
    pub fn new(model: &'m TrainedModel, builder: FeatureBuilder) -> Self {
        Self { model, builder }
    }

    /// Forecast `horizon` days following the end of `history`.
    ///
    /// Stops early (partial rollout) when the history is too short to build a
    /// feature row for the next day; days not reached count as zero.
    pub fn run(&self, mut history: DailySeries, horizon: u32) -> Result<Rollout, ForecastError> {
        let row_columns = self.builder.columns();
        // Grown per step: an early stop may leave most of `horizon` unused.
        let mut daily = Vec::new();

        for step in 0..horizon {
            let next_date = history.next_date()?;

            // The placeholder is the target slot only; lags and rolling
            // values for `next_date` come from the entries before it.
            let mut scratch = history.clone();
            scratch.push_next(0.0);

            let Some(row) = self.builder.last_row(&scratch)? else {
                warn!(
                    %next_date,
                    step,
                    history_days = history.len(),
                    "not enough history to build features; stopping rollout early"
                );
                break;
            };

            let aligned = align_to_columns(self.model.columns(), &row_columns, &row.values());
            let raw = self.model.predict_one(&aligned)?;
            let predicted = round_to(raw, 4).max(0.0);

            debug!(%next_date, raw, predicted, "forecast step");

            history.push_next(predicted);
            daily.push(predicted);
        }

        Ok(Rollout { daily, horizon })
    }
}

/// Reorder `values` (named by `columns`) into `target` order.
///
/// Columns the model expects but the row lacks are filled with zero; extra
/// row columns are ignored.
pub fn align_to_columns(target: &[String], columns: &[String], values: &[f64]) -> Vec<f64> {
    let by_name: HashMap<&str, f64> = columns
        .iter()
        .map(String::as_str)
        .zip(values.iter().copied())
        .collect();

    target
        .iter()
        .map(|name| by_name.get(name.as_str()).copied().unwrap_or(0.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForecastConfig;
    use crate::model::ModelTrainer;
    use chrono::NaiveDate;

    fn names(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|c| c.to_string()).collect()
    }

    fn series(quantities: Vec<f64>) -> DailySeries {
        DailySeries::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), quantities)
    }

    #[test]
    fn alignment_reorders_and_zero_fills() {
        let target = names(&["b", "missing", "a"]);
        let cols = names(&["a", "b", "extra"]);
        let aligned = align_to_columns(&target, &cols, &[1.0, 2.0, 3.0]);
        assert_eq!(aligned, vec![2.0, 0.0, 1.0]);
    }

    #[test]
    fn constant_history_rolls_forward_as_constant() {
        let builder = FeatureBuilder::new(7, 7);
        let matrix = builder.build(&series(vec![2.0; 30])).unwrap();
        let model = ModelTrainer::from_config(&ForecastConfig::default())
            .fit(&matrix)
            .unwrap();

        let rollout = IterativeForecaster::new(&model, builder)
            .run(matrix.target_series().unwrap(), 5)
            .unwrap();

        assert_eq!(rollout.daily, vec![2.0; 5]);
        assert!(rollout.is_complete());
        assert!((rollout.total() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn short_history_stops_early() {
        let builder = FeatureBuilder::new(7, 7);
        let matrix = builder.build(&series(vec![1.0; 30])).unwrap();
        let model = ModelTrainer::from_config(&ForecastConfig::default().with_n_trees(5))
            .fit(&matrix)
            .unwrap();

        // Five days cannot seed a 7-lag row.
        let rollout = IterativeForecaster::new(&model, builder)
            .run(series(vec![1.0; 5]), 3)
            .unwrap();

        assert_eq!(rollout.days_predicted(), 0);
        assert_eq!(rollout.total(), 0.0);
        assert!(!rollout.is_complete());
    }

    #[test]
    fn huge_horizon_on_short_history_stops_without_reserving() {
        let builder = FeatureBuilder::new(7, 7);
        let matrix = builder.build(&series(vec![1.0; 30])).unwrap();
        let model = ModelTrainer::from_config(&ForecastConfig::default().with_n_trees(5))
            .fit(&matrix)
            .unwrap();

        let rollout = IterativeForecaster::new(&model, builder)
            .run(series(vec![1.0; 5]), u32::MAX)
            .unwrap();

        assert_eq!(rollout.days_predicted(), 0);
        assert_eq!(rollout.horizon, u32::MAX);
        assert!(rollout.daily.capacity() < 1024);
    }

    #[test]
    fn zero_horizon_predicts_nothing() {
        let builder = FeatureBuilder::new(7, 7);
        let matrix = builder.build(&series(vec![1.0; 25])).unwrap();
        let model = ModelTrainer::from_config(&ForecastConfig::default().with_n_trees(3))
            .fit(&matrix)
            .unwrap();

        let rollout = IterativeForecaster::new(&model, builder)
            .run(matrix.target_series().unwrap(), 0)
            .unwrap();
        assert!(rollout.daily.is_empty());
        assert!(rollout.is_complete());
    }
}
