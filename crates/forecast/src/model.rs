//! Random-forest regressor fitted per forecast call.

use std::panic::{self, AssertUnwindSafe};

use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use tracing::debug;

use crate::config::ForecastConfig;
use crate::error::ForecastError;
use crate::features::FeatureMatrix;

type Forest = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Fits [`TrainedModel`]s with the forest settings of a [`ForecastConfig`].
#[derive(Debug, Clone)]
pub struct ModelTrainer {
    n_trees: usize,
    max_depth: u16,
    min_samples_split: usize,
    seed: u64,
}

impl ModelTrainer {
    pub fn from_config(config: &ForecastConfig) -> Self {
        Self {
            n_trees: config.n_trees,
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            seed: config.seed,
        }
    }

    /// Every split considers all `n_features` columns.
    fn parameters(&self, n_features: usize) -> RandomForestRegressorParameters {
        RandomForestRegressorParameters::default()
            .with_n_trees(self.n_trees)
            .with_m(n_features)
            .with_max_depth(self.max_depth)
            .with_min_samples_split(self.min_samples_split)
            .with_seed(self.seed)
    }

    /// Fit on every row of `matrix`, target = `quantity`.
    ///
    /// No hold-out split: the model only extrapolates one step ahead.
    /// Errors and panics raised by the regressor both come back as
    /// [`ForecastError::Training`].
    pub fn fit(&self, matrix: &FeatureMatrix) -> Result<TrainedModel, ForecastError> {
        if matrix.is_empty() {
            return Err(ForecastError::training("feature matrix is empty"));
        }

        let features = matrix.features();
        let targets = matrix.targets();
        let params = self.parameters(matrix.columns.len());

        let fitted = panic::catch_unwind(AssertUnwindSafe(|| {
            let x = DenseMatrix::from_2d_vec(&features);
            Forest::fit(&x, &targets, params)
        }));

        let forest = match fitted {
            Ok(Ok(forest)) => forest,
            Ok(Err(failed)) => return Err(ForecastError::training(failed.to_string())),
            Err(payload) => {
                return Err(ForecastError::training(
                    ForecastError::from_panic(payload).to_string(),
                ));
            }
        };

        debug!(
            rows = matrix.len(),
            columns = matrix.columns.len(),
            trees = self.n_trees,
            "trained random forest"
        );

        Ok(TrainedModel {
            columns: matrix.columns.clone(),
            forest,
        })
    }
}

/// Fitted forest plus the feature columns it was trained on, in order.
///
/// Lives for one forecast call only.
pub struct TrainedModel {
    columns: Vec<String>,
    forest: Forest,
}

impl std::fmt::Debug for TrainedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrainedModel")
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}

impl TrainedModel {
    pub fn name(&self) -> &'static str {
        "RandomForestRegressor"
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Predict a single row already ordered like [`Self::columns`].
    pub fn predict_one(&self, values: &[f64]) -> Result<f64, ForecastError> {
        if values.len() != self.columns.len() {
            return Err(ForecastError::prediction(format!(
                "expected {} features, got {}",
                self.columns.len(),
                values.len()
            )));
        }

        let x = DenseMatrix::from_2d_vec(&vec![values.to_vec()]);
        let predicted = self
            .forest
            .predict(&x)
            .map_err(|e| ForecastError::prediction(e.to_string()))?;

        predicted
            .first()
            .copied()
            .ok_or_else(|| ForecastError::prediction("regressor returned no value"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daily::DailySeries;
    use crate::features::FeatureBuilder;
    use chrono::NaiveDate;

    fn matrix_of(quantities: Vec<f64>) -> FeatureMatrix {
        let series = DailySeries::new(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), quantities);
        FeatureBuilder::new(7, 7).build(&series).unwrap()
    }

    #[test]
    fn constant_history_predicts_the_constant() {
        let matrix = matrix_of(vec![3.0; 40]);
        let model = ModelTrainer::from_config(&ForecastConfig::default())
            .fit(&matrix)
            .unwrap();

        let row = matrix.rows.last().unwrap().values();
        let p = model.predict_one(&row).unwrap();
        assert!((p - 3.0).abs() < 1e-9, "prediction {p}");
        assert_eq!(model.columns(), matrix.columns.as_slice());
    }

    #[test]
    fn empty_matrix_is_a_training_error() {
        let matrix = matrix_of(vec![1.0; 3]);
        let err = ModelTrainer::from_config(&ForecastConfig::default())
            .fit(&matrix)
            .unwrap_err();
        assert!(matches!(err, ForecastError::Training(_)));
    }

    #[test]
    fn wrong_row_width_is_rejected() {
        let matrix = matrix_of((0..30).map(|i| (i % 4) as f64).collect());
        let model = ModelTrainer::from_config(&ForecastConfig::default().with_n_trees(5))
            .fit(&matrix)
            .unwrap();

        let err = model.predict_one(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, ForecastError::Prediction(_)));
    }

    #[test]
    fn weekly_spike_is_fit_exactly() {
        let week = [9.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let matrix = matrix_of(week.iter().copied().cycle().take(70).collect());
        let model = ModelTrainer::from_config(&ForecastConfig::default())
            .fit(&matrix)
            .unwrap();

        for row in &matrix.rows {
            let p = model.predict_one(&row.values()).unwrap();
            assert!((p - row.quantity).abs() < 1e-6, "{}: {p} vs {}", row.date, row.quantity);
        }
    }

    #[test]
    fn same_seed_same_prediction() {
        let matrix = matrix_of((0..45).map(|i| ((i * 7) % 5) as f64).collect());
        let trainer = ModelTrainer::from_config(&ForecastConfig::default());
        let row = matrix.rows[3].values();

        let a = trainer.fit(&matrix).unwrap().predict_one(&row).unwrap();
        let b = trainer.fit(&matrix).unwrap().predict_one(&row).unwrap();
        assert_eq!(a, b);
    }
}
