//! Engine configuration.

use crate::error::ForecastError;
use crate::features::FeatureBuilder;

/// Days forecast when the caller does not specify a horizon.
pub const DEFAULT_HORIZON_DAYS: u32 = 7;

/// Tunables for one [`crate::DemandForecaster`].
///
/// The defaults reproduce the reference behaviour: 7 lags, a 7-day rolling
/// window, at least 10 feature rows before a model is trained, and a
/// 100-tree forest (depth 10, min split 5) seeded with 42.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    /// Lag depth `L` (`lag_1..lag_L`).
    pub lags: usize,
    /// Rolling window width `W`.
    pub window: usize,
    /// Feature rows required before a model is trained.
    pub min_training_rows: usize,
    pub n_trees: usize,
    pub max_depth: u16,
    pub min_samples_split: usize,
    /// Forest seed; fixed so identical input yields identical output.
    pub seed: u64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            lags: 7,
            window: 7,
            min_training_rows: 10,
            n_trees: 100,
            max_depth: 10,
            min_samples_split: 5,
            seed: 42,
        }
    }
}

impl ForecastConfig {
    pub fn with_lags(mut self, lags: usize) -> Self {
        self.lags = lags;
        self
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn with_min_training_rows(mut self, rows: usize) -> Self {
        self.min_training_rows = rows;
        self
    }

    pub fn with_n_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    pub fn with_max_depth(mut self, max_depth: u16) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Days of history a feature row needs before it is defined.
    pub fn warmup_days(&self) -> usize {
        FeatureBuilder::new(self.lags, self.window).warmup_days()
    }

    pub fn validate(&self) -> Result<(), ForecastError> {
        if self.lags < 1 {
            return Err(ForecastError::invalid_config("lags must be >= 1"));
        }
        // Sample standard deviation needs two observations.
        if self.window < 2 {
            return Err(ForecastError::invalid_config("window must be >= 2"));
        }
        if self.min_training_rows < 1 {
            return Err(ForecastError::invalid_config(
                "min_training_rows must be >= 1",
            ));
        }
        if self.n_trees < 1 {
            return Err(ForecastError::invalid_config("n_trees must be >= 1"));
        }
        if self.max_depth < 1 {
            return Err(ForecastError::invalid_config("max_depth must be >= 1"));
        }
        if self.min_samples_split < 2 {
            return Err(ForecastError::invalid_config(
                "min_samples_split must be >= 2",
            ));
        }
        Ok(())
    }
}
