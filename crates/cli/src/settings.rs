//! Environment-driven settings.
//!
//! Every variable is optional. Values that fail to parse (or produce an
//! invalid configuration) are logged and ignored, keeping the defaults.

use core::str::FromStr;

use stockcast_forecast::{DEFAULT_HORIZON_DAYS, ForecastConfig};
use stockcast_observability::LogFormat;

pub const ENV_LAGS: &str = "STOCKCAST_LAGS";
pub const ENV_WINDOW: &str = "STOCKCAST_WINDOW";
pub const ENV_MIN_ROWS: &str = "STOCKCAST_MIN_ROWS";
pub const ENV_TREES: &str = "STOCKCAST_TREES";
pub const ENV_MAX_DEPTH: &str = "STOCKCAST_MAX_DEPTH";
pub const ENV_MIN_SPLIT: &str = "STOCKCAST_MIN_SPLIT";
pub const ENV_SEED: &str = "STOCKCAST_SEED";
pub const ENV_HORIZON_DAYS: &str = "STOCKCAST_HORIZON_DAYS";
pub const ENV_LOG_FORMAT: &str = "STOCKCAST_LOG_FORMAT";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub config: ForecastConfig,
    pub horizon: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config: ForecastConfig::default(),
            horizon: DEFAULT_HORIZON_DAYS,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = ForecastConfig::default();

        let config = ForecastConfig {
            lags: parse_or(&lookup, ENV_LAGS, defaults.lags),
            window: parse_or(&lookup, ENV_WINDOW, defaults.window),
            min_training_rows: parse_or(&lookup, ENV_MIN_ROWS, defaults.min_training_rows),
            n_trees: parse_or(&lookup, ENV_TREES, defaults.n_trees),
            max_depth: parse_or(&lookup, ENV_MAX_DEPTH, defaults.max_depth),
            min_samples_split: parse_or(&lookup, ENV_MIN_SPLIT, defaults.min_samples_split),
            seed: parse_or(&lookup, ENV_SEED, defaults.seed),
        };

        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                tracing::warn!(error = %e, "forecast settings from environment rejected; using defaults");
                defaults
            }
        };

        Self {
            config,
            horizon: parse_or(&lookup, ENV_HORIZON_DAYS, DEFAULT_HORIZON_DAYS),
        }
    }
}

/// Log format from `STOCKCAST_LOG_FORMAT`, plus the raw value if it was invalid.
///
/// Read before tracing is initialised, so the caller reports the problem.
pub fn log_format_from_env() -> (LogFormat, Option<String>) {
    match std::env::var(ENV_LOG_FORMAT) {
        Ok(raw) => match raw.parse::<LogFormat>() {
            Ok(format) => (format, None),
            Err(_) => (LogFormat::default(), Some(raw)),
        },
        Err(_) => (LogFormat::default(), None),
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparseable environment value");
            default
        }
    }
}
