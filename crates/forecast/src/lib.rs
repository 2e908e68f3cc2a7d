//! `stockcast-forecast`
//!
//! **Responsibility:** short-horizon demand forecasting for one inventory item.
//!
//! Given every recorded consumption of an item and a horizon in days, the
//! engine returns the expected total consumption over that horizon:
//! - events are aggregated into a contiguous daily series,
//! - calendar, lag and rolling-window features are derived from it,
//! - a random forest is fitted on the full history,
//! - the forest is rolled forward one day at a time.
//!
//! When data is missing or a stage fails, a historical-mean estimate is
//! returned instead, tagged with the tier that produced it. The engine does
//! no I/O and keeps no state between calls.

pub mod config;
pub mod daily;
pub mod error;
pub mod event;
pub mod features;
pub mod model;
pub mod policy;
pub mod result;
pub mod rollout;

pub use config::{DEFAULT_HORIZON_DAYS, ForecastConfig};
pub use daily::{Aggregation, DailySeries, aggregate_daily};
pub use error::ForecastError;
pub use event::{ConsumptionEvent, parse_event_date};
pub use features::{CalendarFeatures, FeatureBuilder, FeatureMatrix, FeatureRow};
pub use model::{ModelTrainer, TrainedModel};
pub use policy::{Degraded, DemandForecaster, forecast_consumption, forecast_default_horizon};
pub use result::{ForecastMethod, ForecastResult};
pub use rollout::{IterativeForecaster, Rollout, align_to_columns};
