use serde::{Deserialize, Serialize};

use stockcast_forecast::ForecastResult;

/// Forecast decorated with the caller's item context.
///
/// The engine knows nothing about items; the item name and the current stock
/// are whatever the caller passed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_stock: Option<i64>,

    pub forecast: ForecastResult,

    /// `current_stock - forecast.total`, when a stock was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projected_stock: Option<f64>,
}

impl ForecastReport {
    pub fn new(forecast: ForecastResult) -> Self {
        Self {
            item: None,
            current_stock: None,
            forecast,
            projected_stock: None,
        }
    }

    pub fn with_item(mut self, item: Option<String>) -> Self {
        self.item = item;
        self
    }

    pub fn with_current_stock(mut self, stock: Option<i64>) -> Self {
        self.current_stock = stock;
        self.projected_stock = stock.map(|s| {
            let projected = s as f64 - self.forecast.total;
            (projected * 100.0).round() / 100.0
        });
        self
    }
}
