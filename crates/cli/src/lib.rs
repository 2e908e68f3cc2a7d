//! `stockcast-cli`
//!
//! **Responsibility:** thin caller around the forecasting engine.
//!
//! Loading events, parsing arguments and printing are caller concerns; any
//! failure here is an input problem. Forecasting itself never fails.

pub mod args;
pub mod report;
pub mod settings;

use std::io::Read;

use anyhow::Context;

use stockcast_forecast::{ConsumptionEvent, DemandForecaster};

pub use args::{Args, Input};
pub use report::ForecastReport;
pub use settings::Settings;

/// Parse a JSON array of consumption events.
pub fn parse_events(json: &str) -> anyhow::Result<Vec<ConsumptionEvent>> {
    serde_json::from_str(json).context("events must be a JSON array of {timestamp, quantity} objects")
}

/// Read the raw events document from the selected input.
pub fn read_input(input: &Input) -> anyhow::Result<String> {
    match input {
        Input::Stdin => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read events from stdin")?;
            Ok(buf)
        }
        Input::File(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read events file '{}'", path.display())),
    }
}

/// Run one forecast for already-loaded events.
pub fn run(args: &Args, settings: &Settings, events: &[ConsumptionEvent]) -> anyhow::Result<ForecastReport> {
    let forecaster =
        DemandForecaster::new(settings.config.clone()).context("invalid forecast configuration")?;
    let horizon = args.horizon.unwrap_or(settings.horizon);

    tracing::info!(
        item = args.item.as_deref().unwrap_or("-"),
        events = events.len(),
        horizon,
        "running forecast"
    );

    let forecast = forecaster.forecast(events, horizon);
    Ok(ForecastReport::new(forecast)
        .with_item(args.item.clone())
        .with_current_stock(args.stock))
}
