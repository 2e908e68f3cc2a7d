//! Daily aggregation of raw consumption events.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use tracing::{debug, warn};

use crate::error::ForecastError;
use crate::event::ConsumptionEvent;

/// Contiguous, zero-filled daily quantity series.
///
/// Stored as a start date plus one quantity per consecutive day, so a gap
/// between two entries cannot be represented. The series only grows at the
/// end (`push_next`), which is how forecast steps are fed back as history.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    start: NaiveDate,
    quantities: Vec<f64>,
}

impl DailySeries {
    pub fn new(start: NaiveDate, quantities: Vec<f64>) -> Self {
        Self { start, quantities }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    pub fn quantities(&self) -> &[f64] {
        &self.quantities
    }

    /// Date of the `index`-th entry.
    pub fn date_at(&self, index: usize) -> Result<NaiveDate, ForecastError> {
        self.start
            .checked_add_days(Days::new(index as u64))
            .ok_or(ForecastError::CalendarOverflow(self.start))
    }

    /// Date immediately after the last entry.
    pub fn next_date(&self) -> Result<NaiveDate, ForecastError> {
        self.date_at(self.quantities.len())
    }

    pub fn push_next(&mut self, quantity: f64) {
        self.quantities.push(quantity);
    }

    /// Mean daily quantity; zero for an empty series.
    pub fn mean(&self) -> f64 {
        mean_or_zero(&self.quantities)
    }
}

/// Output of [`aggregate_daily`].
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    /// `None` when no event had a usable timestamp.
    pub series: Option<DailySeries>,
    /// Events dropped because their timestamp could not be parsed.
    pub discarded: usize,
}

/// Sum events per calendar day over the full observed date range.
///
/// Never fails: unreadable timestamps are skipped and counted.
pub fn aggregate_daily(events: &[ConsumptionEvent]) -> Aggregation {
    let mut per_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut discarded = 0usize;

    for event in events {
        match event.date() {
            Some(date) => *per_day.entry(date).or_insert(0.0) += f64::from(event.quantity),
            None => discarded += 1,
        }
    }

    if discarded > 0 {
        warn!(discarded, total = events.len(), "dropped events with unparseable timestamps");
    }

    let (Some((&first, _)), Some((&last, _))) = (per_day.first_key_value(), per_day.last_key_value())
    else {
        return Aggregation {
            series: None,
            discarded,
        };
    };

    let span = (last - first).num_days() as usize + 1;
    let mut quantities = vec![0.0; span];
    for (date, qty) in per_day {
        quantities[(date - first).num_days() as usize] = qty;
    }

    debug!(%first, %last, days = span, "aggregated consumption into daily series");

    Aggregation {
        series: Some(DailySeries::new(first, quantities)),
        discarded,
    }
}

/// Arithmetic mean, or zero when undefined (empty or non-finite).
pub fn mean_or_zero(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let m = xs.iter().sum::<f64>() / (xs.len() as f64);
    if m.is_finite() { m } else { 0.0 }
}
