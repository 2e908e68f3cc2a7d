//! Calendar, lag and rolling-window features over a daily series.

use chrono::{Datelike, NaiveDate};

use crate::daily::{DailySeries, mean_or_zero};
use crate::error::ForecastError;

const CALENDAR_COLUMNS: [&str; 6] = [
    "day_of_week",
    "iso_week",
    "month",
    "day_of_month",
    "day_of_year",
    "year",
];

/// Calendar fields derived from a single date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFeatures {
    /// Monday = 0 .. Sunday = 6.
    pub day_of_week: u32,
    pub iso_week: u32,
    pub month: u32,
    pub day_of_month: u32,
    pub day_of_year: u32,
    pub year: i32,
}

impl CalendarFeatures {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            day_of_week: date.weekday().num_days_from_monday(),
            iso_week: date.iso_week().week(),
            month: date.month(),
            day_of_month: date.day(),
            day_of_year: date.ordinal(),
            year: date.year(),
        }
    }

    fn values(&self) -> [f64; 6] {
        [
            f64::from(self.day_of_week),
            f64::from(self.iso_week),
            f64::from(self.month),
            f64::from(self.day_of_month),
            f64::from(self.day_of_year),
            f64::from(self.year),
        ]
    }
}

/// Fully defined feature row for one date.
///
/// `lags[i]` is the quantity `i + 1` days earlier. The rolling statistics
/// cover the `window` days before `date`; the current day is never included.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub date: NaiveDate,
    /// Target column.
    pub quantity: f64,
    pub calendar: CalendarFeatures,
    pub lags: Vec<f64>,
    pub rolling_mean: f64,
    pub rolling_std: f64,
}

impl FeatureRow {
    /// Feature values in [`FeatureBuilder::columns`] order (target excluded).
    pub fn values(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(CALENDAR_COLUMNS.len() + self.lags.len() + 2);
        out.extend_from_slice(&self.calendar.values());
        out.extend_from_slice(&self.lags);
        out.push(self.rolling_mean);
        out.push(self.rolling_std);
        out
    }
}

/// Ordered feature rows plus the column names of [`FeatureRow::values`].
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub columns: Vec<String>,
    pub rows: Vec<FeatureRow>,
}

impl FeatureMatrix {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Feature sub-matrix, one `Vec` per row.
    pub fn features(&self) -> Vec<Vec<f64>> {
        self.rows.iter().map(FeatureRow::values).collect()
    }

    pub fn targets(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.quantity).collect()
    }

    /// The target column as a daily series starting at the first row.
    ///
    /// Rows are consecutive days, so this is contiguous by construction.
    pub fn target_series(&self) -> Option<DailySeries> {
        let first = self.rows.first()?;
        Some(DailySeries::new(first.date, self.targets()))
    }
}

/// Builds [`FeatureRow`]s with lag depth `lags` and rolling width `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureBuilder {
    lags: usize,
    window: usize,
}

impl FeatureBuilder {
    pub fn new(lags: usize, window: usize) -> Self {
        Self { lags, window }
    }

    /// Days of history a feature row needs before it is defined.
    pub fn warmup_days(&self) -> usize {
        self.lags.max(self.window)
    }

    pub fn columns(&self) -> Vec<String> {
        let mut cols: Vec<String> = CALENDAR_COLUMNS.iter().map(|c| c.to_string()).collect();
        cols.extend((1..=self.lags).map(|i| format!("lag_{i}")));
        cols.push(format!("rolling_mean_{}", self.window));
        cols.push(format!("rolling_std_{}", self.window));
        cols
    }

    /// Rows for every date with a complete feature set; earlier dates are
    /// dropped, not imputed.
    pub fn build(&self, series: &DailySeries) -> Result<FeatureMatrix, ForecastError> {
        let warmup = self.warmup_days();
        let mut rows = Vec::with_capacity(series.len().saturating_sub(warmup));
        for index in warmup..series.len() {
            if let Some(row) = self.row_at(series, index)? {
                rows.push(row);
            }
        }
        Ok(FeatureMatrix {
            columns: self.columns(),
            rows,
        })
    }

    /// Feature row for entry `index`, or `None` while history is too short.
    ///
    /// Only entries strictly before `index` feed the lag and rolling values.
    pub fn row_at(
        &self,
        series: &DailySeries,
        index: usize,
    ) -> Result<Option<FeatureRow>, ForecastError> {
        let q = series.quantities();
        if index >= q.len() || index < self.warmup_days() {
            return Ok(None);
        }

        let preceding = &q[index - self.window..index];
        let rolling_mean = mean_or_zero(preceding);
        let Some(rolling_std) = stddev_sample(preceding, rolling_mean) else {
            return Ok(None);
        };

        let date = series.date_at(index)?;
        Ok(Some(FeatureRow {
            date,
            quantity: q[index],
            calendar: CalendarFeatures::from_date(date),
            lags: (1..=self.lags).map(|lag| q[index - lag]).collect(),
            rolling_mean,
            rolling_std,
        }))
    }

    /// Row for the last entry of `series`.
    pub fn last_row(&self, series: &DailySeries) -> Result<Option<FeatureRow>, ForecastError> {
        match series.len() {
            0 => Ok(None),
            n => self.row_at(series, n - 1),
        }
    }
}

/// Sample standard deviation (n-1); undefined below two samples.
fn stddev_sample(xs: &[f64], mean: f64) -> Option<f64> {
    if xs.len() < 2 {
        return None;
    }
    let var = xs
        .iter()
        .map(|x| {
            let d = x - mean;
            d * d
        })
        .sum::<f64>()
        / ((xs.len() - 1) as f64);
    Some(var.sqrt())
}
