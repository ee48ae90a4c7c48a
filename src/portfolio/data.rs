//! # Portfolio Data Utilities
//!
//! $$
//! r_t = \ln\frac{P_{t+1}}{P_t}
//! $$
//!
//! Price rows, date windows, log-return conversion and tail alignment.

use chrono::Datelike;
use chrono::Months;
use chrono::NaiveDate;
use impl_new_derive::ImplNew;
use tracing::warn;

use crate::error::OptimizerError;
use crate::error::Result;

/// One closing price observation.
#[derive(ImplNew, Clone, Copy, Debug, PartialEq)]
pub struct PricePoint {
  pub date: NaiveDate,
  /// `None` when the source row had no usable close.
  pub close: Option<f64>,
}

/// Closing prices of a single asset, ascending by date.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceSeries {
  symbol: String,
  points: Vec<PricePoint>,
}

impl PriceSeries {
  /// Build a series; rows are ordered by date.
  pub fn new(symbol: impl Into<String>, mut points: Vec<PricePoint>) -> Self {
    points.sort_by_key(|p| p.date);
    Self {
      symbol: symbol.into(),
      points,
    }
  }

  /// Build a series of consecutive calendar days starting at `start`.
  pub fn from_closes(symbol: impl Into<String>, start: NaiveDate, closes: &[f64]) -> Self {
    let points = start
      .iter_days()
      .zip(closes)
      .map(|(date, &close)| PricePoint::new(date, Some(close)))
      .collect();
    Self::new(symbol, points)
  }

  pub fn symbol(&self) -> &str {
    &self.symbol
  }

  pub fn points(&self) -> &[PricePoint] {
    &self.points
  }

  pub fn len(&self) -> usize {
    self.points.len()
  }

  pub fn is_empty(&self) -> bool {
    self.points.is_empty()
  }

  pub fn first_date(&self) -> Option<NaiveDate> {
    self.points.first().map(|p| p.date)
  }

  pub fn last_date(&self) -> Option<NaiveDate> {
    self.points.last().map(|p| p.date)
  }

  /// Rows whose date falls inside `range`.
  pub fn within(&self, range: &DateRange) -> Self {
    Self {
      symbol: self.symbol.clone(),
      points: self
        .points
        .iter()
        .filter(|p| range.contains(p.date))
        .copied()
        .collect(),
    }
  }

  /// Log-returns of consecutive closes; see [`log_returns_series`].
  pub fn log_returns(&self) -> Vec<f64> {
    let closes: Vec<Option<f64>> = self.points.iter().map(|p| p.close).collect();
    let out = log_returns_series(&closes);

    let skipped = self.points.len().saturating_sub(1) - out.len();
    if skipped > 0 {
      warn!(symbol = %self.symbol, skipped, "dropped price pairs with a missing or non-positive close");
    }
    out
  }
}

/// Inclusive calendar window. An open bound does not filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateRange {
  pub start: Option<NaiveDate>,
  pub end: Option<NaiveDate>,
}

impl DateRange {
  /// Custom window, `start <= end`.
  pub fn between(start: NaiveDate, end: NaiveDate) -> Result<Self> {
    if start > end {
      return Err(OptimizerError::invalid(
        "date_range",
        format!("start {start} is after end {end}"),
      ));
    }
    Ok(Self {
      start: Some(start),
      end: Some(end),
    })
  }

  /// Window covering the last `years` years up to and including `today`.
  ///
  /// A 29 February anchor falls back to 28 February of the target year.
  pub fn last_years(years: u32, today: NaiveDate) -> Result<Self> {
    let start = today
      .checked_sub_months(Months::new(years.saturating_mul(12)))
      .ok_or_else(|| {
        OptimizerError::invalid(
          "years",
          format!("{years} years before {} is out of range", today.year()),
        )
      })?;
    Self::between(start, today)
  }

  pub fn contains(&self, date: NaiveDate) -> bool {
    self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
  }
}

fn usable(close: Option<f64>) -> Option<f64> {
  close.filter(|c| c.is_finite() && *c > 0.0)
}

/// Convert close prices to a log-return series.
///
/// Pairs where either close is missing, non-finite or not strictly positive are
/// skipped, so the output may be shorter than `closes.len() - 1`.
pub fn log_returns_series(closes: &[Option<f64>]) -> Vec<f64> {
  let mut out = Vec::with_capacity(closes.len().saturating_sub(1));
  for pair in closes.windows(2) {
    if let (Some(p0), Some(p1)) = (usable(pair[0]), usable(pair[1])) {
      out.push((p1 / p0).ln());
    }
  }
  out
}

/// Align multiple return series to their common tail length.
///
/// Each series keeps its most recent `L = min(len)` observations. Fails when
/// `L < 2`.
pub fn align_return_series(all_returns: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
  let min_len = all_returns.iter().map(|r| r.len()).min().unwrap_or(0);
  if min_len < 2 {
    return Err(OptimizerError::InsufficientHistory(min_len));
  }

  Ok(
    all_returns
      .iter()
      .map(|r| r[r.len() - min_len..].to_vec())
      .collect(),
  )
}
