//! # Allocation Report
//!
//! $$
//! A_i = w_i^\* \cdot T
//! $$
//!
//! Currency breakdown of a weight vector.

use std::fmt;

use prettytable::format;
use prettytable::Cell;
use prettytable::Row;
use prettytable::Table;

use crate::error::OptimizerError;
use crate::error::Result;

/// Weight and amount for one asset.
#[derive(Clone, Debug, PartialEq)]
pub struct AllocationLine {
  pub symbol: String,
  pub weight: f64,
  pub amount: f64,
}

/// Per-asset amounts for a total investment.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AllocationReport {
  pub total: f64,
  pub lines: Vec<AllocationLine>,
}

/// Split `total` across `symbols` by `weights`.
pub fn allocate(symbols: &[String], weights: &[f64], total: f64) -> Result<AllocationReport> {
  if !total.is_finite() || total < 0.0 {
    return Err(OptimizerError::invalid(
      "total_investment",
      format!("must be a non-negative amount, got {total}"),
    ));
  }
  if symbols.len() != weights.len() {
    return Err(OptimizerError::invalid(
      "weights",
      format!("{} weights for {} symbols", weights.len(), symbols.len()),
    ));
  }

  let lines = symbols
    .iter()
    .zip(weights)
    .map(|(symbol, &weight)| AllocationLine {
      symbol: symbol.clone(),
      weight,
      amount: weight * total,
    })
    .collect();

  Ok(AllocationReport { total, lines })
}

/// `0.1234` -> `"12.34 %"`.
pub fn format_percent(x: f64) -> String {
  format!("{:.2} %", x * 100.0)
}

/// Whole US dollars with thousands separators, e.g. `"$12,346"`.
pub fn format_usd(amount: f64) -> String {
  let rounded = amount.round();
  let digits = format!("{:.0}", rounded.abs());

  let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
  for (i, c) in digits.chars().enumerate() {
    if i > 0 && (digits.len() - i) % 3 == 0 {
      grouped.push(',');
    }
    grouped.push(c);
  }

  if rounded < 0.0 {
    format!("-${grouped}")
  } else {
    format!("${grouped}")
  }
}

impl AllocationReport {
  pub fn to_table(&self) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(Row::new(vec![
      Cell::new("Asset"),
      Cell::new("Weight"),
      Cell::new("Amount"),
    ]));
    for line in &self.lines {
      table.add_row(Row::new(vec![
        Cell::new(&line.symbol),
        Cell::new(&format_percent(line.weight)),
        Cell::new(&format_usd(line.amount)),
      ]));
    }
    table
  }
}

impl fmt::Display for AllocationReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "Allocation of {} invested:", format_usd(self.total))?;
    write!(f, "{}", self.to_table())
  }
}
