//! # Portfolio Types
//!
//! $$
//! \mathrm{SR}(\mathbf{w})=\frac{\mathbf{w}^\top\mu-r_f}{\sqrt{\mathbf{w}^\top\Sigma\mathbf{w}}}
//! $$
//!
//! Shared enums, constants and result containers for the frontier optimizer.

use super::moments::MomentEstimate;
use super::report::AllocationReport;

/// Number of Monte Carlo trials used when nothing else is configured.
pub const DEFAULT_TRIALS: usize = 5000;

/// Risk-free rate used by callers when no quote is available (4.35 %).
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.0435;

/// Largest number of assets accepted per request by default.
pub const DEFAULT_MAX_ASSETS: usize = 20;

/// Volatility below this value is treated as zero.
pub const VOL_EPS: f64 = 1e-15;

/// Sampling frequency of the price series.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Frequency {
  #[default]
  Daily,
  Weekly,
  Monthly,
}

impl Frequency {
  /// Parse a frequency tag. Unknown tags fall back to [`Frequency::Daily`].
  pub fn from_str(s: &str) -> Self {
    match s.trim().to_lowercase().as_str() {
      "w" | "weekly" => Self::Weekly,
      "m" | "monthly" => Self::Monthly,
      _ => Self::Daily,
    }
  }

  /// Periods per year.
  pub fn annualization(&self) -> f64 {
    match self {
      Self::Daily => 252.0,
      Self::Weekly => 52.0,
      Self::Monthly => 12.0,
    }
  }
}

/// How random long-only weight vectors are drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WeightScheme {
  /// Independent U[0,1) draws normalized by their sum.
  #[default]
  Uniform,
  /// Independent Exp(1) draws normalized by their sum, i.e. Dirichlet(1, ..., 1).
  FlatDirichlet,
}

/// One evaluated portfolio.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PortfolioSample {
  /// Long-only weights summing to one.
  pub weights: Vec<f64>,
  /// Expected annualized return `w'mu`.
  pub expected_return: f64,
  /// Annualized volatility `sqrt(w' Sigma w)`.
  pub volatility: f64,
  /// `(expected_return - risk_free) / volatility`, `None` when volatility is zero.
  pub sharpe: Option<f64>,
}

/// Per-asset annualized statistics on the aligned window.
#[derive(Clone, Debug, PartialEq)]
pub struct AssetStats {
  pub symbol: String,
  /// Annualized mean log-return.
  pub mu: f64,
  /// Annualized standard deviation of log-returns.
  pub sigma: f64,
}

/// Output of one optimization request.
#[derive(Clone, Debug, PartialEq)]
pub struct FinalAllocation {
  /// Asset symbols in input order.
  pub symbols: Vec<String>,
  /// Blended weights.
  pub weights: Vec<f64>,
  /// Expected return of the blended weights, recomputed from `mu`.
  pub expected_return: f64,
  /// Volatility of the blended weights, recomputed from `Sigma`.
  pub volatility: f64,
  /// Sharpe ratio of the blended weights, `None` when volatility is zero.
  pub sharpe: Option<f64>,
  /// Risk tolerance used for the blend.
  pub risk_tolerance: f64,
  /// Risk-free rate used for every Sharpe ratio of the run.
  pub risk_free: f64,
  /// Lowest volatility sample.
  pub min_variance: PortfolioSample,
  /// Highest Sharpe sample.
  pub max_sharpe: PortfolioSample,
  /// Annualized moments the samples were evaluated against.
  pub moments: MomentEstimate,
  pub asset_stats: Vec<AssetStats>,
  /// Number of aligned return observations per asset.
  pub observations: usize,
  /// Currency breakdown of `weights`.
  pub report: AllocationReport,
  /// Every trial, only filled when the engine retains samples.
  pub samples: Vec<PortfolioSample>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn frequency_tags_map_to_annualization() {
    assert_eq!(Frequency::from_str("d").annualization(), 252.0);
    assert_eq!(Frequency::from_str("Weekly").annualization(), 52.0);
    assert_eq!(Frequency::from_str(" m ").annualization(), 12.0);
    assert_eq!(Frequency::from_str("hourly"), Frequency::Daily);
    assert_eq!(Frequency::from_str(""), Frequency::Daily);
  }
}
