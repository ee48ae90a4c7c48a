//! # Portfolio Engine
//!
//! $$
//! \mathbf{w}^\* = \operatorname{Blend}_\alpha\big(\operatorname{Frontier}(\operatorname{MC}(\mu, \Sigma, r_f))\big)
//! $$
//!
//! High-level entry point: price series in, blended allocation out.

use std::time::Duration;
use std::time::Instant;

use tracing::debug;
use tracing::info;

use super::data::align_return_series;
use super::data::DateRange;
use super::data::PriceSeries;
use super::frontier::blend;
use super::frontier::check_risk_tolerance;
use super::frontier::select_frontier;
use super::moments::asset_stats;
use super::moments::estimate_moments;
use super::report::allocate;
use super::sampler::MonteCarloSampler;
use super::types::FinalAllocation;
use super::types::Frequency;
use super::types::WeightScheme;
use super::types::DEFAULT_MAX_ASSETS;
use super::types::DEFAULT_RISK_FREE_RATE;
use super::types::DEFAULT_TRIALS;
use crate::error::OptimizerError;
use crate::error::Result;

/// Runtime configuration for [`PortfolioEngine`].
#[derive(Clone, Debug)]
pub struct OptimizerConfig {
  /// Number of Monte Carlo trials.
  pub trials: usize,
  /// How random weights are drawn.
  pub weight_scheme: WeightScheme,
  /// Fixed seed for reproducible runs.
  pub seed: Option<u64>,
  /// Wall-clock budget for a whole [`PortfolioEngine::optimize`] call.
  pub deadline: Option<Duration>,
  /// Largest number of assets per request.
  pub max_assets: usize,
  /// Keep every trial in [`FinalAllocation::samples`].
  pub retain_samples: bool,
}

impl Default for OptimizerConfig {
  fn default() -> Self {
    Self {
      trials: DEFAULT_TRIALS,
      weight_scheme: WeightScheme::Uniform,
      seed: None,
      deadline: None,
      max_assets: DEFAULT_MAX_ASSETS,
      retain_samples: false,
    }
  }
}

/// Inputs of a single optimization.
#[derive(Clone, Debug)]
pub struct OptimizationRequest {
  /// One series per asset.
  pub prices: Vec<PriceSeries>,
  pub frequency: Frequency,
  /// Annualized decimal rate, e.g. `0.0435`.
  pub risk_free: f64,
  /// `0` picks the minimum-variance sample, `1` the maximum-Sharpe sample.
  pub risk_tolerance: f64,
  /// Amount split by the allocation report.
  pub total_investment: f64,
  /// Optional window applied to every series before conversion.
  pub range: Option<DateRange>,
}

impl Default for OptimizationRequest {
  fn default() -> Self {
    Self {
      prices: Vec::new(),
      frequency: Frequency::Daily,
      risk_free: DEFAULT_RISK_FREE_RATE,
      risk_tolerance: 0.5,
      total_investment: 0.0,
      range: None,
    }
  }
}

/// Percent input to decimal rate, falling back to [`DEFAULT_RISK_FREE_RATE`]
/// when the input is missing, NaN or negative.
pub fn risk_free_from_percent(percent: Option<f64>) -> f64 {
  match percent {
    Some(p) if p.is_finite() && p >= 0.0 => p / 100.0,
    _ => DEFAULT_RISK_FREE_RATE,
  }
}

/// Convert a 0..=100 slider value to a risk tolerance.
pub fn risk_tolerance_from_percent(percent: f64) -> f64 {
  percent / 100.0
}

/// Single entry-point engine for frontier optimization.
#[derive(Clone, Debug, Default)]
pub struct PortfolioEngine {
  config: OptimizerConfig,
}

impl PortfolioEngine {
  /// Construct a new engine with explicit configuration.
  pub fn new(config: OptimizerConfig) -> Self {
    Self { config }
  }

  /// Borrow engine configuration.
  pub fn config(&self) -> &OptimizerConfig {
    &self.config
  }

  fn validate(&self, request: &OptimizationRequest) -> Result<()> {
    let n = request.prices.len();
    if n < 2 {
      return Err(OptimizerError::InsufficientAssets(n));
    }
    if n > self.config.max_assets {
      return Err(OptimizerError::TooManyAssets {
        got: n,
        limit: self.config.max_assets,
      });
    }
    if self.config.trials == 0 {
      return Err(OptimizerError::invalid("trials", "at least one trial is required"));
    }
    if !request.risk_free.is_finite() || request.risk_free < 0.0 {
      return Err(OptimizerError::invalid(
        "risk_free",
        format!("must be a non-negative rate, got {}", request.risk_free),
      ));
    }
    check_risk_tolerance(request.risk_tolerance)?;
    if !request.total_investment.is_finite() || request.total_investment < 0.0 {
      return Err(OptimizerError::invalid(
        "total_investment",
        format!("must be a non-negative amount, got {}", request.total_investment),
      ));
    }
    Ok(())
  }

  /// Run the whole pipeline for `request`.
  pub fn optimize(&self, request: &OptimizationRequest) -> Result<FinalAllocation> {
    let started = Instant::now();
    self.validate(request)?;

    let symbols: Vec<String> = request
      .prices
      .iter()
      .map(|s| s.symbol().to_string())
      .collect();
    let returns: Vec<Vec<f64>> = request
      .prices
      .iter()
      .map(|s| match &request.range {
        Some(range) => s.within(range).log_returns(),
        None => s.log_returns(),
      })
      .collect();

    let aligned = align_return_series(&returns)?;
    let observations = aligned[0].len();
    debug!(assets = symbols.len(), observations, "aligned return series");

    let ann = request.frequency.annualization();
    let moments = estimate_moments(&aligned, ann)?;
    moments.ensure_finite()?;
    let asset_stats = asset_stats(&symbols, &aligned, ann);

    let sampler = MonteCarloSampler::new(
      self.config.trials,
      self.config.weight_scheme,
      self.config.seed,
      self.config.deadline,
    );
    let samples = sampler.run_since(&moments, request.risk_free, started)?;

    let extremes = select_frontier(&samples)?;
    let chosen = blend(&extremes, request.risk_tolerance, &moments, request.risk_free)?;
    let report = allocate(&symbols, &chosen.weights, request.total_investment)?;

    info!(
      expected_return = chosen.expected_return,
      volatility = chosen.volatility,
      risk_tolerance = request.risk_tolerance,
      elapsed_ms = started.elapsed().as_millis() as u64,
      "portfolio optimized"
    );

    Ok(FinalAllocation {
      symbols,
      weights: chosen.weights,
      expected_return: chosen.expected_return,
      volatility: chosen.volatility,
      sharpe: chosen.sharpe,
      risk_tolerance: request.risk_tolerance,
      risk_free: request.risk_free,
      min_variance: extremes.min_variance,
      max_sharpe: extremes.max_sharpe,
      moments,
      asset_stats,
      observations,
      report,
      samples: if self.config.retain_samples {
        samples
      } else {
        Vec::new()
      },
    })
  }
}

/// Optimize with the default configuration.
pub fn optimize(
  prices: Vec<PriceSeries>,
  frequency: Frequency,
  risk_free: f64,
  risk_tolerance: f64,
  total_investment: f64,
) -> Result<FinalAllocation> {
  PortfolioEngine::default().optimize(&OptimizationRequest {
    prices,
    frequency,
    risk_free,
    risk_tolerance,
    total_investment,
    range: None,
  })
}
