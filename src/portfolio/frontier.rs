//! # Frontier Selection
//!
//! $$
//! \mathbf{w}^\*=(1-\alpha)\,\mathbf{w}_{\min\sigma}+\alpha\,\mathbf{w}_{\max\mathrm{SR}}
//! $$
//!
//! Extremes of the sampled cloud and the risk-tolerance blend between them.

use tracing::debug;

use super::moments::MomentEstimate;
use super::sampler::evaluate;
use super::types::PortfolioSample;
use crate::error::OptimizerError;
use crate::error::Result;

/// The two sampled portfolios the blend interpolates between.
#[derive(Clone, Debug, PartialEq)]
pub struct FrontierExtremes {
  pub min_variance: PortfolioSample,
  pub max_sharpe: PortfolioSample,
}

/// Lowest-volatility and highest-Sharpe samples, first encountered on ties.
///
/// Samples without a Sharpe ratio are ignored for the max-Sharpe pick.
pub fn select_frontier(samples: &[PortfolioSample]) -> Result<FrontierExtremes> {
  let mut min_var: Option<&PortfolioSample> = None;
  let mut max_sh: Option<(&PortfolioSample, f64)> = None;

  for s in samples {
    if min_var.map_or(true, |m| s.volatility < m.volatility) {
      min_var = Some(s);
    }
    if let Some(sh) = s.sharpe {
      if max_sh.map_or(true, |(_, best)| sh > best) {
        max_sh = Some((s, sh));
      }
    }
  }

  let min_variance = min_var
    .ok_or_else(|| OptimizerError::invalid("samples", "no portfolios were sampled"))?
    .clone();
  let max_sharpe = max_sh
    .map(|(s, _)| s.clone())
    .ok_or(OptimizerError::DegenerateVolatility)?;

  debug!(
    min_vol = min_variance.volatility,
    max_sharpe = ?max_sharpe.sharpe,
    "selected frontier extremes"
  );
  Ok(FrontierExtremes {
    min_variance,
    max_sharpe,
  })
}

/// Validate a risk tolerance in `[0, 1]`.
pub fn check_risk_tolerance(alpha: f64) -> Result<()> {
  if !(0.0..=1.0).contains(&alpha) {
    return Err(OptimizerError::invalid(
      "risk_tolerance",
      format!("must lie in [0, 1], got {alpha}"),
    ));
  }
  Ok(())
}

/// Interpolate weights between the extremes and re-evaluate the result.
///
/// Return and volatility are recomputed from `moments`, not interpolated.
pub fn blend(
  extremes: &FrontierExtremes,
  alpha: f64,
  moments: &MomentEstimate,
  risk_free: f64,
) -> Result<PortfolioSample> {
  check_risk_tolerance(alpha)?;

  let weights = extremes
    .min_variance
    .weights
    .iter()
    .zip(&extremes.max_sharpe.weights)
    .map(|(lo, hi)| lo * (1.0 - alpha) + hi * alpha)
    .collect();

  Ok(evaluate(weights, moments, risk_free))
}

#[cfg(test)]
mod tests {
  use approx::assert_relative_eq;

  use super::*;

  fn sample(weights: Vec<f64>, volatility: f64, sharpe: Option<f64>) -> PortfolioSample {
    PortfolioSample {
      weights,
      expected_return: 0.0,
      volatility,
      sharpe,
    }
  }

  fn moments() -> MomentEstimate {
    MomentEstimate {
      mu: vec![0.05, 0.15],
      cov: vec![vec![0.01, 0.002], vec![0.002, 0.09]],
    }
  }

  #[test]
  fn picks_extremes_with_first_encountered_ties() {
    let samples = vec![
      sample(vec![0.5, 0.5], 0.20, Some(0.4)),
      sample(vec![0.9, 0.1], 0.10, Some(0.9)),
      sample(vec![0.8, 0.2], 0.10, Some(0.9)),
      sample(vec![0.1, 0.9], 0.30, Some(0.2)),
    ];
    let ext = select_frontier(&samples).unwrap();

    assert_eq!(ext.min_variance.weights, vec![0.9, 0.1]);
    assert_eq!(ext.max_sharpe.weights, vec![0.9, 0.1]);
    assert!(samples.iter().all(|s| ext.min_variance.volatility <= s.volatility));
    assert!(samples.iter().all(|s| ext.max_sharpe.sharpe >= s.sharpe));
  }

  #[test]
  fn undefined_sharpe_is_skipped() {
    let samples = vec![
      sample(vec![0.5, 0.5], 0.0, None),
      sample(vec![0.3, 0.7], 0.2, Some(-0.5)),
    ];
    let ext = select_frontier(&samples).unwrap();

    assert_eq!(ext.min_variance.weights, vec![0.5, 0.5]);
    assert_eq!(ext.max_sharpe.weights, vec![0.3, 0.7]);
  }

  #[test]
  fn all_degenerate_samples_fail() {
    let samples = vec![sample(vec![0.5, 0.5], 0.0, None)];
    assert_eq!(
      select_frontier(&samples).unwrap_err(),
      OptimizerError::DegenerateVolatility
    );
    assert!(select_frontier(&[]).is_err());
  }

  #[test]
  fn blend_endpoints_and_midpoint() {
    let m = moments();
    let ext = FrontierExtremes {
      min_variance: evaluate(vec![0.9, 0.1], &m, 0.02),
      max_sharpe: evaluate(vec![0.2, 0.8], &m, 0.02),
    };

    let lo = blend(&ext, 0.0, &m, 0.02).unwrap();
    let hi = blend(&ext, 1.0, &m, 0.02).unwrap();
    assert_eq!(lo.weights, ext.min_variance.weights);
    assert_eq!(hi.weights, ext.max_sharpe.weights);

    let mid = blend(&ext, 0.5, &m, 0.02).unwrap();
    assert_relative_eq!(mid.weights[0], 0.55, epsilon = 1e-12);
    assert_relative_eq!(mid.weights.iter().sum::<f64>(), 1.0, epsilon = 1e-12);

    // volatility is recomputed, not the average of the endpoints
    let var = 0.55f64.powi(2) * 0.01 + 0.45f64.powi(2) * 0.09 + 2.0 * 0.55 * 0.45 * 0.002;
    assert_relative_eq!(mid.volatility, var.sqrt(), epsilon = 1e-12);
    assert!((mid.volatility - 0.5 * (lo.volatility + hi.volatility)).abs() > 1e-6);
  }

  #[test]
  fn blend_rejects_out_of_range_tolerance() {
    let m = moments();
    let ext = FrontierExtremes {
      min_variance: evaluate(vec![1.0, 0.0], &m, 0.0),
      max_sharpe: evaluate(vec![0.0, 1.0], &m, 0.0),
    };
    for alpha in [-0.1, 1.01, f64::NAN] {
      assert!(matches!(
        blend(&ext, alpha, &m, 0.0),
        Err(OptimizerError::InvalidParameter { name: "risk_tolerance", .. })
      ));
    }
  }
}
