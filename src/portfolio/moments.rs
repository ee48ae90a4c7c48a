//! # Moment Estimation
//!
//! $$
//! \mu_i = a\,\bar r_i,\qquad
//! \Sigma_{ij} = a\,\frac{1}{L-1}\sum_{t=1}^{L}\Big(r_{it}-\tfrac{\mu_i}{a}\Big)\Big(r_{jt}-\tfrac{\mu_j}{a}\Big)
//! $$
//!
//! Annualized mean vector and sample covariance of aligned log-returns.

use tracing::debug;

use super::types::AssetStats;
use crate::error::OptimizerError;
use crate::error::Result;

/// Annualized mean vector and covariance matrix.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MomentEstimate {
  pub mu: Vec<f64>,
  pub cov: Vec<Vec<f64>>,
}

impl MomentEstimate {
  pub fn n_assets(&self) -> usize {
    self.mu.len()
  }

  /// Fails on the first asset whose mean or covariance row is not finite.
  pub fn ensure_finite(&self) -> Result<()> {
    for (i, (m, row)) in self.mu.iter().zip(&self.cov).enumerate() {
      if !m.is_finite() || row.iter().any(|c| !c.is_finite()) {
        return Err(OptimizerError::NonFiniteEstimate(i));
      }
    }
    Ok(())
  }
}

fn sample_mean(xs: &[f64]) -> f64 {
  if xs.is_empty() {
    0.0
  } else {
    xs.iter().sum::<f64>() / xs.len() as f64
  }
}

/// Bessel-corrected covariance of `x` and `y` around the supplied means.
fn sample_covariance(x: &[f64], y: &[f64], mx: f64, my: f64) -> f64 {
  let n = x.len().min(y.len());
  if n < 2 {
    return 0.0;
  }

  let mut acc = 0.0;
  for t in 0..n {
    acc += (x[t] - mx) * (y[t] - my);
  }
  acc / (n - 1) as f64
}

/// Estimate annualized `mu` and `Sigma` from aligned return rows.
///
/// Means are annualized first and divided back by `ann` for the covariance
/// step, whose result is then scaled by `ann` again.
pub fn estimate_moments(aligned: &[Vec<f64>], ann: f64) -> Result<MomentEstimate> {
  let n = aligned.len();
  let len = aligned.iter().map(|r| r.len()).min().unwrap_or(0);
  if len < 2 {
    return Err(OptimizerError::InsufficientHistory(len));
  }
  if aligned.iter().any(|r| r.len() != len) {
    return Err(OptimizerError::invalid("returns", "rows are not aligned to a common length"));
  }

  let mu: Vec<f64> = aligned.iter().map(|r| sample_mean(r) * ann).collect();

  let mut cov = vec![vec![0.0; n]; n];
  for i in 0..n {
    for j in i..n {
      let c = sample_covariance(&aligned[i], &aligned[j], mu[i] / ann, mu[j] / ann) * ann;
      cov[i][j] = c;
      cov[j][i] = c;
    }
  }

  debug!(assets = n, observations = len, ann, "estimated moments");
  Ok(MomentEstimate { mu, cov })
}

/// Per-asset annualized mean and volatility on the aligned window.
pub fn asset_stats(symbols: &[String], aligned: &[Vec<f64>], ann: f64) -> Vec<AssetStats> {
  symbols
    .iter()
    .zip(aligned)
    .map(|(symbol, r)| {
      let mean = sample_mean(r);
      let var = sample_covariance(r, r, mean, mean);
      AssetStats {
        symbol: symbol.clone(),
        mu: mean * ann,
        sigma: var.max(0.0).sqrt() * ann.sqrt(),
      }
    })
    .collect()
}
