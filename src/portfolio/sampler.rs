//! # Monte Carlo Sampler
//!
//! $$
//! \mathbf{w}=\frac{(u_1,\dots,u_N)}{\sum_k u_k},\qquad
//! r_p=\mathbf{w}^\top\mu,\quad \sigma_p=\sqrt{\mathbf{w}^\top\Sigma\mathbf{w}}
//! $$
//!
//! Random long-only portfolios evaluated against fixed moments. Trials run in
//! parallel chunks; each chunk owns a generator seeded from the base seed and
//! its index, so a seeded run does not depend on the thread count.

use std::time::Duration;
use std::time::Instant;

use impl_new_derive::ImplNew;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rand_distr::Exp1;
use rayon::prelude::*;
use tracing::debug;
use tracing::warn;

use super::moments::MomentEstimate;
use super::types::PortfolioSample;
use super::types::WeightScheme;
use super::types::VOL_EPS;
use crate::error::OptimizerError;
use crate::error::Result;

const CHUNK: usize = 256;

fn dot(a: &[f64], b: &[f64]) -> f64 {
  a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn mat_vec_mul(mat: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
  mat
    .iter()
    .map(|row| row.iter().zip(v.iter()).map(|(a, b)| a * b).sum())
    .collect()
}

/// splitmix64 finalizer, spreads chunk indices over the seed space.
fn chunk_seed(base: u64, chunk: u64) -> u64 {
  let mut z = base ^ chunk.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
  z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
  z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
  z ^ (z >> 31)
}

/// Expected portfolio return `w'mu`.
pub fn portfolio_return(w: &[f64], mu: &[f64]) -> f64 {
  dot(w, mu)
}

/// Portfolio variance `w' Sigma w`, clamped at zero.
pub fn portfolio_variance(w: &[f64], cov: &[Vec<f64>]) -> f64 {
  dot(w, &mat_vec_mul(cov, w)).max(0.0)
}

/// Evaluate return, volatility and Sharpe ratio of `weights`.
pub fn evaluate(weights: Vec<f64>, moments: &MomentEstimate, risk_free: f64) -> PortfolioSample {
  let expected_return = portfolio_return(&weights, &moments.mu);
  let volatility = portfolio_variance(&weights, &moments.cov).sqrt();
  let sharpe = (volatility >= VOL_EPS).then(|| (expected_return - risk_free) / volatility);

  PortfolioSample {
    weights,
    expected_return,
    volatility,
    sharpe,
  }
}

/// Draw one long-only weight vector of length `n`; empty when `n == 0`.
pub fn draw_weights<R: Rng + ?Sized>(rng: &mut R, n: usize, scheme: WeightScheme) -> Vec<f64> {
  if n == 0 {
    return Vec::new();
  }
  loop {
    let raw: Vec<f64> = match scheme {
      WeightScheme::Uniform => (0..n).map(|_| rng.random::<f64>()).collect(),
      WeightScheme::FlatDirichlet => (0..n).map(|_| rng.sample::<f64, _>(Exp1)).collect(),
    };
    let sum: f64 = raw.iter().sum();
    if sum > 0.0 {
      return raw.into_iter().map(|x| x / sum).collect();
    }
  }
}

/// One trial: draw weights and evaluate them.
pub fn sample<R: Rng + ?Sized>(
  rng: &mut R,
  moments: &MomentEstimate,
  risk_free: f64,
  scheme: WeightScheme,
) -> PortfolioSample {
  let w = draw_weights(rng, moments.n_assets(), scheme);
  evaluate(w, moments, risk_free)
}

/// Runs a fixed number of independent trials.
#[derive(ImplNew, Clone, Debug)]
pub struct MonteCarloSampler {
  pub trials: usize,
  pub scheme: WeightScheme,
  /// Base seed; `None` draws one from the thread-local generator.
  pub seed: Option<u64>,
  /// Abort when sampling takes longer than this.
  pub deadline: Option<Duration>,
}

fn ensure_assets(moments: &MomentEstimate) -> Result<()> {
  match moments.n_assets() {
    0 => Err(OptimizerError::InsufficientAssets(0)),
    _ => Ok(()),
  }
}

impl MonteCarloSampler {
  /// Run all trials in parallel, results in trial order.
  pub fn run(&self, moments: &MomentEstimate, risk_free: f64) -> Result<Vec<PortfolioSample>> {
    self.run_since(moments, risk_free, Instant::now())
  }

  pub(crate) fn run_since(
    &self,
    moments: &MomentEstimate,
    risk_free: f64,
    started: Instant,
  ) -> Result<Vec<PortfolioSample>> {
    ensure_assets(moments)?;
    let base = self.seed.unwrap_or_else(|| rand::rng().random::<u64>());
    let n_chunks = self.trials.div_ceil(CHUNK);
    debug!(trials = self.trials, chunks = n_chunks, scheme = ?self.scheme, "sampling portfolios");

    let chunks = (0..n_chunks)
      .into_par_iter()
      .map(|k| {
        if let Some(deadline) = self.deadline {
          if started.elapsed() >= deadline {
            return Err(OptimizerError::DeadlineExceeded(deadline));
          }
        }

        let mut rng = StdRng::seed_from_u64(chunk_seed(base, k as u64));
        let len = CHUNK.min(self.trials - k * CHUNK);
        Ok(
          (0..len)
            .map(|_| sample(&mut rng, moments, risk_free, self.scheme))
            .collect::<Vec<_>>(),
        )
      })
      .collect::<Result<Vec<_>>>()?;

    let samples: Vec<PortfolioSample> = chunks.into_iter().flatten().collect();
    let degenerate = samples.iter().filter(|s| s.sharpe.is_none()).count();
    if degenerate > 0 {
      warn!(degenerate, "samples with zero volatility have no Sharpe ratio");
    }
    Ok(samples)
  }

  /// Sequential run drawing from a caller supplied generator.
  pub fn run_with_rng<R: Rng + ?Sized>(
    &self,
    rng: &mut R,
    moments: &MomentEstimate,
    risk_free: f64,
  ) -> Result<Vec<PortfolioSample>> {
    ensure_assets(moments)?;
    Ok(
      (0..self.trials)
        .map(|_| sample(&mut *rng, moments, risk_free, self.scheme))
        .collect(),
    )
  }
}
