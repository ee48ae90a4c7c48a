//! # Errors
//!
//! Failure kinds surfaced by the optimizer. Every message is a single sentence
//! meant to be shown to the end user as is.

use std::time::Duration;

use thiserror::Error;

/// Errors returned by [`crate::portfolio::optimize`] and its building blocks.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizerError {
  /// Fewer than two assets were supplied.
  #[error("at least 2 assets are required to build a portfolio, got {0}")]
  InsufficientAssets(usize),

  /// More assets than the configured limit.
  #[error("too many assets: {got} supplied, the limit is {limit}")]
  TooManyAssets { got: usize, limit: usize },

  /// The aligned return window is shorter than two observations.
  #[error("not enough price history: {0} aligned return observations, at least 2 are required")]
  InsufficientHistory(usize),

  /// No sampled portfolio has a non-zero volatility, so no Sharpe ratio is defined.
  #[error("every sampled portfolio has zero volatility, the Sharpe ratio is undefined")]
  DegenerateVolatility,

  /// A caller supplied parameter is outside its valid domain.
  #[error("invalid parameter `{name}`: {reason}")]
  InvalidParameter { name: &'static str, reason: String },

  /// Mean or covariance estimate is NaN or infinite for the given asset index.
  #[error("expected return or covariance estimate for asset #{0} is not finite")]
  NonFiniteEstimate(usize),

  /// Sampling did not finish within the configured deadline.
  #[error("optimization did not finish within {0:?}")]
  DeadlineExceeded(Duration),
}

impl OptimizerError {
  pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
    Self::InvalidParameter {
      name,
      reason: reason.into(),
    }
  }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, OptimizerError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn messages_are_single_sentences() {
    let err = OptimizerError::invalid("risk_tolerance", "must lie in [0, 1], got 1.5");
    assert_eq!(
      err.to_string(),
      "invalid parameter `risk_tolerance`: must lie in [0, 1], got 1.5"
    );
    assert_eq!(
      OptimizerError::InsufficientHistory(1).to_string(),
      "not enough price history: 1 aligned return observations, at least 2 are required"
    );
  }
}
