//! # frontier-mc
//!
//! $$
//! \mathbf{w}^\* = (1-\alpha)\,\mathbf{w}_{\min\sigma} + \alpha\,\mathbf{w}_{\max\mathrm{SR}}
//! $$
//!
//! Estimates a long-only allocation across a set of assets from their
//! historical closing prices:
//!
//! 1. log-returns per asset, aligned to the most recent common window,
//! 2. annualized mean vector and covariance matrix,
//! 3. random long-only portfolios sampled in parallel,
//! 4. minimum-variance and maximum-Sharpe samples picked from the cloud,
//! 5. linear blend of the two by a risk tolerance in `[0, 1]`,
//! 6. currency breakdown for a total investment.
//!
//! Fetching prices and drawing charts are left to the caller.

pub mod error;
pub mod portfolio;

pub use error::OptimizerError;
pub use error::Result;
pub use portfolio::optimize;
pub use portfolio::FinalAllocation;
pub use portfolio::OptimizationRequest;
pub use portfolio::OptimizerConfig;
pub use portfolio::PortfolioEngine;
