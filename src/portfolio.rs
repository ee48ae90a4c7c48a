//! # Portfolio
//!
//! $$
//! \sigma_p^2 = \mathbf{w}^\top \Sigma \mathbf{w}
//! $$
//!
//! Monte Carlo approximation of the efficient frontier and risk-tolerance
//! blending between its minimum-variance and maximum-Sharpe ends.

pub mod data;
pub mod engine;
pub mod frontier;
pub mod moments;
pub mod report;
pub mod sampler;
pub mod types;

pub use data::align_return_series;
pub use data::log_returns_series;
pub use data::DateRange;
pub use data::PricePoint;
pub use data::PriceSeries;
pub use engine::optimize;
pub use engine::risk_free_from_percent;
pub use engine::risk_tolerance_from_percent;
pub use engine::OptimizationRequest;
pub use engine::OptimizerConfig;
pub use engine::PortfolioEngine;
pub use frontier::blend;
pub use frontier::select_frontier;
pub use frontier::FrontierExtremes;
pub use moments::asset_stats;
pub use moments::estimate_moments;
pub use moments::MomentEstimate;
pub use report::allocate;
pub use report::AllocationLine;
pub use report::AllocationReport;
pub use sampler::MonteCarloSampler;
pub use types::AssetStats;
pub use types::FinalAllocation;
pub use types::Frequency;
pub use types::PortfolioSample;
pub use types::WeightScheme;
pub use types::DEFAULT_MAX_ASSETS;
pub use types::DEFAULT_RISK_FREE_RATE;
pub use types::DEFAULT_TRIALS;
