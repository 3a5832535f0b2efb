//! Strategy analysis over a parsed trade sequence
//!
//! - Max-profit scan (exhaustive buy/sell search)
//! - Day and time price buckets
//! - Sequential round-trip PnL
//! - Win-rate pattern mining

pub mod buckets;
pub mod max_profit;
pub mod patterns;
pub mod pnl;
mod report;

// Re-export commonly used types
pub use buckets::{BucketAnalysis, PriceBucket};
pub use max_profit::{find_max_profit, MaxProfit};
pub use patterns::{
    mine_opportunities, rank_patterns, recommend_strategy, HighProbabilityPatterns, Opportunity,
    OpportunityReport, PatternBucket, PatternStats, RankedPattern, StrategyRecommendation,
};
pub use pnl::{pair_trades, summarize, PnlSummary};
pub use report::{
    analyze_max_profit_and_buckets, analyze_text, analyze_trades, compute_pnl, FullReport,
    MarketAnalysis, PnlReport,
};
