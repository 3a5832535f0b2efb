// Library crate - exports trade parsing and strategy analysis

pub mod analysis;
pub mod config;
pub mod error;
pub mod input;
pub mod parser;
pub mod types;

// Re-export commonly used types
pub use analysis::{
    analyze_max_profit_and_buckets, analyze_text, analyze_trades, compute_pnl, FullReport,
    MarketAnalysis, PnlReport,
};
pub use config::AnalyzerConfig;
pub use error::AnalysisError;
pub use parser::{parse, TradeParser, SAMPLE_DATA};
pub use types::*;
