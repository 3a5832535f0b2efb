use thiserror::Error;

/// Failure kinds for a single analysis call.
///
/// Malformed input lines never surface here; they are dropped by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// Input produced zero valid trades (blank or fully unmatched text).
    #[error("no valid trade rows found in input")]
    ParseEmpty,

    /// Pairing or pairwise scanning needs more trades than were parsed.
    #[error("insufficient data: need at least {required} trades, found {found}")]
    InsufficientData { required: usize, found: usize },

    /// No pair closed with positive PnL, so there is nothing to recommend.
    #[error("no winning pairs; strategy recommendation unavailable")]
    NoWinningPairs,
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
