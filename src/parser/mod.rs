//! Record Parser
//!
//! Turns pasted price-history text into an ordered list of trades.
//!
//! The block layout is chosen from its first line by asking each grammar in
//! priority order whether it claims the block:
//! - `tabular`: header with Period/Time/Closing Price; tab or multi-space
//!   columns, with comma separated rows accepted line by line
//! - `inline`: single-line composite rows (fallback)
//!
//! Lines a grammar cannot read are dropped; one bad row never invalidates the
//! rest of the paste.

mod grammar;
mod inline;
mod tabular;

use tracing::debug;

use crate::config::{AnalyzerConfig, DEFAULT_FALLBACK_YEAR};
use crate::error::{AnalysisError, Result};
use crate::types::Trade;

pub use grammar::{parse_number, parse_time_info, LineGrammar, TimeInfo};
pub use inline::InlineRow;
pub use tabular::{CsvRow, TabularRow};

/// Registered grammars, highest priority first
static GRAMMARS: &[&dyn LineGrammar] = &[&TabularRow, &InlineRow];

/// Sample price history (hourly closes, Sun 11/17 to Mon 11/18)
pub const SAMPLE_DATA: &str = "Period\tTime\tClosing Price\tChange\tVolume
1\tSun, 11/17, 19:00\t$233.40\t+$0.00\t314,937.689
2\tSun, 11/17, 20:00\t$233.96\t+$0.56\t190,728.773
3\tSun, 11/17, 21:00\t$233.48\t$-0.48\t209,209.63
4\tSun, 11/17, 22:00\t$233.86\t+$0.38\t190,428.269
5\tSun, 11/17, 23:00\t$232.74\t$-1.12\t158,095.099
6\tMon, 11/18, 00:00\t$235.40\t+$2.66\t174,984.659
7\tMon, 11/18, 01:00\t$234.85\t$-0.55\t152,686.214
8\tMon, 11/18, 02:00\t$235.42\t+$0.57\t174,935.147
9\tMon, 11/18, 03:00\t$234.74\t$-0.68\t197,104.863
10\tMon, 11/18, 04:00\t$237.47\t+$2.73\t239,350.042";

/// Parser with a configurable fallback year for year-less dates
#[derive(Debug, Clone)]
pub struct TradeParser {
    fallback_year: String,
}

impl Default for TradeParser {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_YEAR)
    }
}

impl TradeParser {
    pub fn new(fallback_year: impl Into<String>) -> Self {
        Self {
            fallback_year: fallback_year.into(),
        }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::new(config.fallback_year.clone())
    }

    /// Pick the grammar that claims a block starting with `first_line`
    pub fn detect(first_line: &str) -> &'static dyn LineGrammar {
        GRAMMARS
            .iter()
            .copied()
            .find(|g| g.claims(first_line))
            .unwrap_or(&InlineRow)
    }

    /// Parse every recognisable row, in source order. Never fails; an
    /// unreadable paste yields an empty list.
    pub fn parse(&self, text: &str) -> Vec<Trade> {
        let lines: Vec<&str> = text
            .trim()
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        let Some(first) = lines.first() else {
            return Vec::new();
        };

        let grammar = Self::detect(first);
        let skip = usize::from(grammar.skips_header());
        debug!("Detected {} layout ({} lines)", grammar.name(), lines.len());

        let mut trades = Vec::with_capacity(lines.len());
        let mut skipped = 0usize;

        for line in &lines[skip..] {
            match grammar.parse_line(line, &self.fallback_year) {
                Some(trade) => trades.push(trade),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            debug!("Skipped {} unreadable lines", skipped);
        }
        debug!("Parsed {} trades", trades.len());

        trades
    }

    /// Like [`parse`](Self::parse), but an empty result is an error
    pub fn parse_nonempty(&self, text: &str) -> Result<Vec<Trade>> {
        let trades = self.parse(text);
        if trades.is_empty() {
            return Err(AnalysisError::ParseEmpty);
        }
        Ok(trades)
    }
}

/// Parse with default settings; fails with `ParseEmpty` when nothing matched
pub fn parse(text: &str) -> Result<Vec<Trade>> {
    TradeParser::default().parse_nonempty(text)
}
