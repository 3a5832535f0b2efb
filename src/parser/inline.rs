//! Single-line composite rows, as produced when a table is pasted through a
//! renderer that collapses the columns:
//!
//! `1Sun, 11/17, 19:00**$233.40$+$0.00**314,937.689`

use once_cell::sync::Lazy;
use regex::Regex;

use super::grammar::{build_trade, parse_number, parse_period, parse_time_info, LineGrammar};
use crate::types::Trade;

static INLINE_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(\d+)",
        r"((?:Sun|Mon|Tue|Wed|Thu|Fri|Sat),\s*\d{1,2}/\d{1,2}(?:/\d{2})?,\s*\d{1,2}:\d{2})",
        r"\*\*\$(\d+\.?\d*)",
        r"\$?([+-]\$?\d+\.?\d*)",
        r"\*\*(\d+(?:,\d+)*\.?\d*)",
    ))
    .unwrap()
});

/// Fallback grammar; claims any block no header-led grammar wants
pub struct InlineRow;

impl LineGrammar for InlineRow {
    fn name(&self) -> &'static str {
        "inline"
    }

    fn claims(&self, _first_line: &str) -> bool {
        true
    }

    fn skips_header(&self) -> bool {
        false
    }

    fn parse_line(&self, line: &str, fallback_year: &str) -> Option<Trade> {
        let caps = INLINE_ROW.captures(line)?;

        let period = parse_period(&caps[1])?;
        let info = parse_time_info(&caps[2], fallback_year)?;
        let price = parse_number(&caps[3])?;
        let change = parse_number(&caps[4])?;
        let volume = parse_number(&caps[5])?;

        Some(build_trade(period, info, price, Some(change), Some(volume)))
    }
}
