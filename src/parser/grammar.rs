//! Building blocks shared by every row grammar: the time-info field, numeric
//! cleanup, and the `LineGrammar` trait itself.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::types::{Trade, Weekday};

/// A row layout the parser can recognise
pub trait LineGrammar: Sync {
    fn name(&self) -> &'static str;

    /// Whether this grammar takes ownership of the whole block, judged from
    /// its first non-blank line
    fn claims(&self, first_line: &str) -> bool;

    /// Whether the claimed first line is a header rather than data
    fn skips_header(&self) -> bool;

    /// Parse one trimmed, non-blank line. `None` drops the line.
    fn parse_line(&self, line: &str, fallback_year: &str) -> Option<Trade>;
}

/// Day, date and time extracted from a field like "Sun, 11/17, 19:00"
#[derive(Debug, Clone, PartialEq)]
pub struct TimeInfo {
    pub day: Weekday,
    pub date: String,
    pub time: String,
}

struct DateGrammar {
    pattern: Regex,
    normalize: fn(&Captures, &str) -> String,
}

/// Tried in order; the first match wins
static DATE_GRAMMARS: Lazy<Vec<DateGrammar>> = Lazy::new(|| {
    vec![
        // Sun, 11/17/24, 19:00
        DateGrammar {
            pattern: Regex::new(
                r"(Sun|Mon|Tue|Wed|Thu|Fri|Sat),\s*(\d{1,2}/\d{1,2})/(\d{2}),\s*(\d{1,2}:\d{2})\b",
            )
            .unwrap(),
            normalize: |caps, _| format!("{}/20{}", &caps[2], &caps[3]),
        },
        // Sun, 11/17, 19:00
        DateGrammar {
            pattern: Regex::new(
                r"(Sun|Mon|Tue|Wed|Thu|Fri|Sat),\s*(\d{1,2}/\d{1,2}),\s*(\d{1,2}:\d{2})\b",
            )
            .unwrap(),
            normalize: |caps, fallback_year| format!("{}/{}", &caps[2], fallback_year),
        },
    ]
});

/// Match a composite time-info field against the date grammars
pub fn parse_time_info(field: &str, fallback_year: &str) -> Option<TimeInfo> {
    DATE_GRAMMARS.iter().find_map(|grammar| {
        let caps = grammar.pattern.captures(field)?;
        let day = Weekday::from_abbrev(&caps[1])?;
        let time = caps.get(caps.len() - 1)?.as_str().to_string();
        Some(TimeInfo {
            day,
            date: (grammar.normalize)(&caps, fallback_year),
            time,
        })
    })
}

/// Parse a numeric field after stripping `$`, `+` and thousands separators.
/// Non-finite values ("inf", "NaN") are rejected.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | '+' | ','))
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Row number column: unsigned digits only
pub fn parse_period(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Parse an optional numeric column: absent or empty stays `None`, present but
/// malformed fails the whole row
pub fn parse_optional_number(raw: Option<&str>) -> Option<Option<f64>> {
    match raw.map(str::trim) {
        None | Some("") => Some(None),
        Some(value) => parse_number(value).map(Some),
    }
}

pub fn build_trade(
    period: i64,
    info: TimeInfo,
    price: f64,
    change: Option<f64>,
    volume: Option<f64>,
) -> Trade {
    Trade {
        period,
        day: info.day,
        date: info.date,
        time: info.time,
        price,
        change,
        volume,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_info_without_year_uses_fallback() {
        let info = parse_time_info("Sun, 11/17, 19:00", "23").unwrap();
        assert_eq!(info.day, Weekday::Sun);
        assert_eq!(info.date, "11/17/23");
        assert_eq!(info.time, "19:00");
    }

    #[test]
    fn test_time_info_two_digit_year_expanded() {
        let info = parse_time_info("Fri, 12/06/23, 00:00", "23").unwrap();
        assert_eq!(info.day, Weekday::Fri);
        assert_eq!(info.date, "12/06/2023");
        assert_eq!(info.time, "00:00");
    }

    #[test]
    fn test_time_info_single_digit_hour() {
        let info = parse_time_info("Mon, 1/6, 9:30", "23").unwrap();
        assert_eq!(info.date, "1/6/23");
        assert_eq!(info.time, "9:30");
    }

    #[test]
    fn test_time_info_rejects_unknown_forms() {
        assert!(parse_time_info("Sunday, 11/17, 19:00", "23").is_none());
        assert!(parse_time_info("sun, 11/17, 19:00", "23").is_none());
        assert!(parse_time_info("Sun, 11/17/2023, 19:00", "23").is_none());
        assert!(parse_time_info("Sun, 11/17, 1900", "23").is_none());
    }

    #[test]
    fn test_parse_number_strips_markers() {
        assert_eq!(parse_number("$233.40"), Some(233.40));
        assert_eq!(parse_number("+$0.56"), Some(0.56));
        assert_eq!(parse_number("$-0.48"), Some(-0.48));
        assert_eq!(parse_number("314,937.689"), Some(314937.689));
        assert_eq!(parse_number("n/a"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn test_optional_number() {
        assert_eq!(parse_optional_number(None), Some(None));
        assert_eq!(parse_optional_number(Some(" ")), Some(None));
        assert_eq!(parse_optional_number(Some("+$1.5")), Some(Some(1.5)));
        assert_eq!(parse_optional_number(Some("abc")), None);
    }

    #[test]
    fn test_parse_period_is_strict() {
        assert_eq!(parse_period("12"), Some(12));
        assert_eq!(parse_period("12a"), None);
        assert_eq!(parse_period("1.5"), None);
        assert_eq!(parse_period("-9223372036854775808"), None);
        assert_eq!(parse_period("+3"), None);
        assert_eq!(parse_period(""), None);
        // Out of range for i64
        assert_eq!(parse_period("9223372036854775808"), None);
    }
}
