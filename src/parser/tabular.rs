//! Header-led layouts: columns copied out of a price-history table
//!
//! Header: `Period  Time  Closing Price  Change  Volume`
//! Row:    `1  Sun, 11/17, 19:00  $233.40  +$0.00  314,937.689`

use once_cell::sync::Lazy;
use regex::Regex;

use super::grammar::{
    build_trade, parse_number, parse_optional_number, parse_period, parse_time_info, LineGrammar,
};
use crate::types::Trade;

/// Column separator: a run of tabs, or two or more whitespace characters
static FIELD_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\t+|\s{2,}").unwrap());

fn is_table_header(line: &str) -> bool {
    line.contains("Period") && line.contains("Time") && line.contains("Closing Price")
}

/// Tab or multi-space separated columns. Rows that split into fewer than five
/// columns are retried as comma separated ([`CsvRow`]).
pub struct TabularRow;

impl LineGrammar for TabularRow {
    fn name(&self) -> &'static str {
        "tabular"
    }

    fn claims(&self, first_line: &str) -> bool {
        is_table_header(first_line)
    }

    fn skips_header(&self) -> bool {
        true
    }

    fn parse_line(&self, line: &str, fallback_year: &str) -> Option<Trade> {
        let fields: Vec<&str> = FIELD_SPLIT.split(line).collect();
        if fields.len() < 5 {
            return CsvRow.parse_line(line, fallback_year);
        }

        let period = parse_period(fields[0])?;
        let info = parse_time_info(fields[1], fallback_year)?;
        let price = parse_number(fields[2])?;
        let change = parse_number(fields[3])?;
        let volume = parse_number(fields[4])?;

        Some(build_trade(period, info, price, Some(change), Some(volume)))
    }
}

/// Comma separated export with quoted time-info, e.g.
/// `1,"Sun, 11/17, 19:00",$233.40,+$0.00,"314,937.689"`.
///
/// Change and volume columns are optional here.
pub struct CsvRow;

impl CsvRow {
    pub fn parse_line(&self, line: &str, fallback_year: &str) -> Option<Trade> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(line.as_bytes());

        let record = reader.records().next()?.ok()?;
        if record.len() < 3 {
            return None;
        }

        let period = parse_period(record.get(0)?)?;
        let info = parse_time_info(record.get(1)?, fallback_year)?;
        let price = parse_number(record.get(2)?)?;
        let change = parse_optional_number(record.get(3))?;
        let volume = parse_optional_number(record.get(4))?;

        Some(build_trade(period, info, price, change, volume))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Weekday;

    #[test]
    fn test_tabular_row_with_tabs() {
        let trade = TabularRow
            .parse_line("2\tSun, 11/17, 20:00\t$233.96\t+$0.56\t190,728.773", "23")
            .unwrap();
        assert_eq!(trade.period, 2);
        assert_eq!(trade.day, Weekday::Sun);
        assert_eq!(trade.date, "11/17/23");
        assert_eq!(trade.price, 233.96);
        assert_eq!(trade.change, Some(0.56));
        assert_eq!(trade.volume, Some(190728.773));
    }

    #[test]
    fn test_tabular_row_with_spaces() {
        let trade = TabularRow
            .parse_line("3   Sun, 11/17, 21:00   $233.48   $-0.48   209,209.63", "23")
            .unwrap();
        assert_eq!(trade.period, 3);
        assert_eq!(trade.time, "21:00");
        assert_eq!(trade.change, Some(-0.48));
    }

    #[test]
    fn test_tabular_row_needs_five_fields() {
        assert!(TabularRow
            .parse_line("1\tSun, 11/17, 19:00\t$233.40\t+$0.00", "23")
            .is_none());
    }

    #[test]
    fn test_tabular_row_bad_numbers_drop_line() {
        assert!(TabularRow
            .parse_line("x\tSun, 11/17, 19:00\t$233.40\t+$0.00\t1", "23")
            .is_none());
        assert!(TabularRow
            .parse_line("1\tSun, 11/17, 19:00\t$abc\t+$0.00\t1", "23")
            .is_none());
        assert!(TabularRow
            .parse_line("1\tSun, 11/17, 19:00\t$233.40\tflat\t1", "23")
            .is_none());
    }

    #[test]
    fn test_header_claims() {
        let tab_header = "Period\tTime\tClosing Price\tChange\tVolume";
        let csv_header = "Period,Time,Closing Price,Change,Volume";

        assert!(TabularRow.claims(tab_header));
        assert!(TabularRow.claims(csv_header));
        assert!(!TabularRow.claims("1Sun, 11/17, 19:00**$233.40$+$0.00**314,937.689"));
    }

    #[test]
    fn test_short_split_falls_back_to_csv() {
        let trade = TabularRow
            .parse_line(r#"1,"Sun, 11/17, 19:00",$233.40,+$0.00,"314,937.689""#, "23")
            .unwrap();
        assert_eq!(trade.period, 1);
        assert_eq!(trade.price, 233.40);
        assert_eq!(trade.volume, Some(314937.689));

        // Five tab columns that fail to parse are not retried as CSV
        assert!(TabularRow
            .parse_line("1\tSun, 11/17, 19:00\t$abc\t+$0.00\t1,2,3", "23")
            .is_none());
    }

    #[test]
    fn test_csv_row_full() {
        let trade = CsvRow
            .parse_line(r#"6,"Mon, 11/18, 00:00",$235.40,+$2.66,"174,984.659""#, "23")
            .unwrap();
        assert_eq!(trade.period, 6);
        assert_eq!(trade.day, Weekday::Mon);
        assert_eq!(trade.date, "11/18/23");
        assert_eq!(trade.price, 235.40);
        assert_eq!(trade.change, Some(2.66));
        assert_eq!(trade.volume, Some(174984.659));
    }

    #[test]
    fn test_csv_row_minimal_fields() {
        let trade = CsvRow
            .parse_line(r#"7,"Mon, 11/18/24, 01:00",234.85"#, "23")
            .unwrap();
        assert_eq!(trade.date, "11/18/2024");
        assert_eq!(trade.change, None);
        assert_eq!(trade.volume, None);

        assert!(CsvRow.parse_line(r#"7,"Mon, 11/18, 01:00""#, "23").is_none());
        assert!(CsvRow
            .parse_line(r#"7,"Mon, 11/18, 01:00",234.85,oops"#, "23")
            .is_none());
    }
}
