use serde::{Deserialize, Serialize};
use std::fmt;

/// Day of week as it appears in pasted price history ("Sun", "Mon", ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Sun,
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl Weekday {
    /// Match a three-letter abbreviation. Case-sensitive: "sun" is rejected.
    pub fn from_abbrev(s: &str) -> Option<Self> {
        match s {
            "Sun" => Some(Self::Sun),
            "Mon" => Some(Self::Mon),
            "Tue" => Some(Self::Tue),
            "Wed" => Some(Self::Wed),
            "Thu" => Some(Self::Thu),
            "Fri" => Some(Self::Fri),
            "Sat" => Some(Self::Sat),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sun => "Sun",
            Self::Mon => "Mon",
            Self::Tue => "Tue",
            Self::Wed => "Wed",
            Self::Thu => "Thu",
            Self::Fri => "Fri",
            Self::Sat => "Sat",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed price observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub period: i64,
    pub day: Weekday,
    pub date: String, // MM/DD/YYYY, or MM/DD/23 when the row had no year
    pub time: String, // H:MM or HH:MM, verbatim
    pub price: f64,
    pub change: Option<f64>,
    pub volume: Option<f64>,
}

/// Entry trade followed by exit trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradePair {
    pub entry: Trade,
    pub exit: Trade,
    pub pnl: f64,
}

impl TradePair {
    pub fn new(entry: Trade, exit: Trade) -> Self {
        let pnl = exit.price - entry.price;
        Self { entry, exit, pnl }
    }

    /// Distance in periods between exit and entry (negative if rows are
    /// unsorted). Saturates at the `i64` bounds.
    pub fn holding_period(&self) -> i64 {
        self.exit.period.saturating_sub(self.entry.period)
    }

    pub fn is_win(&self) -> bool {
        self.pnl > 0.0
    }

    pub fn is_loss(&self) -> bool {
        self.pnl < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(period: i64, price: f64) -> Trade {
        Trade {
            period,
            day: Weekday::Sun,
            date: "11/17/23".to_string(),
            time: "19:00".to_string(),
            price,
            change: None,
            volume: None,
        }
    }

    #[test]
    fn test_weekday_is_case_sensitive() {
        assert_eq!(Weekday::from_abbrev("Mon"), Some(Weekday::Mon));
        assert_eq!(Weekday::from_abbrev("mon"), None);
        assert_eq!(Weekday::from_abbrev("Monday"), None);
        assert_eq!(Weekday::Sat.to_string(), "Sat");
    }

    #[test]
    fn test_pair_pnl_and_holding() {
        let pair = TradePair::new(trade(3, 233.48), trade(7, 233.86));
        assert!((pair.pnl - 0.38).abs() < 1e-9);
        assert_eq!(pair.holding_period(), 4);
        assert!(pair.is_win());
        assert!(!pair.is_loss());

        let flat = TradePair::new(trade(1, 100.0), trade(2, 100.0));
        assert!(!flat.is_win());
        assert!(!flat.is_loss());
    }

    #[test]
    fn test_holding_period_saturates() {
        let pair = TradePair::new(trade(i64::MAX, 1.0), trade(i64::MIN, 2.0));
        assert_eq!(pair.holding_period(), i64::MIN);

        let pair = TradePair::new(trade(i64::MIN, 1.0), trade(i64::MAX, 2.0));
        assert_eq!(pair.holding_period(), i64::MAX);
    }

    #[test]
    fn test_weekday_serializes_as_abbrev() {
        let json = serde_json::to_string(&Weekday::Thu).unwrap();
        assert_eq!(json, "\"Thu\"");
    }
}
