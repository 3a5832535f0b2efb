//! Analysis entry points
//!
//! Each function is a pure transformation of its input; nothing is cached
//! between calls.

use serde::Serialize;
use tracing::{debug, info};

use super::buckets::BucketAnalysis;
use super::max_profit::find_max_profit;
use super::patterns::{
    mine_opportunities, recommend_strategy, HighProbabilityPatterns, OpportunityReport,
    PatternStats, StrategyRecommendation,
};
use super::pnl::{summarize, PnlSummary};
use crate::config::AnalyzerConfig;
use crate::error::{AnalysisError, Result};
use crate::parser::TradeParser;
use crate::types::{Trade, TradePair, Weekday};

/// Single-shot analysis: best round-trip and best day/time to buy and sell
#[derive(Debug, Clone, Serialize)]
pub struct MarketAnalysis {
    pub total_trades: usize,
    pub max_profit: f64,
    pub best_buy: Trade,
    pub best_sell: Trade,
    pub best_buy_day: Weekday,
    pub best_sell_day: Weekday,
    pub best_buy_time: String,
    pub best_sell_time: String,
    pub buckets: BucketAnalysis,
}

impl MarketAnalysis {
    /// Average price of the best buy day bucket
    pub fn best_buy_day_avg(&self) -> f64 {
        self.buckets.by_day[&self.best_buy_day].avg_price
    }

    pub fn best_sell_day_avg(&self) -> f64 {
        self.buckets.by_day[&self.best_sell_day].avg_price
    }

    pub fn best_buy_time_avg(&self) -> f64 {
        self.buckets.by_time[&self.best_buy_time].avg_price
    }

    pub fn best_sell_time_avg(&self) -> f64 {
        self.buckets.by_time[&self.best_sell_time].avg_price
    }
}

pub fn analyze_max_profit_and_buckets(trades: &[Trade]) -> Result<MarketAnalysis> {
    let best = find_max_profit(trades)?;
    let buckets = BucketAnalysis::build(trades);

    // Rankings only come back empty for empty input, which find_max_profit
    // has already rejected as too short
    let too_short = || AnalysisError::InsufficientData {
        required: 2,
        found: trades.len(),
    };
    let best_buy_day = buckets.best_buy_day().ok_or_else(too_short)?;
    let best_sell_day = buckets.best_sell_day().ok_or_else(too_short)?;
    let best_buy_time = buckets.best_buy_time().ok_or_else(too_short)?;
    let best_sell_time = buckets.best_sell_time().ok_or_else(too_short)?;

    debug!(
        "Max profit {:.2} (rows {} -> {}), {} day / {} time buckets",
        best.profit,
        best.buy_index,
        best.sell_index,
        buckets.by_day.len(),
        buckets.by_time.len()
    );

    Ok(MarketAnalysis {
        total_trades: trades.len(),
        max_profit: best.profit,
        best_buy: best.buy,
        best_sell: best.sell,
        best_buy_day,
        best_sell_day,
        best_buy_time,
        best_sell_time,
        buckets,
    })
}

/// Sequential round-trip accounting plus mined patterns
#[derive(Debug, Clone, Serialize)]
pub struct PnlReport {
    pub summary: PnlSummary,
    pub pairs: Vec<TradePair>,
    pub patterns: HighProbabilityPatterns,
    /// Present only when the overall win rate clears the configured bar
    pub recommendation: Option<StrategyRecommendation>,
    pub opportunities: OpportunityReport,
}

pub fn compute_pnl(trades: &[Trade], config: &AnalyzerConfig) -> Result<PnlReport> {
    let (pairs, summary) = summarize(trades)?;

    let patterns = PatternStats::build(trades, &pairs).high_probability(config);

    let recommendation = if summary.win_rate > config.recommendation_win_rate {
        match recommend_strategy(&pairs) {
            Ok(rec) => Some(rec),
            Err(e) => {
                debug!("No recommendation: {}", e);
                None
            }
        }
    } else {
        debug!(
            "Win rate {:.2}% not above {:.2}%, skipping recommendation",
            summary.win_rate, config.recommendation_win_rate
        );
        None
    };

    let opportunities = mine_opportunities(&pairs, config);

    Ok(PnlReport {
        summary,
        pairs,
        patterns,
        recommendation,
        opportunities,
    })
}

/// Both analyses over one parse of the input
#[derive(Debug, Clone, Serialize)]
pub struct FullReport {
    pub market: MarketAnalysis,
    pub pnl: PnlReport,
}

pub fn analyze_trades(trades: &[Trade], config: &AnalyzerConfig) -> Result<FullReport> {
    Ok(FullReport {
        market: analyze_max_profit_and_buckets(trades)?,
        pnl: compute_pnl(trades, config)?,
    })
}

/// Parse pasted text and run every analysis
pub fn analyze_text(text: &str, config: &AnalyzerConfig) -> Result<FullReport> {
    let trades = TradeParser::from_config(config).parse_nonempty(text)?;
    info!("Analyzing {} trades", trades.len());
    analyze_trades(&trades, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SAMPLE_DATA;

    #[test]
    fn test_sample_market_analysis() {
        let report = analyze_text(SAMPLE_DATA, &AnalyzerConfig::default()).unwrap();
        let market = &report.market;

        assert_eq!(market.total_trades, 10);
        assert_eq!(market.best_buy.price, 232.74);
        assert_eq!(market.best_sell.price, 237.47);
        assert!((market.max_profit - 4.73).abs() < 1e-9);

        assert_eq!(market.best_buy_day, Weekday::Sun);
        assert_eq!(market.best_sell_day, Weekday::Mon);
        assert!((market.best_buy_day_avg() - 233.488).abs() < 1e-9);
        assert!((market.best_sell_day_avg() - 235.576).abs() < 1e-9);
        assert_eq!(market.best_buy_time, "23:00");
        assert_eq!(market.best_sell_time, "04:00");
        assert_eq!(market.best_sell_time_avg(), 237.47);
    }

    #[test]
    fn test_sample_pnl_report() {
        let report = analyze_text(SAMPLE_DATA, &AnalyzerConfig::default()).unwrap();
        let pnl = &report.pnl;

        assert_eq!(pnl.pairs.len(), 5);
        assert_eq!(pnl.summary.win_rate, 100.0);
        assert!((pnl.summary.net_pnl - 6.90).abs() < 1e-9);

        // Sun has 3 entries, Mon only 2; every pair holds for one period
        let days: Vec<Weekday> = pnl.patterns.days.iter().map(|p| p.key).collect();
        assert_eq!(days, vec![Weekday::Sun]);
        assert!(pnl.patterns.times.is_empty());
        assert_eq!(pnl.patterns.holding_periods.len(), 1);
        assert_eq!(pnl.patterns.holding_periods[0].key, 1);

        let rec = pnl.recommendation.as_ref().unwrap();
        assert_eq!(rec.best_entry_day, Weekday::Sun);
        assert_eq!(rec.best_entry_time, "19:00");
        assert_eq!(rec.avg_holding_period, 1);
        assert_eq!(rec.sample_trade.entry.period, 9);

        // Every day×time slot appears once
        assert!(pnl.opportunities.top_entry().is_none());
        assert!(pnl.opportunities.top_exit().is_none());
    }

    #[test]
    fn test_low_win_rate_omits_recommendation() {
        let text = "Period\tTime\tClosing Price\tChange\tVolume
1\tSun, 11/17, 19:00\t$10.00\t+$0.00\t1
2\tSun, 11/17, 20:00\t$11.00\t+$1.00\t1
3\tSun, 11/17, 21:00\t$11.00\t+$0.00\t1
4\tSun, 11/17, 22:00\t$10.00\t$-1.00\t1";
        let report = analyze_text(text, &AnalyzerConfig::default()).unwrap();
        assert_eq!(report.pnl.summary.win_rate, 50.0);
        assert!(report.pnl.recommendation.is_none());
    }

    #[test]
    fn test_errors_propagate() {
        let config = AnalyzerConfig::default();
        assert!(matches!(
            analyze_text("", &config),
            Err(AnalysisError::ParseEmpty)
        ));

        let one_row = "Period\tTime\tClosing Price\tChange\tVolume
1\tSun, 11/17, 19:00\t$10.00\t+$0.00\t1";
        assert!(matches!(
            analyze_text(one_row, &config),
            Err(AnalysisError::InsufficientData { required: 2, found: 1 })
        ));
    }

    #[test]
    fn test_short_input_reports_insufficient_data() {
        assert_eq!(
            analyze_max_profit_and_buckets(&[]).unwrap_err(),
            AnalysisError::InsufficientData {
                required: 2,
                found: 0
            }
        );
    }

    #[test]
    fn test_extreme_periods() {
        let mut trades = crate::parse(SAMPLE_DATA).unwrap();
        trades.truncate(2);
        trades[0].period = i64::MIN;
        trades[1].period = i64::MAX;

        let report = compute_pnl(&trades, &AnalyzerConfig::default()).unwrap();
        assert_eq!(report.pairs[0].holding_period(), i64::MAX);
        assert_eq!(report.summary.total_pairs, 1);

        // Signed or out-of-range periods never make it out of the parser
        let text = "Period\tTime\tClosing Price\tChange\tVolume
-9223372036854775808\tSun, 11/17, 19:00\t$10.00\t+$0.00\t1
9223372036854775807\tSun, 11/17, 20:00\t$11.00\t+$1.00\t1
99999999999999999999\tSun, 11/17, 21:00\t$12.00\t+$1.00\t1";
        let trades = crate::parser::TradeParser::default().parse(text);
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].period, i64::MAX);
    }

    #[test]
    fn test_report_serializes() {
        let report = analyze_text(SAMPLE_DATA, &AnalyzerConfig::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["market"]["best_buy_day"], "Sun");
        assert_eq!(json["pnl"]["summary"]["total_pairs"], 5);
        assert!(json["market"]["buckets"]["by_day"]["Mon"].is_object());
    }
}
