//! Pattern Miner
//!
//! Three independent views over the paired sequence:
//! - Win-rate buckets by entry day, entry time and holding period, filtered
//!   down to high-probability patterns
//! - A single strategy recommendation (best entry day/time, typical hold)
//! - Day×time slots ranked as entry and as exit opportunities
//!
//! All filters use the same rule: at least `min_samples` observations and a
//! win rate strictly above `min_win_rate`.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::config::AnalyzerConfig;
use crate::error::{AnalysisError, Result};
use crate::types::{Trade, TradePair, Weekday};

// ============================================================================
// Win-rate buckets
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PatternBucket {
    pub total: usize,
    pub profitable: usize,
    pub total_abs_value: f64,
    pub profitable_value: f64,
}

impl PatternBucket {
    pub fn record(&mut self, pnl: f64) {
        self.total += 1;
        self.total_abs_value += pnl.abs();
        if pnl > 0.0 {
            self.profitable += 1;
            self.profitable_value += pnl;
        }
    }

    /// Percent of recorded pairs that closed positive
    pub fn win_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.profitable as f64 * 100.0 / self.total as f64
        }
    }

    /// Mean PnL of the winning pairs only
    pub fn avg_profit(&self) -> f64 {
        if self.profitable == 0 {
            0.0
        } else {
            self.profitable_value / self.profitable as f64
        }
    }
}

/// A bucket that passed the pattern filter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPattern<K> {
    pub key: K,
    pub total: usize,
    pub profitable: usize,
    pub win_rate: f64,
    pub avg_profit: f64,
}

/// Raw pattern buckets, keyed in first-seen order
#[derive(Debug, Clone, Default, Serialize)]
pub struct PatternStats {
    pub by_day: IndexMap<Weekday, PatternBucket>,
    pub by_time: IndexMap<String, PatternBucket>,
    pub by_holding: IndexMap<i64, PatternBucket>,
}

impl PatternStats {
    /// Every trade seeds (possibly empty) day/time buckets; every pair then
    /// records its PnL against the entry's day, the entry's time and its
    /// holding period.
    pub fn build(trades: &[Trade], pairs: &[TradePair]) -> Self {
        let mut stats = Self::default();

        for trade in trades {
            stats.by_day.entry(trade.day).or_default();
            stats.by_time.entry(trade.time.clone()).or_default();
        }

        for pair in pairs {
            stats.by_day.entry(pair.entry.day).or_default().record(pair.pnl);
            stats
                .by_time
                .entry(pair.entry.time.clone())
                .or_default()
                .record(pair.pnl);
            stats
                .by_holding
                .entry(pair.holding_period())
                .or_default()
                .record(pair.pnl);
        }

        stats
    }

    pub fn high_probability(&self, config: &AnalyzerConfig) -> HighProbabilityPatterns {
        HighProbabilityPatterns {
            days: rank_patterns(&self.by_day, config),
            times: rank_patterns(&self.by_time, config),
            holding_periods: rank_patterns(&self.by_holding, config),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HighProbabilityPatterns {
    pub days: Vec<RankedPattern<Weekday>>,
    pub times: Vec<RankedPattern<String>>,
    pub holding_periods: Vec<RankedPattern<i64>>,
}

/// Filter buckets by sample size and win rate, best first. The sort is
/// stable, so equal win rates keep first-seen order.
pub fn rank_patterns<K: Clone>(
    buckets: &IndexMap<K, PatternBucket>,
    config: &AnalyzerConfig,
) -> Vec<RankedPattern<K>> {
    let mut ranked: Vec<RankedPattern<K>> = buckets
        .iter()
        .filter(|(_, bucket)| config.passes_filter(bucket.total, bucket.win_rate()))
        .map(|(key, bucket)| RankedPattern {
            key: key.clone(),
            total: bucket.total,
            profitable: bucket.profitable,
            win_rate: bucket.win_rate(),
            avg_profit: bucket.avg_profit(),
        })
        .collect();

    ranked.sort_by(|a, b| b.win_rate.total_cmp(&a.win_rate));
    ranked
}

// ============================================================================
// Strategy recommendation
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
struct EntryTally {
    entries: usize,
    profitable: usize,
}

impl EntryTally {
    fn ratio(&self) -> f64 {
        if self.entries == 0 {
            0.0
        } else {
            self.profitable as f64 / self.entries as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyRecommendation {
    pub best_entry_day: Weekday,
    pub best_entry_time: String,
    /// Mean holding period of winning pairs, halves rounded toward +infinity
    pub avg_holding_period: i64,
    /// Highest-PnL winning pair
    pub sample_trade: TradePair,
}

/// Highest profitable/entries ratio; ties keep the first-seen key
fn best_ratio<K>(tallies: &IndexMap<K, EntryTally>) -> Option<&K> {
    let mut best: Option<(&K, f64)> = None;
    for (key, tally) in tallies {
        let ratio = tally.ratio();
        if best.map_or(true, |(_, current)| ratio > current) {
            best = Some((key, ratio));
        }
    }
    best.map(|(key, _)| key)
}

/// Nearest integer, halves rounding toward positive infinity (-2.5 -> -2)
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Build a recommendation from the pairs. Fails with `NoWinningPairs` when no
/// pair closed positive.
pub fn recommend_strategy(pairs: &[TradePair]) -> Result<StrategyRecommendation> {
    let mut by_day: IndexMap<Weekday, EntryTally> = IndexMap::new();
    let mut by_time: IndexMap<String, EntryTally> = IndexMap::new();
    let mut holding_sum = 0f64;
    let mut wins = 0usize;
    let mut sample: Option<&TradePair> = None;

    for pair in pairs {
        let win = pair.is_win();

        let day = by_day.entry(pair.entry.day).or_default();
        day.entries += 1;
        let time = by_time.entry(pair.entry.time.clone()).or_default();
        time.entries += 1;

        if win {
            day.profitable += 1;
            time.profitable += 1;
            holding_sum += pair.holding_period() as f64;
            wins += 1;

            if sample.map_or(true, |best| pair.pnl > best.pnl) {
                sample = Some(pair);
            }
        }
    }

    let sample = sample.ok_or(AnalysisError::NoWinningPairs)?;
    let best_entry_day = *best_ratio(&by_day).ok_or(AnalysisError::NoWinningPairs)?;
    let best_entry_time = best_ratio(&by_time)
        .ok_or(AnalysisError::NoWinningPairs)?
        .clone();

    Ok(StrategyRecommendation {
        best_entry_day,
        best_entry_time,
        avg_holding_period: round_half_up(holding_sum / wins as f64),
        sample_trade: sample.clone(),
    })
}

// ============================================================================
// Day×time opportunities
// ============================================================================

#[derive(Debug, Clone, Default)]
struct SlotSide {
    count: usize,
    success_count: usize,
    prices: Vec<f64>,
}

impl SlotSide {
    fn record(&mut self, price: f64, success: bool) {
        self.count += 1;
        self.prices.push(price);
        if success {
            self.success_count += 1;
        }
    }

    fn win_rate(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.success_count as f64 * 100.0 / self.count as f64
        }
    }

    fn avg_price(&self) -> f64 {
        if self.prices.is_empty() {
            0.0
        } else {
            self.prices.iter().sum::<f64>() / self.prices.len() as f64
        }
    }
}

#[derive(Debug, Clone, Default)]
struct SlotStats {
    entries: SlotSide,
    exits: SlotSide,
}

/// A day×time slot that reliably works as an entry (or exit)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Opportunity {
    pub day: Weekday,
    pub time: String,
    pub win_rate: f64,
    pub avg_price: f64,
    pub samples: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OpportunityReport {
    pub entries: Vec<Opportunity>,
    pub exits: Vec<Opportunity>,
}

impl OpportunityReport {
    pub fn top_entry(&self) -> Option<&Opportunity> {
        self.entries.first()
    }

    pub fn top_exit(&self) -> Option<&Opportunity> {
        self.exits.first()
    }
}

fn rank_slots<'a>(
    slots: impl Iterator<Item = (&'a (Weekday, String), &'a SlotSide)>,
    config: &AnalyzerConfig,
) -> Vec<Opportunity> {
    let mut ranked: Vec<Opportunity> = slots
        .filter(|(_, side)| config.passes_filter(side.count, side.win_rate()))
        .map(|((day, time), side)| Opportunity {
            day: *day,
            time: time.clone(),
            win_rate: side.win_rate(),
            avg_price: side.avg_price(),
            samples: side.count,
        })
        .collect();

    ranked.sort_by(|a, b| b.win_rate.total_cmp(&a.win_rate));
    ranked
}

/// Rank day×time slots by how often a pair entered (or exited) there and won
pub fn mine_opportunities(pairs: &[TradePair], config: &AnalyzerConfig) -> OpportunityReport {
    let mut slots: IndexMap<(Weekday, String), SlotStats> = IndexMap::new();

    for pair in pairs {
        let win = pair.is_win();
        slots
            .entry((pair.entry.day, pair.entry.time.clone()))
            .or_default()
            .entries
            .record(pair.entry.price, win);
        slots
            .entry((pair.exit.day, pair.exit.time.clone()))
            .or_default()
            .exits
            .record(pair.exit.price, win);
    }

    debug!("Mined {} day×time slots", slots.len());

    OpportunityReport {
        entries: rank_slots(slots.iter().map(|(k, s)| (k, &s.entries)), config),
        exits: rank_slots(slots.iter().map(|(k, s)| (k, &s.exits)), config),
    }
}
