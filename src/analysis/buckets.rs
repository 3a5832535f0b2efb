//! Bucket Aggregator
//!
//! Groups trades by weekday and by time-of-day, keeping a running average
//! price per bucket, and ranks buckets to find the cheapest (buy) and most
//! expensive (sell) day and time.

use indexmap::IndexMap;
use serde::Serialize;

use crate::types::{Trade, Weekday};

/// Running price aggregate for trades sharing a key
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceBucket {
    pub count: usize,
    pub sum_price: f64,
    pub avg_price: f64,
    pub trades: Vec<Trade>,
}

impl PriceBucket {
    fn add(&mut self, trade: &Trade) {
        self.sum_price += trade.price;
        self.count += 1;
        self.avg_price = self.sum_price / self.count as f64;
        self.trades.push(trade.clone());
    }
}

/// Day and time buckets, in the order each key was first seen
#[derive(Debug, Clone, Default, Serialize)]
pub struct BucketAnalysis {
    pub by_day: IndexMap<Weekday, PriceBucket>,
    pub by_time: IndexMap<String, PriceBucket>,
}

impl BucketAnalysis {
    pub fn build(trades: &[Trade]) -> Self {
        let mut analysis = Self::default();
        for trade in trades {
            analysis.by_day.entry(trade.day).or_default().add(trade);
            analysis
                .by_time
                .entry(trade.time.clone())
                .or_default()
                .add(trade);
        }
        analysis
    }

    pub fn best_buy_day(&self) -> Option<Weekday> {
        select_bucket(&self.by_day, |candidate, best| candidate < best).copied()
    }

    pub fn best_sell_day(&self) -> Option<Weekday> {
        select_bucket(&self.by_day, |candidate, best| candidate > best).copied()
    }

    pub fn best_buy_time(&self) -> Option<String> {
        select_bucket(&self.by_time, |candidate, best| candidate < best).cloned()
    }

    pub fn best_sell_time(&self) -> Option<String> {
        select_bucket(&self.by_time, |candidate, best| candidate > best).cloned()
    }
}

/// Walk buckets in insertion order, replacing the current pick only when a
/// later bucket's average is strictly better. Ties keep the earliest key.
fn select_bucket<K>(
    buckets: &IndexMap<K, PriceBucket>,
    better: impl Fn(f64, f64) -> bool,
) -> Option<&K> {
    let mut iter = buckets.iter();
    let (mut best_key, first) = iter.next()?;
    let mut best_avg = first.avg_price;

    for (key, bucket) in iter {
        if better(bucket.avg_price, best_avg) {
            best_key = key;
            best_avg = bucket.avg_price;
        }
    }

    Some(best_key)
}
