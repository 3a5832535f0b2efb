//! Sequential PnL Pairer
//!
//! Treats the sequence as alternating entries and exits: rows (0,1), (2,3), ...
//! form round-trips. An odd trailing row has no exit and is ignored.

use serde::Serialize;
use tracing::debug;

use crate::error::{AnalysisError, Result};
use crate::types::{Trade, TradePair};

/// Pair rows `2k` and `2k+1`
pub fn pair_trades(trades: &[Trade]) -> Vec<TradePair> {
    trades
        .chunks_exact(2)
        .map(|pair| TradePair::new(pair[0].clone(), pair[1].clone()))
        .collect()
}

/// Round to 2 decimal places
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Statistics over all round-trips
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PnlSummary {
    pub total_pairs: usize,
    pub net_pnl: f64,
    pub profitable_trades: usize,
    pub loss_trades: usize,
    pub total_profit_value: f64, // Sum of positive PnLs
    pub total_loss_value: f64,   // Sum of |negative PnLs|
    pub max_profit: Option<TradePair>,
    pub max_loss: Option<TradePair>,
    pub win_rate: f64, // Percent, 2 decimals
    pub avg_win: f64,
    pub avg_loss: f64, // Negative
    pub profit_factor: f64,
}

impl PnlSummary {
    pub fn from_pairs(pairs: &[TradePair]) -> Self {
        let mut net_pnl = 0.0;
        let mut profitable_trades = 0usize;
        let mut loss_trades = 0usize;
        let mut total_profit_value = 0.0;
        let mut total_loss_value = 0.0;
        let mut max_profit: Option<&TradePair> = None;
        let mut max_loss: Option<&TradePair> = None;

        for pair in pairs {
            net_pnl += pair.pnl;

            if pair.is_win() {
                profitable_trades += 1;
                total_profit_value += pair.pnl;
            } else if pair.is_loss() {
                loss_trades += 1;
                total_loss_value += pair.pnl.abs();
            }

            if max_profit.map_or(true, |best| pair.pnl > best.pnl) {
                max_profit = Some(pair);
            }
            if max_loss.map_or(true, |worst| pair.pnl < worst.pnl) {
                max_loss = Some(pair);
            }
        }

        let total_pairs = pairs.len();
        let win_rate = if total_pairs > 0 {
            round2(profitable_trades as f64 * 100.0 / total_pairs as f64)
        } else {
            0.0
        };

        let avg_win = if profitable_trades > 0 {
            total_profit_value / profitable_trades as f64
        } else {
            0.0
        };

        let avg_loss = if loss_trades > 0 {
            -(total_loss_value / loss_trades as f64)
        } else {
            0.0
        };

        let profit_factor = if total_loss_value > 0.0 {
            total_profit_value / total_loss_value
        } else if total_profit_value > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        Self {
            total_pairs,
            net_pnl,
            profitable_trades,
            loss_trades,
            total_profit_value,
            total_loss_value,
            max_profit: max_profit.cloned(),
            max_loss: max_loss.cloned(),
            win_rate,
            avg_win,
            avg_loss,
            profit_factor,
        }
    }
}

/// Pair the sequence and summarise it. Needs at least two trades.
pub fn summarize(trades: &[Trade]) -> Result<(Vec<TradePair>, PnlSummary)> {
    if trades.len() < 2 {
        return Err(AnalysisError::InsufficientData {
            required: 2,
            found: trades.len(),
        });
    }

    let pairs = pair_trades(trades);
    if trades.len() % 2 == 1 {
        debug!("Odd trade count {}, last trade left unpaired", trades.len());
    }

    let summary = PnlSummary::from_pairs(&pairs);
    debug!(
        "Paired {} round-trips: net {:.2}, win rate {:.2}%",
        summary.total_pairs, summary.net_pnl, summary.win_rate
    );

    Ok((pairs, summary))
}
