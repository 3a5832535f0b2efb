//! Max-Profit Scanner
//!
//! Exhaustive O(n²) search for the buy/sell pair with the largest price
//! difference. Every ordered pair `i < j` is visited so that ties resolve to
//! the first pair in row-major order.

use serde::Serialize;

use crate::error::{AnalysisError, Result};
use crate::types::Trade;

/// Most profitable single round-trip within a sequence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaxProfit {
    pub buy_index: usize,
    pub sell_index: usize,
    pub buy: Trade,
    pub sell: Trade,
    /// May be zero or negative when prices only fall
    pub profit: f64,
}

pub fn find_max_profit(trades: &[Trade]) -> Result<MaxProfit> {
    if trades.len() < 2 {
        return Err(AnalysisError::InsufficientData {
            required: 2,
            found: trades.len(),
        });
    }

    let mut best = (0usize, 1usize);
    let mut max_profit = f64::NEG_INFINITY;

    for i in 0..trades.len() - 1 {
        for j in (i + 1)..trades.len() {
            let profit = trades[j].price - trades[i].price;
            if profit > max_profit {
                max_profit = profit;
                best = (i, j);
            }
        }
    }

    let (buy_index, sell_index) = best;
    Ok(MaxProfit {
        buy_index,
        sell_index,
        buy: trades[buy_index].clone(),
        sell: trades[sell_index].clone(),
        profit: max_profit,
    })
}
