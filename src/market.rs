//! Payout estimation. A combination with a market-quoted price for the exact bet takes
//! the quote; anything else falls back to the fair price `1/P`, discounted by the
//! operator's take rate. Prices here are decimal (gross) multiples; bet cards expose
//! the net multiple, `decimal − 1`.

use anyhow::bail;
use serde::{Deserialize, Serialize};

pub const MIN_PRICE: f64 = 1.0;
pub const MAX_PRICE: f64 = 10001.0;

pub trait MarketPrice {
    fn decimal(&self) -> f64;

    /// Net return multiple: profit per unit stake if the bet wins.
    fn net(&self) -> f64 {
        self.decimal() - 1.0
    }
}

impl MarketPrice for f64 {
    fn decimal(&self) -> f64 {
        *self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutModel {
    /// Operator margin withheld from the pool, as a fraction of the fair payout.
    pub take_rate: f64,
}

impl Default for PayoutModel {
    fn default() -> Self {
        Self { take_rate: 0.15 }
    }
}

impl PayoutModel {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..1.0).contains(&self.take_rate) {
            bail!("take rate {} must be in the range [0, 1)", self.take_rate);
        }
        Ok(())
    }

    /// Break-even decimal price for `probability`, discounted by the take rate and capped
    /// into the representable price range. `None` when the probability is not positive:
    /// a zero-probability combination has no meaningful payout.
    pub fn fair_price(&self, probability: f64) -> Option<f64> {
        if probability <= 0.0 {
            return None;
        }
        Some(capped(1.0 / probability * (1.0 - self.take_rate)))
    }
}

pub fn capped(price: f64) -> f64 {
    if price.is_finite() {
        f64::min(f64::max(MIN_PRICE, price), MAX_PRICE)
    } else {
        price
    }
}
