//! Expected value per unit stake. The payout convention throughout the crate is the
//! **net** multiple: `net_payout` is the profit on a winning unit bet, so
//! `EV = P·b − (1 − P)`. A decimal (gross) price converts via [`MarketPrice::net`].
//!
//! [`MarketPrice::net`]: crate::market::MarketPrice::net

/// Mean net profit per unit stake for a bet with win probability `probability` and net
/// payout multiple `net_payout`.
pub fn expected_value(probability: f64, net_payout: f64) -> f64 {
    probability * net_payout - (1.0 - probability)
}
