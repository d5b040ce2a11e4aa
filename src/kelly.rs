//! Kelly staking: the bankroll fraction maximising long-run logarithmic growth for a
//! bet with a known edge. Advisory output only; nothing in this crate commits a stake.

/// Kelly fraction `f* = (P·(b + 1) − 1) / b` for win probability `probability` and net
/// payout multiple `net_payout`, clamped to `[0, 1]`: negative-edge bets floor at 0
/// rather than reporting a negative stake. A non-positive net payout carries no edge by
/// definition and also scores 0.
pub fn kelly_fraction(probability: f64, net_payout: f64) -> f64 {
    if net_payout <= 0.0 {
        return 0.0;
    }
    let fraction = (probability * (net_payout + 1.0) - 1.0) / net_payout;
    fraction.clamp(0.0, 1.0)
}
