//! Probability of an exact finish order, derived from win probabilities alone by
//! sequential conditioning: the winner is drawn from the full field, the runner-up
//! from the survivors with probabilities rescaled by the unclaimed mass, and so on
//! down the podium. Joint finish distributions are unobservable, so this is a
//! deliberate approximation rather than an exact joint model; it adjusts for rank
//! position but assumes elimination order is otherwise conditionally independent.

use crate::comb::is_unique_quadratic;

/// Floor applied to the unclaimed probability mass, guarding against win probabilities
/// whose sum exceeds 1 by floating round-off.
const MIN_RESIDUAL: f64 = 1e-12;

/// Probability that the race finishes in exactly the order given by `podium`, whose
/// elements index into `win_probs`. Accumulates in log-space so that long podiums over
/// outsiders do not underflow. A podium containing a zero-probability runner scores 0.
pub fn harville(win_probs: &[f64], podium: &[usize]) -> f64 {
    debug_assert!(podium.len() <= win_probs.len());
    debug_assert!(is_unique_quadratic(podium), "repeated runner in {podium:?}");

    let mut log_prob = 0.0;
    let mut claimed = 0.0;
    for &runner in podium {
        let prob = win_probs[runner];
        if prob == 0.0 {
            return 0.0;
        }
        let residual = f64::max(1.0 - claimed, MIN_RESIDUAL);
        log_prob += prob.ln() - residual.ln();
        claimed += prob;
    }
    log_prob.exp()
}
