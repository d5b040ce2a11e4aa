//! Monte Carlo sampling of finish orders by successive draws without replacement,
//! used to cross-check the analytic ordered-finish model.

use crate::probs::Fraction;
use tinyrand::Rand;

/// Samples one finish order into `podium` by drawing runners in proportion to their
/// win probability, removing each placed runner's mass from the pool.
pub fn run_once(probs: &[f64], podium: &mut [usize], bitmap: &mut [bool], rand: &mut impl Rand) {
    debug_assert_eq!(probs.len(), bitmap.len());
    debug_assert!(!podium.is_empty());
    debug_assert!(podium.len() <= probs.len());
    debug_assert!(validate_probs(probs));

    let runners = probs.len();
    let mut prob_sum = probs.iter().sum::<f64>();
    bitmap.fill(true);
    for rank in 0..podium.len() {
        let mut cumulative = 0.0;
        let random = random_f64(rand) * prob_sum;
        for runner in 0..runners {
            if bitmap[runner] {
                let prob = probs[runner];
                cumulative += prob;
                if cumulative >= random {
                    podium[rank] = runner;
                    bitmap[runner] = false;
                    prob_sum -= prob;
                    break;
                }
            }
        }
    }
}

/// Fraction of `trials` in which the sampled finish matches `podium` exactly.
pub fn exact_order_fraction(
    probs: &[f64],
    podium: &[usize],
    trials: u64,
    rand: &mut impl Rand,
) -> Fraction {
    let mut sampled = vec![0; podium.len()];
    let mut bitmap = vec![true; probs.len()];
    let mut numerator = 0;
    for _ in 0..trials {
        run_once(probs, &mut sampled, &mut bitmap, rand);
        if sampled == podium {
            numerator += 1;
        }
    }
    Fraction {
        numerator,
        denominator: trials,
    }
}

fn validate_probs(probs: &[f64]) -> bool {
    for &p in probs {
        debug_assert!(p >= 0.0, "invalid probs {probs:?}");
        debug_assert!(p <= 1.0, "invalid probs {probs:?}");
    }
    true
}

#[inline]
fn random_f64(rand: &mut impl Rand) -> f64 {
    rand.next_u64() as f64 / u64::MAX as f64
}
