//! An exotic-bet optimiser for racing events. Enumerates every exacta, trifecta and
//! superfecta combination in a race, derives ordered-finish probabilities from win
//! probabilities alone, and scores each combination with an estimated payout, expected
//! value, Kelly stake fraction and confidence figure.

pub mod comb;
pub mod confidence;
pub mod engine;
pub mod ev;
pub mod feedback;
pub mod harville;
pub mod kelly;
pub mod market;
pub mod mc;
pub mod print;
pub mod probs;
pub mod selection;

#[cfg(test)]
pub(crate) mod testing;

#[doc = include_str!("../README.md")]
#[cfg(doc)]
fn readme() {}
