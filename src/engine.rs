//! The race optimiser: enumerates every legal finishing-order combination for each
//! exotic bet type, scores each with an ordered-finish probability, a payout, an
//! expected value, a Kelly stake fraction and a confidence figure, and aggregates the
//! lot into a single result with summary statistics. One invocation, one pure output;
//! no state is retained between calls.

use crate::comb::{count_permutations, Permuter};
use crate::confidence::ConfidenceWeights;
use crate::ev::expected_value;
use crate::harville::harville;
use crate::kelly::kelly_fraction;
use crate::market::{MarketPrice, PayoutModel, MIN_PRICE};
use crate::probs::SliceExt;
use crate::selection::{BetType, Placings};
use anyhow::bail;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use strum::{EnumCount, IntoEnumIterator};
use thiserror::Error;
use tracing::{debug, warn};

pub const MIN_RUNNERS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub payout: PayoutModel,
    pub weights: ConfidenceWeights,
    /// Probabilities are renormalised when their sum strays from 1 by more than this.
    pub normalise_tolerance: f64,
    /// Soft ceiling on combinations scored per bet type; beyond it the field is pruned
    /// to a shortlist of the strongest runners.
    pub combination_ceiling: u64,
    /// Cumulative win-probability mass the pruned shortlist must cover.
    pub prune_coverage: f64,
    /// Fractional-Kelly multiplier applied to the raw Kelly fraction.
    pub kelly_multiplier: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            payout: PayoutModel::default(),
            weights: ConfidenceWeights::default(),
            normalise_tolerance: 1e-3,
            combination_ceiling: 50_000,
            prune_coverage: 0.99,
            kelly_multiplier: 1.0,
        }
    }
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        self.payout.validate()?;
        self.weights.validate()?;
        if self.normalise_tolerance <= 0.0 {
            bail!(
                "normalise tolerance {} must be positive",
                self.normalise_tolerance
            );
        }
        if self.combination_ceiling == 0 {
            bail!("combination ceiling must be positive");
        }
        if !(0.0..=1.0).contains(&self.prune_coverage) {
            bail!(
                "prune coverage {} must be in the range [0, 1]",
                self.prune_coverage
            );
        }
        if !(0.0..=1.0).contains(&self.kelly_multiplier) {
            bail!(
                "kelly multiplier {} must be in the range [0, 1]",
                self.kelly_multiplier
            );
        }
        Ok(())
    }
}

/// One starter, as supplied by the caller. The win probability comes from an upstream
/// ranking model; `market_odds` are informational win odds, and `model_confidence` is
/// the upstream model's own confidence in the estimate. Absent ratings stay absent —
/// they propagate into a neutral confidence input, never a fabricated number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceRunner {
    pub id: String,
    pub name: String,
    pub win_probability: f64,
    #[serde(default)]
    pub market_odds: Option<f64>,
    #[serde(default)]
    pub model_confidence: Option<f64>,
}

/// A market-quoted decimal price for one exact combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExoticQuote {
    pub bet_type: BetType,
    /// Runner ids in finish order; must match the bet type's arity.
    pub runners: Vec<String>,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Race {
    /// Opaque to the engine; echoed into the result and log lines.
    pub race_id: String,
    pub runners: Vec<RaceRunner>,
    #[serde(default)]
    pub quotes: Vec<ExoticQuote>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimiserError {
    #[error("at least {} runners are required, got {0}", MIN_RUNNERS)]
    TooFewRunners(usize),

    #[error("win probability {probability} for runner {id} is outside [0, 1]")]
    InvalidProbability { id: String, probability: f64 },

    #[error("duplicate runner id {0}")]
    DuplicateRunner(String),

    #[error("{bet_type} quote names {got} runners, expected {expected}")]
    MalformedQuote {
        bet_type: BetType,
        got: usize,
        expected: usize,
    },

    #[error("{bet_type} quote references unknown runner id {id}")]
    UnknownQuotedRunner { bet_type: BetType, id: String },

    #[error("quoted price {price} is below the minimum of {}", MIN_PRICE)]
    InvalidQuotedPrice { price: f64 },
}

/// One scored combination. Immutable once produced; `payout_odds` is the net return
/// multiple, absent for zero-probability combinations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BetCard {
    pub bet_type: BetType,
    /// Runner ids in finish order.
    pub combination: Vec<String>,
    pub combination_names: Vec<String>,
    pub probability: f64,
    pub payout_odds: Option<f64>,
    pub expected_value: f64,
    pub kelly_fraction: f64,
    pub confidence_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceOptimisation {
    pub race_id: String,
    #[serde(rename = "totalCombinationsAnalyzed")]
    pub total_combinations: u64,
    pub profitable_opportunities: u64,
    pub profitability_rate: f64,
    pub average_expected_value: f64,
    pub exacta_bets: Vec<BetCard>,
    pub trifecta_bets: Vec<BetCard>,
    pub superfecta_bets: Vec<BetCard>,
    /// Bet types whose combination space was truncated by the ceiling.
    pub pruned: Vec<BetType>,
}

impl RaceOptimisation {
    pub fn bets(&self, bet_type: BetType) -> &[BetCard] {
        match bet_type {
            BetType::Exacta => &self.exacta_bets,
            BetType::Trifecta => &self.trifecta_bets,
            BetType::Superfecta => &self.superfecta_bets,
        }
    }

    fn empty(race_id: &str) -> Self {
        Self {
            race_id: race_id.to_string(),
            total_combinations: 0,
            profitable_opportunities: 0,
            profitability_rate: 0.0,
            average_expected_value: 0.0,
            exacta_bets: vec![],
            trifecta_bets: vec![],
            superfecta_bets: vec![],
            pruned: vec![],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Optimiser {
    config: Config,
}

impl TryFrom<Config> for Optimiser {
    type Error = anyhow::Error;

    fn try_from(config: Config) -> Result<Self, Self::Error> {
        config.validate()?;
        Ok(Self { config })
    }
}

impl Optimiser {
    /// Scores every legal combination for each applicable bet type. Bet lists come back
    /// in deterministic generation order; ranking and display limits are the caller's
    /// concern.
    pub fn optimise(&self, race: &Race) -> Result<RaceOptimisation, OptimiserError> {
        let field = race.runners.len();
        if field < MIN_RUNNERS {
            return Err(OptimiserError::TooFewRunners(field));
        }
        let mut index_by_id = FxHashMap::default();
        for (index, runner) in race.runners.iter().enumerate() {
            if !(0.0..=1.0).contains(&runner.win_probability) {
                return Err(OptimiserError::InvalidProbability {
                    id: runner.id.clone(),
                    probability: runner.win_probability,
                });
            }
            if index_by_id.insert(runner.id.clone(), index).is_some() {
                return Err(OptimiserError::DuplicateRunner(runner.id.clone()));
            }
        }
        let quoted_prices = resolve_quotes(&race.quotes, &index_by_id)?;

        let mut probs: Vec<f64> = race
            .runners
            .iter()
            .map(|runner| runner.win_probability)
            .collect();
        if probs.iter().all(|&prob| prob == 0.0) {
            debug!(
                "degenerate model for race {}: all win probabilities are zero",
                race.race_id
            );
            return Ok(RaceOptimisation::empty(&race.race_id));
        }
        let sum = probs.sum();
        if (sum - 1.0).abs() > self.config.normalise_tolerance {
            debug!(
                "win probabilities for race {} sum to {sum:.6}; normalising",
                race.race_id
            );
            probs.normalise(1.0);
        }

        let mut bets: [Vec<BetCard>; BetType::COUNT] = Default::default();
        let mut pruned = vec![];
        let mut total_combinations = 0;
        let mut profitable_opportunities = 0;
        let mut ev_sum = 0.0;

        for bet_type in BetType::iter() {
            let positions = bet_type.positions();
            if field < positions {
                continue;
            }
            let shortlist = self.shortlist(&probs, positions);
            if shortlist.len() < field {
                warn!(
                    "pruning {bet_type} for race {}: {} combinations exceed the ceiling \
                     of {}; keeping the top {} runners",
                    race.race_id,
                    count_permutations(field, positions),
                    self.config.combination_ceiling,
                    shortlist.len()
                );
                pruned.push(bet_type);
            }

            let mut scored = Vec::with_capacity(count_permutations(shortlist.len(), positions) as usize);
            for ordinals in Permuter::new(shortlist.len(), positions) {
                let podium: Vec<usize> = ordinals.iter().map(|&ordinal| shortlist[ordinal]).collect();
                let probability = harville(&probs, &podium);
                scored.push((podium, probability));
            }
            let mean_probability = scored
                .iter()
                .map(|(_, probability)| *probability)
                .sum::<f64>()
                / scored.len() as f64;

            for (podium, probability) in scored {
                // a zero-probability combination has no meaningful payout, quoted or not
                let price = if probability == 0.0 {
                    None
                } else {
                    let placings = Placings::from_podium(bet_type, &podium);
                    quoted_prices
                        .get(&placings)
                        .copied()
                        .or_else(|| self.config.payout.fair_price(probability))
                };
                let net_payout = price.map(|price| price.net());

                let ev = expected_value(probability, net_payout.unwrap_or(0.0));
                let kelly = net_payout
                    .map(|net| kelly_fraction(probability, net) * self.config.kelly_multiplier)
                    .unwrap_or(0.0);
                let model_confidence = podium
                    .iter()
                    .map(|&index| race.runners[index].model_confidence.unwrap_or(0.5))
                    .sum::<f64>()
                    / positions as f64;
                let confidence = self.config.weights.score(
                    model_confidence,
                    probability,
                    mean_probability,
                    field,
                    positions,
                );

                total_combinations += 1;
                ev_sum += ev;
                if ev > 0.0 {
                    profitable_opportunities += 1;
                }
                bets[bet_type.ordinal()].push(BetCard {
                    bet_type,
                    combination: podium
                        .iter()
                        .map(|&index| race.runners[index].id.clone())
                        .collect(),
                    combination_names: podium
                        .iter()
                        .map(|&index| race.runners[index].name.clone())
                        .collect(),
                    probability,
                    payout_odds: net_payout,
                    expected_value: ev,
                    kelly_fraction: kelly,
                    confidence_score: confidence,
                });
            }
        }

        let (profitability_rate, average_expected_value) = if total_combinations == 0 {
            (0.0, 0.0)
        } else {
            (
                profitable_opportunities as f64 / total_combinations as f64,
                ev_sum / total_combinations as f64,
            )
        };
        let [exacta_bets, trifecta_bets, superfecta_bets] = bets;
        Ok(RaceOptimisation {
            race_id: race.race_id.clone(),
            total_combinations,
            profitable_opportunities,
            profitability_rate,
            average_expected_value,
            exacta_bets,
            trifecta_bets,
            superfecta_bets,
            pruned,
        })
    }

    /// Runner indices admitted to enumeration, in field order. The full field when its
    /// permutation count fits the ceiling; otherwise the smallest strongest-first
    /// shortlist covering the configured probability mass, shrunk further until the
    /// count fits, but never below the podium length.
    fn shortlist(&self, probs: &[f64], positions: usize) -> Vec<usize> {
        let field = probs.len();
        if count_permutations(field, positions) <= self.config.combination_ceiling {
            return (0..field).collect();
        }

        let mut order: Vec<usize> = (0..field).collect();
        order.sort_by(|&a, &b| probs[b].total_cmp(&probs[a]).then(a.cmp(&b)));
        let mut cumulative = 0.0;
        let mut keep = 0;
        for &index in &order {
            cumulative += probs[index];
            keep += 1;
            if cumulative >= self.config.prune_coverage {
                break;
            }
        }
        keep = keep.max(positions);
        while keep > positions
            && count_permutations(keep, positions) > self.config.combination_ceiling
        {
            keep -= 1;
        }
        order.truncate(keep);
        order.sort_unstable();
        order
    }
}

fn resolve_quotes(
    quotes: &[ExoticQuote],
    index_by_id: &FxHashMap<String, usize>,
) -> Result<FxHashMap<Placings, f64>, OptimiserError> {
    let mut quoted_prices = FxHashMap::default();
    for quote in quotes {
        let expected = quote.bet_type.positions();
        if quote.runners.len() != expected {
            return Err(OptimiserError::MalformedQuote {
                bet_type: quote.bet_type,
                got: quote.runners.len(),
                expected,
            });
        }
        if !quote.price.is_finite() || quote.price < MIN_PRICE {
            return Err(OptimiserError::InvalidQuotedPrice { price: quote.price });
        }
        let mut podium = Vec::with_capacity(expected);
        for id in &quote.runners {
            let &index =
                index_by_id
                    .get(id)
                    .ok_or_else(|| OptimiserError::UnknownQuotedRunner {
                        bet_type: quote.bet_type,
                        id: id.clone(),
                    })?;
            podium.push(index);
        }
        quoted_prices.insert(Placings::from_podium(quote.bet_type, &podium), quote.price);
    }
    Ok(quoted_prices)
}

#[cfg(test)]
mod tests;
