use super::*;
use crate::testing::assert_slice_f64_relative;
use assert_float_eq::*;

fn runner(number: usize, win_probability: f64) -> RaceRunner {
    RaceRunner {
        id: format!("r{number}"),
        name: format!("Runner {number}"),
        win_probability,
        market_odds: None,
        model_confidence: None,
    }
}

fn race(probs: &[f64]) -> Race {
    Race {
        race_id: "race-1".to_string(),
        runners: probs
            .iter()
            .enumerate()
            .map(|(index, &prob)| runner(index + 1, prob))
            .collect(),
        quotes: vec![],
    }
}

fn optimiser() -> Optimiser {
    Optimiser::try_from(Config::default()).unwrap()
}

fn find<'a>(cards: &'a [BetCard], ids: &[&str]) -> &'a BetCard {
    cards
        .iter()
        .find(|card| card.combination == ids)
        .unwrap_or_else(|| panic!("no card for {ids:?}"))
}

#[test]
fn four_runner_field_counts() {
    let result = optimiser().optimise(&race(&[0.4, 0.3, 0.2, 0.1])).unwrap();
    assert_eq!(12, result.exacta_bets.len());
    assert_eq!(24, result.trifecta_bets.len());
    assert_eq!(24, result.superfecta_bets.len());
    assert_eq!(60, result.total_combinations);
    assert!(result.pruned.is_empty());
}

#[test]
fn bet_type_space_is_exhaustive() {
    // the first k finishers are always some ordered k-tuple, so each full space sums to 1
    let result = optimiser().optimise(&race(&[0.4, 0.3, 0.2, 0.1])).unwrap();
    for bet_type in BetType::iter() {
        let sum: f64 = result
            .bets(bet_type)
            .iter()
            .map(|card| card.probability)
            .sum();
        assert_float_relative_eq!(1.0, sum, 1e-9);
    }
}

#[test]
fn fair_priced_combinations_surrender_the_take() {
    // with no quotes, every uncapped fair price leaves EV at exactly −take_rate
    let result = optimiser().optimise(&race(&[0.4, 0.3, 0.2, 0.1])).unwrap();
    assert_eq!(0, result.profitable_opportunities);
    assert_eq!(0.0, result.profitability_rate);
    assert_float_relative_eq!(-0.15, result.average_expected_value, 1e-9);
    for card in &result.exacta_bets {
        assert_float_relative_eq!(-0.15, card.expected_value, 1e-9);
    }
}

#[test]
fn two_runner_field() {
    let result = optimiser().optimise(&race(&[0.7, 0.3])).unwrap();
    assert_eq!(2, result.exacta_bets.len());
    assert!(result.trifecta_bets.is_empty());
    assert!(result.superfecta_bets.is_empty());
    assert_eq!(2, result.total_combinations);
}

#[test]
fn too_few_runners() {
    assert_eq!(
        Err(OptimiserError::TooFewRunners(1)),
        optimiser().optimise(&race(&[1.0]))
    );
    assert_eq!(
        Err(OptimiserError::TooFewRunners(0)),
        optimiser().optimise(&race(&[]))
    );
}

#[test]
fn invalid_probability() {
    for probability in [-0.1, 1.5, f64::NAN] {
        let result = optimiser().optimise(&race(&[0.5, probability]));
        assert!(
            matches!(
                result,
                Err(OptimiserError::InvalidProbability { ref id, .. }) if id == "r2"
            ),
            "{result:?}"
        );
    }
}

#[test]
fn duplicate_runner() {
    let mut race = race(&[0.5, 0.5]);
    race.runners[1].id = "r1".to_string();
    assert_eq!(
        Err(OptimiserError::DuplicateRunner("r1".to_string())),
        optimiser().optimise(&race)
    );
}

#[test]
fn degenerate_all_zero_yields_empty_result() {
    let result = optimiser().optimise(&race(&[0.0, 0.0, 0.0])).unwrap();
    assert_eq!(0, result.total_combinations);
    assert_eq!(0, result.profitable_opportunities);
    assert_eq!(0.0, result.profitability_rate);
    assert_eq!(0.0, result.average_expected_value);
    assert!(result.exacta_bets.is_empty());
    assert!(result.trifecta_bets.is_empty());
    assert!(result.superfecta_bets.is_empty());
}

#[test]
fn zero_probability_runner_scores_zero_cards() {
    let result = optimiser().optimise(&race(&[0.5, 0.3, 0.2, 0.0])).unwrap();
    assert_eq!(60, result.total_combinations);
    let mut containing_scratched = 0;
    for bet_type in BetType::iter() {
        for card in result.bets(bet_type) {
            if card.combination.iter().any(|id| id == "r4") {
                containing_scratched += 1;
                assert_eq!(0.0, card.probability, "{card:?}");
                assert_eq!(None, card.payout_odds, "{card:?}");
                assert_eq!(-1.0, card.expected_value, "{card:?}");
                assert_eq!(0.0, card.kelly_fraction, "{card:?}");
            } else {
                assert!(card.probability > 0.0, "{card:?}");
                assert!(card.payout_odds.is_some(), "{card:?}");
            }
        }
    }
    assert!(containing_scratched > 0);
    assert_eq!(0, result.profitable_opportunities);
}

#[test]
fn generation_order_is_stable() {
    let result = optimiser().optimise(&race(&[0.5, 0.3, 0.2])).unwrap();
    let order: Vec<_> = result
        .exacta_bets
        .iter()
        .map(|card| card.combination.join("/"))
        .collect();
    assert_eq!(
        vec!["r2/r1", "r3/r1", "r1/r2", "r3/r2", "r1/r3", "r2/r3"],
        order
    );
    assert_eq!(
        vec!["Runner 2".to_string(), "Runner 1".to_string()],
        result.exacta_bets[0].combination_names
    );
}

#[test]
fn idempotent() {
    let race = race(&[0.35, 0.25, 0.2, 0.12, 0.08]);
    let optimiser = optimiser();
    assert_eq!(
        optimiser.optimise(&race).unwrap(),
        optimiser.optimise(&race).unwrap()
    );
}

#[test]
fn normalisation_matches_prenormalised_input() {
    let optimiser = optimiser();
    let baseline = optimiser
        .optimise(&race(&[0.5, 0.25, 0.125, 0.125]))
        .unwrap();
    let doubled = optimiser.optimise(&race(&[1.0, 0.5, 0.25, 0.25])).unwrap();
    assert_eq!(baseline, doubled);
}

#[test]
fn quoted_price_overrides_fair_price() {
    let mut race = race(&[0.5, 0.3, 0.2]);
    race.quotes.push(ExoticQuote {
        bet_type: BetType::Exacta,
        runners: vec!["r1".to_string(), "r2".to_string()],
        price: 6.0,
    });
    let result = optimiser().optimise(&race).unwrap();

    let quoted = find(&result.exacta_bets, &["r1", "r2"]);
    assert_float_relative_eq!(0.3, quoted.probability, 1e-12);
    assert_float_relative_eq!(5.0, quoted.payout_odds.unwrap(), 1e-12);
    // EV = 0.3 × 5 − 0.7; f* = (0.3 × 6 − 1) / 5
    assert_float_relative_eq!(0.8, quoted.expected_value, 1e-12);
    assert_float_relative_eq!(0.16, quoted.kelly_fraction, 1e-12);
    assert_eq!(1, result.profitable_opportunities);
    assert_float_relative_eq!(1.0 / 12.0, result.profitability_rate, 1e-12);

    // the reverse ordering is unquoted and stays on the fair price
    let unquoted = find(&result.exacta_bets, &["r2", "r1"]);
    assert_float_relative_eq!(-0.15, unquoted.expected_value, 1e-9);
}

#[test]
fn malformed_quote() {
    let mut short = race(&[0.5, 0.3, 0.2]);
    short.quotes.push(ExoticQuote {
        bet_type: BetType::Trifecta,
        runners: vec!["r1".to_string(), "r2".to_string()],
        price: 20.0,
    });
    assert_eq!(
        Err(OptimiserError::MalformedQuote {
            bet_type: BetType::Trifecta,
            got: 2,
            expected: 3
        }),
        optimiser().optimise(&short)
    );

    let mut unknown = race(&[0.5, 0.3, 0.2]);
    unknown.quotes.push(ExoticQuote {
        bet_type: BetType::Exacta,
        runners: vec!["r1".to_string(), "r9".to_string()],
        price: 6.0,
    });
    assert_eq!(
        Err(OptimiserError::UnknownQuotedRunner {
            bet_type: BetType::Exacta,
            id: "r9".to_string()
        }),
        optimiser().optimise(&unknown)
    );

    let mut cheap = race(&[0.5, 0.3, 0.2]);
    cheap.quotes.push(ExoticQuote {
        bet_type: BetType::Exacta,
        runners: vec!["r1".to_string(), "r2".to_string()],
        price: 0.9,
    });
    assert_eq!(
        Err(OptimiserError::InvalidQuotedPrice { price: 0.9 }),
        optimiser().optimise(&cheap)
    );
}

#[test]
fn non_finite_quoted_price() {
    for price in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let mut race = race(&[0.5, 0.3, 0.2]);
        race.quotes.push(ExoticQuote {
            bet_type: BetType::Exacta,
            runners: vec!["r1".to_string(), "r2".to_string()],
            price,
        });
        let result = optimiser().optimise(&race);
        assert!(
            matches!(result, Err(OptimiserError::InvalidQuotedPrice { .. })),
            "price {price}: {result:?}"
        );
    }
}

#[test]
fn quote_on_zero_probability_combination_is_ignored() {
    let mut race = race(&[0.5, 0.3, 0.2, 0.0]);
    race.quotes.push(ExoticQuote {
        bet_type: BetType::Exacta,
        runners: vec!["r4".to_string(), "r1".to_string()],
        price: 50.0,
    });
    let result = optimiser().optimise(&race).unwrap();
    let card = find(&result.exacta_bets, &["r4", "r1"]);
    assert_eq!(0.0, card.probability);
    assert_eq!(None, card.payout_odds);
    assert_eq!(-1.0, card.expected_value);
    assert_eq!(0.0, card.kelly_fraction);
}

#[test]
fn nan_model_confidence_keeps_scores_bounded() {
    let mut race = race(&[0.4, 0.3, 0.2, 0.1]);
    race.runners[0].model_confidence = Some(f64::NAN);
    let result = optimiser().optimise(&race).unwrap();
    for bet_type in BetType::iter() {
        for card in result.bets(bet_type) {
            assert!(
                (0.0..=1.0).contains(&card.confidence_score),
                "confidence {} on {card:?}",
                card.confidence_score
            );
            assert!(card.expected_value.is_finite(), "{card:?}");
            assert!(card.kelly_fraction.is_finite(), "{card:?}");
        }
    }
}

#[test]
fn wide_field_is_pruned_to_the_ceiling() {
    let config = Config {
        combination_ceiling: 60,
        ..Default::default()
    };
    let optimiser = Optimiser::try_from(config).unwrap();
    let result = optimiser.optimise(&race(&vec![1.0 / 14.0; 14])).unwrap();

    // 8·7 = 56, 5·4·3 = 60, 4·3·2·1 = 24 are the largest spaces fitting the ceiling
    assert_eq!(56, result.exacta_bets.len());
    assert_eq!(60, result.trifecta_bets.len());
    assert_eq!(24, result.superfecta_bets.len());
    assert_eq!(
        vec![BetType::Exacta, BetType::Trifecta, BetType::Superfecta],
        result.pruned
    );
    for bet_type in BetType::iter() {
        assert!(result.bets(bet_type).len() as u64 <= 60);
    }
}

#[test]
fn pruned_shortlist_keeps_the_strongest_runners() {
    let config = Config {
        combination_ceiling: 6,
        ..Default::default()
    };
    let optimiser = Optimiser::try_from(config).unwrap();
    let result = optimiser
        .optimise(&race(&[0.05, 0.4, 0.3, 0.2, 0.05]))
        .unwrap();

    // exacta shrinks to the top 3 runners by win probability: r2, r3, r4
    assert_eq!(6, result.exacta_bets.len());
    for card in &result.exacta_bets {
        for id in &card.combination {
            assert!(["r2", "r3", "r4"].contains(&id.as_str()), "{card:?}");
        }
    }
}

#[test]
fn summary_statistics_are_consistent() {
    let mut race = race(&[0.4, 0.3, 0.2, 0.1]);
    race.quotes.push(ExoticQuote {
        bet_type: BetType::Exacta,
        runners: vec!["r1".to_string(), "r2".to_string()],
        price: 8.0,
    });
    let result = optimiser().optimise(&race).unwrap();

    let cards: Vec<_> = BetType::iter()
        .flat_map(|bet_type| result.bets(bet_type).to_vec())
        .collect();
    assert_eq!(cards.len() as u64, result.total_combinations);
    assert_eq!(
        cards.iter().filter(|card| card.expected_value > 0.0).count() as u64,
        result.profitable_opportunities
    );
    assert_float_relative_eq!(
        result.profitable_opportunities as f64 / result.total_combinations as f64,
        result.profitability_rate,
        1e-12
    );
    assert_float_relative_eq!(
        cards.iter().map(|card| card.expected_value).sum::<f64>() / cards.len() as f64,
        result.average_expected_value,
        1e-12
    );
}

#[test]
fn confidence_scores_are_bounded() {
    let mut race = race(&[0.4, 0.3, 0.2, 0.1]);
    race.runners[0].model_confidence = Some(0.9);
    race.runners[3].model_confidence = Some(0.1);
    let result = optimiser().optimise(&race).unwrap();
    for bet_type in BetType::iter() {
        for card in result.bets(bet_type) {
            assert!(
                (0.0..=1.0).contains(&card.confidence_score),
                "confidence {} on {card:?}",
                card.confidence_score
            );
        }
    }
}

#[test]
fn kelly_multiplier_scales_fractions() {
    let mut quoted = race(&[0.5, 0.3, 0.2]);
    quoted.quotes.push(ExoticQuote {
        bet_type: BetType::Exacta,
        runners: vec!["r1".to_string(), "r2".to_string()],
        price: 6.0,
    });
    let full = optimiser().optimise(&quoted).unwrap();
    let half = Optimiser::try_from(Config {
        kelly_multiplier: 0.5,
        ..Default::default()
    })
    .unwrap()
    .optimise(&quoted)
    .unwrap();

    let full_card = find(&full.exacta_bets, &["r1", "r2"]);
    let half_card = find(&half.exacta_bets, &["r1", "r2"]);
    assert_float_relative_eq!(
        full_card.kelly_fraction / 2.0,
        half_card.kelly_fraction,
        1e-12
    );
}

#[test]
fn probabilities_renormalised_when_out_of_tolerance() {
    let result = optimiser().optimise(&race(&[0.8, 0.6, 0.4, 0.2])).unwrap();
    let winners: Vec<_> = result
        .exacta_bets
        .iter()
        .filter(|card| card.combination[0] == "r1")
        .map(|card| card.probability)
        .collect();
    // r1 normalises to 0.4; its three exactas condition the runner-up on the 0.6 residual
    assert_slice_f64_relative(
        &[0.4 * 0.3 / 0.6, 0.4 * 0.2 / 0.6, 0.4 * 0.1 / 0.6],
        &winners,
        1e-9,
    );
}

#[test]
fn config_validation() {
    assert!(Optimiser::try_from(Config::default()).is_ok());
    assert!(Optimiser::try_from(Config {
        combination_ceiling: 0,
        ..Default::default()
    })
    .is_err());
    assert!(Optimiser::try_from(Config {
        prune_coverage: 1.5,
        ..Default::default()
    })
    .is_err());
    assert!(Optimiser::try_from(Config {
        kelly_multiplier: -0.5,
        ..Default::default()
    })
    .is_err());
    assert!(Optimiser::try_from(Config {
        normalise_tolerance: 0.0,
        ..Default::default()
    })
    .is_err());
}

#[test]
fn serialised_result_honours_the_wire_contract() {
    let result = optimiser().optimise(&race(&[0.5, 0.3, 0.2, 0.0])).unwrap();
    let value = serde_json::to_value(&result).unwrap();

    let object = value.as_object().unwrap();
    for key in [
        "raceId",
        "totalCombinationsAnalyzed",
        "profitableOpportunities",
        "profitabilityRate",
        "averageExpectedValue",
        "exactaBets",
        "trifectaBets",
        "superfectaBets",
        "pruned",
    ] {
        assert!(object.contains_key(key), "missing {key}");
    }

    let card = value["exactaBets"][0].as_object().unwrap();
    for key in [
        "betType",
        "combination",
        "combinationNames",
        "probability",
        "payoutOdds",
        "expectedValue",
        "kellyFraction",
        "confidenceScore",
    ] {
        assert!(card.contains_key(key), "missing {key}");
    }
    assert_eq!("exacta", card["betType"]);

    // zero-probability cards serialise a null payout
    let scratched = value["exactaBets"]
        .as_array()
        .unwrap()
        .iter()
        .find(|card| card["combination"][0] == "r4")
        .unwrap();
    assert!(scratched["payoutOdds"].is_null());
}

#[test]
fn race_input_deserialises() {
    let race: Race = serde_json::from_str(
        r#"{
            "raceId": "MV-R7",
            "runners": [
                {"id": "r1", "name": "Boilover", "winProbability": 0.55, "marketOdds": 1.9},
                {"id": "r2", "name": "Dead Heat", "winProbability": 0.45, "modelConfidence": 0.7}
            ],
            "quotes": [
                {"betType": "exacta", "runners": ["r1", "r2"], "price": 3.4}
            ]
        }"#,
    )
    .unwrap();
    assert_eq!("MV-R7", race.race_id);
    assert_eq!(2, race.runners.len());
    assert_eq!(Some(1.9), race.runners[0].market_odds);
    assert_eq!(None, race.runners[0].model_confidence);
    assert_eq!(BetType::Exacta, race.quotes[0].bet_type);

    let result = optimiser().optimise(&race).unwrap();
    assert_eq!(2, result.total_combinations);
}
