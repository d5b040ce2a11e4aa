use stanza::style::{HAlign, Header, MinWidth, Separator, Styles};
use stanza::table::{Col, Row, Table};

use crate::engine::{BetCard, RaceOptimisation, RaceRunner};

/// Tabulates the field: one row per runner with the inputs the model saw. Absent
/// market odds and confidence ratings render as a dash, never a fabricated figure.
pub fn tabulate_runners(runners: &[RaceRunner]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Left)),
            Col::new(Styles::default().with(MinWidth(14)).with(HAlign::Left)),
            Col::new(Styles::default().with(MinWidth(12)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(12)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(12)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)).with(Separator(true)),
            vec![
                "Runner".into(),
                "Name".into(),
                "Win prob.".into(),
                "Market odds".into(),
                "Confidence".into(),
            ],
        ));

    for runner in runners {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                runner.id.clone().into(),
                runner.name.clone().into(),
                format!("{:.6}", runner.win_probability).into(),
                match runner.market_odds {
                    Some(odds) => format!("{odds:.2}").into(),
                    None => "-".into(),
                },
                match runner.model_confidence {
                    Some(confidence) => format!("{confidence:.2}").into(),
                    None => "-".into(),
                },
            ],
        ));
    }
    table
}

/// Tabulates scored combinations, one row per bet card, in the order given.
pub fn tabulate_bets(bets: &[&BetCard]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Left)),
            Col::new(Styles::default().with(MinWidth(14)).with(HAlign::Left)),
            Col::new(Styles::default().with(MinWidth(12)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)).with(Separator(true)),
            vec![
                "Bet type".into(),
                "Combination".into(),
                "Probability".into(),
                "Payout".into(),
                "EV".into(),
                "Kelly".into(),
                "Confidence".into(),
            ],
        ));

    for bet in bets {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                format!("{}", bet.bet_type).into(),
                bet.combination.join("/").into(),
                format!("{:.6}", bet.probability).into(),
                match bet.payout_odds {
                    Some(payout) => format!("{payout:.3}").into(),
                    None => "-".into(),
                },
                format!("{:.4}", bet.expected_value).into(),
                format!("{:.4}", bet.kelly_fraction).into(),
                format!("{:.3}", bet.confidence_score).into(),
            ],
        ));
    }

    table
}

/// Tabulates the per-race summary statistics.
pub fn tabulate_summary(optimisation: &RaceOptimisation) -> Table {
    let mut table = Table::default().with_cols(vec![
        Col::new(Styles::default().with(MinWidth(24)).with(HAlign::Left)),
        Col::new(Styles::default().with(MinWidth(12)).with(HAlign::Right)),
    ]);
    table.push_row(Row::new(
        Styles::default().with(Header(true)),
        vec!["Race".into(), optimisation.race_id.clone().into()],
    ));
    table.push_row(Row::new(
        Styles::default(),
        vec![
            "Combinations analysed".into(),
            format!("{}", optimisation.total_combinations).into(),
        ],
    ));
    table.push_row(Row::new(
        Styles::default(),
        vec![
            "Profitable opportunities".into(),
            format!("{}", optimisation.profitable_opportunities).into(),
        ],
    ));
    table.push_row(Row::new(
        Styles::default(),
        vec![
            "Profitability rate".into(),
            format!("{:.4}", optimisation.profitability_rate).into(),
        ],
    ));
    table.push_row(Row::new(
        Styles::default(),
        vec![
            "Average EV".into(),
            format!("{:.4}", optimisation.average_expected_value).into(),
        ],
    ));
    if !optimisation.pruned.is_empty() {
        let pruned: Vec<String> = optimisation
            .pruned
            .iter()
            .map(|bet_type| bet_type.to_string())
            .collect();
        table.push_row(Row::new(
            Styles::default(),
            vec!["Pruned bet types".into(), pruned.join(", ").into()],
        ));
    }
    table
}
