use std::env;
use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use strum::IntoEnumIterator;
use tracing::{debug, info};

use quinella::engine::{BetCard, Config, Optimiser, Race};
use quinella::print;
use quinella::selection::BetType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum RankBy {
    /// expected value, highest first
    Ev,
    /// ordered-finish probability, highest first
    Probability,
    /// Kelly stake fraction, highest first
    Kelly,
}

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// JSON file containing the race
    file: PathBuf,

    /// number of bets to display per bet type
    #[clap(short = 't', long, default_value = "10")]
    top: usize,

    /// metric to rank the bets by
    #[clap(short = 'r', long, value_enum, default_value = "ev")]
    rank: RankBy,
}

fn main() -> Result<(), Box<dyn Error>> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    debug!("args: {args:?}");

    let race: Race = serde_json::from_reader(BufReader::new(File::open(&args.file)?))?;
    info!(
        "field for race {}:\n{}",
        race.race_id,
        Console::default().render(&print::tabulate_runners(&race.runners))
    );
    let optimiser = Optimiser::try_from(Config::default())?;

    let start_time = Instant::now();
    let optimisation = optimiser.optimise(&race)?;
    let elapsed = start_time.elapsed();
    info!(
        "optimised race {} ({} combinations) in {}ms",
        optimisation.race_id,
        optimisation.total_combinations,
        elapsed.as_millis()
    );

    for bet_type in BetType::iter() {
        let mut ranked: Vec<&BetCard> = optimisation.bets(bet_type).iter().collect();
        if ranked.is_empty() {
            continue;
        }
        ranked.sort_by(|a, b| match args.rank {
            RankBy::Ev => b.expected_value.total_cmp(&a.expected_value),
            RankBy::Probability => b.probability.total_cmp(&a.probability),
            RankBy::Kelly => b.kelly_fraction.total_cmp(&a.kelly_fraction),
        });
        ranked.truncate(args.top);
        info!(
            "top {} {bet_type} bets:\n{}",
            ranked.len(),
            Console::default().render(&print::tabulate_bets(&ranked))
        );
    }
    info!(
        "summary:\n{}",
        Console::default().render(&print::tabulate_summary(&optimisation))
    );
    Ok(())
}
