//! Runners, bet types and placings. A [Placings] is an ordered, arity-tagged tuple of
//! distinct runners representing a candidate finish — 1st, 2nd and so on — written in
//! the `r1/r2/…` notation.

use anyhow::{bail, Context};
use ordinalizer::Ordinal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use strum_macros::{EnumCount, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Runner(usize);

impl Runner {
    pub fn number(number: usize) -> Self {
        Self::try_number(number).unwrap()
    }

    pub fn try_number(number: usize) -> anyhow::Result<Self> {
        if number == 0 {
            bail!("invalid runner number");
        }
        Ok(Self(number - 1))
    }

    pub fn index(index: usize) -> Self {
        Self(index)
    }

    pub fn as_index(&self) -> usize {
        self.0
    }

    pub fn as_number(&self) -> usize {
        self.0 + 1
    }
}

impl Display for Runner {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "r{}", self.as_number())
    }
}

impl FromStr for Runner {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let first_char = chars.next().context("no characters to parse")?;
        if first_char != 'r' {
            bail!("first character must be 'r'");
        }
        let remaining = chars.as_str();
        let runner_number: usize = remaining.parse()?;
        Runner::try_number(runner_number)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Ordinal,
    EnumCount,
    EnumIter,
    strum_macros::Display,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BetType {
    Exacta,
    Trifecta,
    Superfecta,
}

impl BetType {
    /// Podium length the bet covers.
    pub fn positions(&self) -> usize {
        match self {
            BetType::Exacta => 2,
            BetType::Trifecta => 3,
            BetType::Superfecta => 4,
        }
    }
}

/// A candidate finish order, tagged by arity so that an exacta can never carry a
/// superfecta's runners or vice versa.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Placings {
    Exacta([Runner; 2]),
    Trifecta([Runner; 3]),
    Superfecta([Runner; 4]),
}

impl Placings {
    /// Builds placings of the given bet type from runner indices in finish order.
    ///
    /// # Panics
    /// If the podium length does not match the bet type's arity.
    pub fn from_podium(bet_type: BetType, podium: &[usize]) -> Self {
        assert_eq!(
            bet_type.positions(),
            podium.len(),
            "{} podium must name {} runners",
            bet_type,
            bet_type.positions()
        );
        match bet_type {
            BetType::Exacta => Placings::Exacta([Runner::index(podium[0]), Runner::index(podium[1])]),
            BetType::Trifecta => Placings::Trifecta([
                Runner::index(podium[0]),
                Runner::index(podium[1]),
                Runner::index(podium[2]),
            ]),
            BetType::Superfecta => Placings::Superfecta([
                Runner::index(podium[0]),
                Runner::index(podium[1]),
                Runner::index(podium[2]),
                Runner::index(podium[3]),
            ]),
        }
    }

    pub fn bet_type(&self) -> BetType {
        match self {
            Placings::Exacta(_) => BetType::Exacta,
            Placings::Trifecta(_) => BetType::Trifecta,
            Placings::Superfecta(_) => BetType::Superfecta,
        }
    }

    pub fn runners(&self) -> &[Runner] {
        match self {
            Placings::Exacta(runners) => runners,
            Placings::Trifecta(runners) => runners,
            Placings::Superfecta(runners) => runners,
        }
    }
}

impl Display for Placings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let runners = self.runners();
        for (rank, runner) in runners.iter().enumerate() {
            write!(f, "{runner}")?;
            if rank != runners.len() - 1 {
                write!(f, "/")?;
            }
        }
        Ok(())
    }
}

impl FromStr for Placings {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut runners = vec![];
        for frag in s.split('/') {
            runners.push(Runner::from_str(frag)?);
        }
        match *runners.as_slice() {
            [first, second] => Ok(Placings::Exacta([first, second])),
            [first, second, third] => Ok(Placings::Trifecta([first, second, third])),
            [first, second, third, fourth] => {
                Ok(Placings::Superfecta([first, second, third, fourth]))
            }
            _ => bail!("{} placings do not form a supported bet type", runners.len()),
        }
    }
}
