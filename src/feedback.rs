//! Boundary for recording how a recommendation fared. The engine is a pure function
//! and owns no learning loop; implementations of [FeedbackSink] own their persistence
//! and whatever model refitting they drive from it.

use strum_macros::Display;
use tracing::info;

/// What the punter did with a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Response {
    Accepted,
    Declined,
    Ignored,
}

/// How the bet settled, when known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Outcome {
    Won,
    Lost,
    Voided,
}

pub trait FeedbackSink {
    fn record(&mut self, recommendation_id: &str, response: Response, outcome: Option<Outcome>);
}

/// Logs feedback without persisting it; a stand-in until a real learning loop is
/// attached.
#[derive(Debug, Default)]
pub struct LogSink;

impl FeedbackSink for LogSink {
    fn record(&mut self, recommendation_id: &str, response: Response, outcome: Option<Outcome>) {
        match outcome {
            Some(outcome) => {
                info!("recommendation {recommendation_id}: {response}, settled {outcome}")
            }
            None => info!("recommendation {recommendation_id}: {response}, unsettled"),
        }
    }
}
