//! Confidence scoring: a blended reliability indicator for a combination's estimate,
//! not a probability. Blends the upstream model's confidence in the contributing
//! runners, the concentration of the combination's probability relative to its bet
//! type's space, and a field-size penalty reflecting the compounding approximation
//! error of the ordered-finish model in wide fields.

use anyhow::bail;
use serde::{Deserialize, Serialize};

/// Per-position decay applied for every runner in the field beyond the podium length.
const FIELD_DECAY: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceWeights {
    pub model: f64,
    pub concentration: f64,
    pub field: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            model: 0.4,
            concentration: 0.4,
            field: 0.2,
        }
    }
}

impl ConfidenceWeights {
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, weight) in [
            ("model", self.model),
            ("concentration", self.concentration),
            ("field", self.field),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                bail!("{name} weight {weight} must be finite and non-negative");
            }
        }
        if self.model + self.concentration + self.field <= 0.0 {
            bail!("at least one confidence weight must be positive");
        }
        Ok(())
    }

    /// Blends the three signals into `[0, 1]`. Monotone non-decreasing in
    /// `model_confidence` and in `probability`, holding the rest fixed. A NaN
    /// `model_confidence` is treated as unknown and scores the neutral 0.5.
    pub fn score(
        &self,
        model_confidence: f64,
        probability: f64,
        mean_probability: f64,
        field: usize,
        positions: usize,
    ) -> f64 {
        let model = if model_confidence.is_nan() {
            0.5
        } else {
            model_confidence.clamp(0.0, 1.0)
        };
        let concentration = if probability + mean_probability > 0.0 {
            probability / (probability + mean_probability)
        } else {
            0.5
        };
        let surplus = field.saturating_sub(positions) as f64;
        let field = 1.0 / (1.0 + FIELD_DECAY * surplus);

        let weight_sum = self.model + self.concentration + self.field;
        let blended =
            (self.model * model + self.concentration * concentration + self.field * field)
                / weight_sum;
        blended.clamp(0.0, 1.0)
    }
}
