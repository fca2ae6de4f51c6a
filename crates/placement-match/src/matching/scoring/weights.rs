use serde::{Deserialize, Serialize};

use super::subscores::round_half_up;
use super::ScoreBreakdown;

/// Relative importance of each sub-score when blending the overall score.
///
/// Weights are injected configuration rather than constants so marketplaces
/// can tune the blend. They do not need to sum to one; the blend divides by
/// the total, so only the proportions matter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineWeights {
    pub skill: f64,
    pub keyword: f64,
    pub experience: f64,
    pub format: f64,
}

impl Default for EngineWeights {
    fn default() -> Self {
        Self {
            skill: 0.4,
            keyword: 0.25,
            experience: 0.25,
            format: 0.1,
        }
    }
}

impl EngineWeights {
    /// Builds a validated weight set. Each component must be finite and
    /// non-negative, and at least one must be positive.
    pub fn new(
        skill: f64,
        keyword: f64,
        experience: f64,
        format: f64,
    ) -> Result<Self, WeightsError> {
        for (field, value) in [
            ("skill", skill),
            ("keyword", keyword),
            ("experience", experience),
            ("format", format),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(WeightsError::InvalidComponent { field });
            }
        }

        let candidate = Self {
            skill,
            keyword,
            experience,
            format,
        };
        if candidate.total() <= 0.0 {
            return Err(WeightsError::AllZero);
        }
        Ok(candidate)
    }

    fn total(&self) -> f64 {
        self.skill + self.keyword + self.experience + self.format
    }

    /// Blends rounded sub-scores into the overall 0-100 score.
    pub(super) fn blend(&self, breakdown: &ScoreBreakdown) -> u32 {
        let weighted = self.skill * f64::from(breakdown.skill)
            + self.keyword * f64::from(breakdown.keyword)
            + self.experience * f64::from(breakdown.experience)
            + self.format * f64::from(breakdown.format);
        round_half_up(weighted / self.total())
    }
}

/// Rejections raised when constructing [`EngineWeights`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WeightsError {
    #[error("{field} weight must be a finite, non-negative number")]
    InvalidComponent { field: &'static str },
    #[error("at least one weight must be positive")]
    AllZero,
}
