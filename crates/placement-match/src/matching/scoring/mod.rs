mod subscores;
mod weights;

pub use weights::{EngineWeights, WeightsError};

pub(crate) use subscores::{FORMAT_FLAG_PENALTY, LENGTH_TOLERANCE};

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::criteria::CriteriaModel;
use super::profile::CandidateProfile;

/// Stateless evaluator turning a profile/criteria pair into a score.
///
/// `score` is a pure function: no I/O, no clock, no mutation of its inputs.
/// Identical inputs always produce identical results, and a shared engine
/// can be called from any number of threads at once.
pub struct ScoringEngine {
    weights: EngineWeights,
}

impl ScoringEngine {
    pub fn new(weights: EngineWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &EngineWeights {
        &self.weights
    }

    /// Scores one candidate against one opportunity.
    ///
    /// Both sides are expected in canonical form ([`CandidateProfile`] from
    /// its normalizer, [`CriteriaModel::canonicalized`]); comparison is
    /// exact-string over those forms. Inactive criteria score like any
    /// other, exclusion from listings is ranking policy, not scoring.
    pub fn score(&self, profile: &CandidateProfile, criteria: &CriteriaModel) -> ScoreResult {
        let (skill, matched_skills, missing_skills) = subscores::skill_score(profile, criteria);
        let breakdown = ScoreBreakdown {
            skill,
            keyword: subscores::keyword_score(profile, criteria),
            experience: subscores::experience_score(
                profile.years_of_experience,
                criteria.minimum_experience,
            ),
            format: subscores::format_score(profile, criteria),
        };

        ScoreResult {
            overall: self.weights.blend(&breakdown),
            breakdown,
            matched_skills,
            missing_skills,
        }
    }
}

/// The four sub-scores, each rounded half-up into 0-100.
///
/// The overall score is reproducible from these: it is the weighted average
/// of the rounded components, rounded half-up again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub skill: u32,
    pub keyword: u32,
    pub experience: u32,
    pub format: u32,
}

/// Transparent scoring outcome for one candidate/opportunity pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub overall: u32,
    pub breakdown: ScoreBreakdown,
    pub matched_skills: BTreeSet<String>,
    pub missing_skills: BTreeSet<String>,
}

impl ScoreResult {
    /// Ordering used by every ranked listing: higher overall first, then
    /// higher skill sub-score, then more matched skills. Callers break any
    /// remaining tie on their own identifier so rankings are a total order.
    pub fn ranking_cmp(&self, other: &Self) -> Ordering {
        other
            .overall
            .cmp(&self.overall)
            .then_with(|| other.breakdown.skill.cmp(&self.breakdown.skill))
            .then_with(|| other.matched_skills.len().cmp(&self.matched_skills.len()))
    }
}
