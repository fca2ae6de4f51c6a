//! Candidate-opportunity matching: resume normalization, deterministic
//! scoring, and concurrent batch ranking.
//!
//! Scoring is pure and caller-driven. Opportunity criteria and resumes
//! arrive on every call; this module keeps no storage and no history.

pub mod criteria;
pub mod profile;
pub mod ranking;
pub mod router;
pub mod scoring;

#[cfg(test)]
mod tests;

pub use criteria::{
    CriteriaError, CriteriaId, CriteriaModel, FormatRequirements, KeywordRequirement,
    SkillRequirement,
};
pub use profile::{
    CandidateId, CandidateProfile, ExperienceEnd, ExperienceEntry, ProfileError, ResumeData,
};
pub use ranking::{
    BatchFailure, RankedEntry, Ranking, RankingError, RankingOptions, RankingService,
};
pub use router::matching_router;
pub use scoring::{EngineWeights, ScoreBreakdown, ScoreResult, ScoringEngine, WeightsError};
