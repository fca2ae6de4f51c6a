//! Shared fixtures for the matching test suite.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::matching::{
    CandidateProfile, CriteriaId, CriteriaModel, EngineWeights, ExperienceEnd, ExperienceEntry,
    FormatRequirements, KeywordRequirement, RankingService, ResumeData, ScoringEngine,
    SkillRequirement,
};

pub(super) fn evaluation_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 1).expect("valid date")
}

/// Resume that matches `backend_criteria` on two of three skills and one of
/// two keywords, with just over three years of experience.
pub(super) fn intern_resume() -> ResumeData {
    ResumeData {
        skills: vec![
            "Rust".to_string(),
            " SQL ".to_string(),
            "rust".to_string(),
            "Python".to_string(),
        ],
        experience: vec![ExperienceEntry {
            title: "Backend Intern".to_string(),
            start: NaiveDate::from_ymd_opt(2021, 6, 1).expect("valid date"),
            end: ExperienceEnd::On(NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date")),
        }],
        has_contact_info: true,
        has_education_section: true,
        word_count: 650,
        summary: Some("Built data pipelines and internal tooling in Rust and Python.".to_string()),
    }
}

pub(super) fn intern_profile() -> CandidateProfile {
    CandidateProfile::from_resume(&intern_resume(), evaluation_date())
        .expect("fixture resume should normalize")
}

/// Criteria scoring the fixture resume at 75/50/100/100 and overall 78 under
/// the default weights.
pub(super) fn backend_criteria() -> CriteriaModel {
    CriteriaModel {
        id: CriteriaId("crit-backend".to_string()),
        required_skills: vec![
            SkillRequirement {
                skill: "rust".to_string(),
                weight: 2.0,
            },
            SkillRequirement {
                skill: "python".to_string(),
                weight: 1.0,
            },
            SkillRequirement {
                skill: "kubernetes".to_string(),
                weight: 1.0,
            },
        ],
        keywords: vec![
            KeywordRequirement {
                term: "pipelines".to_string(),
                weight: 1.0,
            },
            KeywordRequirement {
                term: "grpc".to_string(),
                weight: 1.0,
            },
        ],
        minimum_experience: 2.0,
        format: FormatRequirements {
            preferred_length: Some(600),
            requires_contact_info: true,
            requires_education: true,
        },
        active: true,
    }
}

/// Criteria with only skill requirements; the other components score 100, so
/// the overall collapses to `0.4 * skill + 60` under the default weights.
pub(super) fn skill_criteria(id: &str, skills: &[(&str, f64)]) -> CriteriaModel {
    CriteriaModel {
        id: CriteriaId(id.to_string()),
        required_skills: skills
            .iter()
            .map(|(skill, weight)| SkillRequirement {
                skill: (*skill).to_string(),
                weight: *weight,
            })
            .collect(),
        keywords: Vec::new(),
        minimum_experience: 0.0,
        format: FormatRequirements {
            preferred_length: None,
            requires_contact_info: false,
            requires_education: false,
        },
        active: true,
    }
}

pub(super) fn bare_profile(skills: &[&str], years: f64) -> CandidateProfile {
    CandidateProfile {
        skills: skills.iter().map(|skill| (*skill).to_string()).collect(),
        years_of_experience: years,
        has_contact_info: true,
        has_education_section: true,
        resume_length: 400,
        search_text: skills.join(" "),
    }
}

pub(super) fn engine() -> ScoringEngine {
    ScoringEngine::new(EngineWeights::default())
}

pub(super) fn ranking_service() -> RankingService {
    RankingService::new(Arc::new(engine()))
}

pub(super) async fn read_json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&bytes).expect("body should be valid json")
}
