//! Shared fixtures for the application lifecycle test suite.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, Utc};

use crate::applications::{
    Application, ApplicationId, ApplicationRepository, ApplicationService, NewApplication,
    RepositoryError,
};
use crate::matching::{
    CandidateId, CriteriaId, CriteriaModel, EngineWeights, FormatRequirements, ResumeData,
    ScoreBreakdown, ScoreResult, ScoringEngine, SkillRequirement,
};

pub(super) fn fixed_now() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2025, 7, 1)
        .expect("valid date")
        .and_hms_opt(12, 0, 0)
        .expect("valid time")
        .and_utc()
}

pub(super) fn evaluation_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 1).expect("valid date")
}

/// Criteria with a single skill requirement; `matching_resume` scores 100
/// against it.
pub(super) fn posting_criteria(id: &str) -> CriteriaModel {
    CriteriaModel {
        id: CriteriaId(id.to_string()),
        required_skills: vec![SkillRequirement {
            skill: "rust".to_string(),
            weight: 1.0,
        }],
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

pub(super) fn matching_resume() -> ResumeData {
    ResumeData {
        skills: vec!["Rust".to_string()],
        experience: Vec::new(),
        has_contact_info: true,
        has_education_section: true,
        word_count: 300,
        summary: None,
    }
}

pub(super) fn score_result(overall: u32, skill: u32) -> ScoreResult {
    ScoreResult {
        overall,
        breakdown: ScoreBreakdown {
            skill,
            keyword: 100,
            experience: 100,
            format: 100,
        },
        matched_skills: BTreeSet::new(),
        missing_skills: BTreeSet::new(),
    }
}

pub(super) fn new_application(candidate: &str, criteria: &str) -> NewApplication {
    NewApplication {
        candidate_id: CandidateId(candidate.to_string()),
        criteria_id: CriteriaId(criteria.to_string()),
        score: None,
    }
}

pub(super) fn scored_application(
    candidate: &str,
    criteria: &str,
    overall: u32,
    skill: u32,
) -> NewApplication {
    NewApplication {
        score: Some(score_result(overall, skill)),
        ..new_application(candidate, criteria)
    }
}

pub(super) fn scoring_engine() -> ScoringEngine {
    ScoringEngine::new(EngineWeights::default())
}

pub(super) fn memory_service() -> ApplicationService<MemoryRepository> {
    ApplicationService::new(Arc::new(MemoryRepository::default()), Arc::new(scoring_engine()))
}

/// Map-backed repository with the same compare-and-swap semantics the
/// service binary's store has.
#[derive(Default)]
pub(super) struct MemoryRepository {
    records: Mutex<BTreeMap<ApplicationId, Application>>,
}

impl ApplicationRepository for MemoryRepository {
    fn insert(&self, record: Application) -> Result<Application, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(
        &self,
        record: Application,
        expected_version: u64,
    ) -> Result<Application, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let stored = guard.get_mut(&record.id).ok_or(RepositoryError::NotFound)?;
        if stored.version != expected_version {
            return Err(RepositoryError::StaleVersion {
                current: stored.version,
            });
        }
        *stored = record.clone();
        Ok(record)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn for_opportunity(
        &self,
        criteria_id: &CriteriaId,
    ) -> Result<Vec<Application>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| &record.criteria_id == criteria_id)
            .cloned()
            .collect())
    }
}

/// Repository that fails every call, for error propagation tests.
pub(super) struct UnavailableRepository;

impl ApplicationRepository for UnavailableRepository {
    fn insert(&self, _record: Application) -> Result<Application, RepositoryError> {
        Err(RepositoryError::Unavailable("storage offline".to_string()))
    }

    fn update(
        &self,
        _record: Application,
        _expected_version: u64,
    ) -> Result<Application, RepositoryError> {
        Err(RepositoryError::Unavailable("storage offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("storage offline".to_string()))
    }

    fn for_opportunity(
        &self,
        _criteria_id: &CriteriaId,
    ) -> Result<Vec<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("storage offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&bytes).expect("body should be valid json")
}
