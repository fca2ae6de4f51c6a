use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

use crate::matching::{
    CandidateId, CandidateProfile, CriteriaError, CriteriaId, CriteriaModel, ProfileError,
    ResumeData, ScoringEngine,
};

use super::domain::{Application, ApplicationId, ApplicationStatus, NewApplication};
use super::repository::{ApplicationRepository, RepositoryError};
use super::transitions::TransitionError;

/// Service composing the repository, the scoring engine, and the lifecycle
/// state machine.
pub struct ApplicationService<R> {
    repository: Arc<R>,
    engine: Arc<ScoringEngine>,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

impl<R> ApplicationService<R>
where
    R: ApplicationRepository + 'static,
{
    pub fn new(repository: Arc<R>, engine: Arc<ScoringEngine>) -> Self {
        Self { repository, engine }
    }

    /// Opens an application in `Pending` and returns the stored record.
    pub fn submit(
        &self,
        new: NewApplication,
        now: DateTime<Utc>,
    ) -> Result<Application, ApplicationServiceError> {
        let record = Application::submitted(next_application_id(), new, now);
        let stored = self.repository.insert(record)?;
        info!(
            application = %stored.id.0,
            criteria = %stored.criteria_id.0,
            "application submitted"
        );
        Ok(stored)
    }

    /// Opens an application, scoring the resume against the opportunity's
    /// criteria first when one is supplied. Without a resume the record is
    /// stored unscored and sorts after scored ones in listings.
    pub fn submit_scored(
        &self,
        candidate_id: CandidateId,
        criteria: &CriteriaModel,
        resume: Option<&ResumeData>,
        as_of: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Application, ApplicationServiceError> {
        let criteria = criteria.canonicalized()?;
        let score = match resume {
            Some(resume) => {
                let profile = CandidateProfile::from_resume(resume, as_of)?;
                Some(self.engine.score(&profile, &criteria))
            }
            None => None,
        };

        self.submit(
            NewApplication {
                candidate_id,
                criteria_id: criteria.id,
                score,
            },
            now,
        )
    }

    /// Applies a status transition under optimistic concurrency.
    ///
    /// `expected_version` is the version the caller last read. The record
    /// is re-read, checked against the table, and written back with a
    /// compare-and-swap; a writer that lost the race gets
    /// [`RepositoryError::StaleVersion`] and must re-read before retrying.
    pub fn transition(
        &self,
        id: &ApplicationId,
        requested: ApplicationStatus,
        actor: &str,
        expected_version: u64,
        now: DateTime<Utc>,
    ) -> Result<Application, ApplicationServiceError> {
        let mut record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;

        if record.version != expected_version {
            return Err(RepositoryError::StaleVersion {
                current: record.version,
            }
            .into());
        }

        let from = record.status;
        record.apply_transition(requested, actor, now)?;
        let stored = self.repository.update(record, expected_version)?;

        info!(
            application = %id.0,
            from = from.label(),
            to = requested.label(),
            actor,
            version = stored.version,
            "application transitioned"
        );
        Ok(stored)
    }

    /// Fetches an application for API responses.
    pub fn get(&self, id: &ApplicationId) -> Result<Application, ApplicationServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// All applications for an opportunity in the default listing order:
    /// scored records first in ranking order, unscored ones after, oldest
    /// first, ids breaking whatever remains.
    pub fn ranked_for_opportunity(
        &self,
        criteria_id: &CriteriaId,
    ) -> Result<Vec<Application>, ApplicationServiceError> {
        let mut records = self.repository.for_opportunity(criteria_id)?;
        records.sort_by(|a, b| match (&a.score, &b.score) {
            (Some(left), Some(right)) => {
                left.ranking_cmp(right).then_with(|| a.id.cmp(&b.id))
            }
            (Some(_), None) => CmpOrdering::Less,
            (None, Some(_)) => CmpOrdering::Greater,
            (None, None) => a
                .applied_at
                .cmp(&b.applied_at)
                .then_with(|| a.id.cmp(&b.id)),
        });
        Ok(records)
    }
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error(transparent)]
    Criteria(#[from] CriteriaError),
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
