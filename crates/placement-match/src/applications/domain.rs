use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::matching::{CandidateId, CriteriaId, ScoreResult};

use super::transitions::{ensure_allowed, TransitionError};

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Lifecycle position of an application.
///
/// The enum is closed: payloads carrying any other status string fail
/// deserialization at the boundary instead of reaching the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    UnderReview,
    Shortlisted,
    Interview,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::UnderReview => "under_review",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    /// Terminal statuses accept no further transitions.
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Accepted | ApplicationStatus::Rejected
        )
    }
}

/// One line of the append-only transition history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionLogEntry {
    pub from: ApplicationStatus,
    pub to: ApplicationStatus,
    /// Who asked for the move. Recorded for the audit trail only;
    /// authorization happens before requests reach this crate.
    pub actor: String,
    pub at: DateTime<Utc>,
}

/// Inputs needed to open an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewApplication {
    pub candidate_id: CandidateId,
    pub criteria_id: CriteriaId,
    /// Compatibility score computed at submission time, when available.
    pub score: Option<ScoreResult>,
}

/// A candidate's application to one opportunity.
///
/// `version` is the optimistic-concurrency token: it starts at 1 and is
/// bumped by every successful transition, and repository updates only
/// apply when the stored version still matches the one the caller read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub candidate_id: CandidateId,
    pub criteria_id: CriteriaId,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub last_transition_at: DateTime<Utc>,
    pub version: u64,
    pub score: Option<ScoreResult>,
    pub transitions: Vec<TransitionLogEntry>,
}

impl Application {
    /// Opens a new application in `Pending` at version 1.
    pub fn submitted(id: ApplicationId, new: NewApplication, now: DateTime<Utc>) -> Self {
        Self {
            id,
            candidate_id: new.candidate_id,
            criteria_id: new.criteria_id,
            status: ApplicationStatus::Pending,
            applied_at: now,
            last_transition_at: now,
            version: 1,
            score: new.score,
            transitions: Vec::new(),
        }
    }

    /// Moves the application to `requested` when the transition table allows
    /// it, stamping the clock, bumping the version, and appending the audit
    /// entry. On rejection nothing changes.
    pub fn apply_transition(
        &mut self,
        requested: ApplicationStatus,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        ensure_allowed(self.status, requested)?;

        self.transitions.push(TransitionLogEntry {
            from: self.status,
            to: requested,
            actor: actor.to_string(),
            at: now,
        });
        self.status = requested;
        self.last_transition_at = now;
        self.version += 1;
        Ok(())
    }
}
