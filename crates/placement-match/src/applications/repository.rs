use crate::matching::CriteriaId;

use super::domain::{Application, ApplicationId};

/// Storage abstraction so the service module can be exercised in isolation.
///
/// Persistence belongs to the caller; this crate ships in-memory
/// implementations for the service binary and for tests only.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, record: Application) -> Result<Application, RepositoryError>;

    /// Replaces the stored record only while it is still at
    /// `expected_version`. A concurrent writer that got there first leaves
    /// the store at a newer version and the call fails with
    /// [`RepositoryError::StaleVersion`], so of two racing transitions
    /// exactly one wins.
    fn update(&self, record: Application, expected_version: u64)
        -> Result<Application, RepositoryError>;

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError>;

    /// All applications submitted against one opportunity, in storage order.
    fn for_opportunity(&self, criteria_id: &CriteriaId)
        -> Result<Vec<Application>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("application already exists")]
    Conflict,
    #[error("application not found")]
    NotFound,
    #[error("stale version token: stored record is at version {current}")]
    StaleVersion { current: u64 },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
