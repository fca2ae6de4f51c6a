//! Application lifecycle: submission, the status state machine, and the
//! optimistic-concurrency rules guarding concurrent reviewers.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;
pub mod transitions;

#[cfg(test)]
mod tests;

pub use domain::{
    Application, ApplicationId, ApplicationStatus, NewApplication, TransitionLogEntry,
};
pub use repository::{ApplicationRepository, RepositoryError};
pub use router::application_router;
pub use service::{ApplicationService, ApplicationServiceError};
pub use transitions::{allowed_transitions, TransitionError};
