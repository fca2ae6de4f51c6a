use super::domain::ApplicationStatus;

/// The statuses an application may move to from `from`.
///
/// This table is the single source of truth for the lifecycle. Rejection is
/// reachable from every non-terminal status; `Accepted` and `Rejected`
/// allow nothing, so reconsidering a closed application means submitting a
/// new one.
pub const fn allowed_transitions(from: ApplicationStatus) -> &'static [ApplicationStatus] {
    use ApplicationStatus::*;

    match from {
        Pending => &[UnderReview, Shortlisted, Rejected],
        UnderReview => &[Shortlisted, Interview, Rejected],
        Shortlisted => &[Interview, Rejected],
        Interview => &[Accepted, Rejected],
        Accepted | Rejected => &[],
    }
}

pub fn ensure_allowed(
    from: ApplicationStatus,
    to: ApplicationStatus,
) -> Result<(), TransitionError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(TransitionError::Illegal { from, to })
    }
}

/// Raised when a requested move is not in the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("cannot move application from {} to {}", .from.label(), .to.label())]
    Illegal {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
}
