//! Candidate-opportunity matching and scoring engine for placement
//! marketplaces.
//!
//! The crate turns structured resumes and opportunity criteria into
//! deterministic 0-100 compatibility scores, ranks batches in either
//! direction, and guards the application lifecycle state machine. Storage,
//! authentication, and presentation stay with the caller.

pub mod applications;
pub mod config;
pub mod error;
pub mod matching;
pub mod telemetry;
