use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::matching::{CandidateId, CriteriaId, CriteriaModel, ResumeData};

use super::domain::{Application, ApplicationId, ApplicationStatus};
use super::repository::{ApplicationRepository, RepositoryError};
use super::service::{ApplicationService, ApplicationServiceError};

/// Router builder exposing the application lifecycle endpoints.
pub fn application_router<R>(service: Arc<ApplicationService<R>>) -> Router
where
    R: ApplicationRepository + 'static,
{
    Router::new()
        .route("/api/v1/applications", post(submit_handler::<R>))
        .route(
            "/api/v1/applications/:application_id",
            get(status_handler::<R>),
        )
        .route(
            "/api/v1/applications/:application_id/transition",
            post(transition_handler::<R>),
        )
        .route(
            "/api/v1/opportunities/:criteria_id/applications",
            get(opportunity_applications_handler::<R>),
        )
        .with_state(service)
}

/// Submission payload. The opportunity's criteria ride along because the
/// engine stores none; a resume makes the record scored at creation.
#[derive(Debug, Deserialize)]
pub(crate) struct SubmitApplicationRequest {
    pub(crate) candidate_id: CandidateId,
    pub(crate) criteria: CriteriaModel,
    #[serde(default)]
    pub(crate) resume: Option<ResumeData>,
    #[serde(default)]
    pub(crate) as_of: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransitionRequest {
    pub(crate) requested_status: ApplicationStatus,
    pub(crate) actor: String,
    /// Version the caller last read; the move only applies if it still holds.
    pub(crate) version: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpportunityApplicationsResponse {
    pub(crate) criteria_id: CriteriaId,
    pub(crate) applications: Vec<Application>,
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<ApplicationService<R>>>,
    axum::Json(request): axum::Json<SubmitApplicationRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let as_of = request.as_of.unwrap_or_else(|| Utc::now().date_naive());

    match service.submit_scored(
        request.candidate_id,
        &request.criteria,
        request.resume.as_ref(),
        as_of,
        Utc::now(),
    ) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn status_handler<R>(
    State(service): State<Arc<ApplicationService<R>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let id = ApplicationId(application_id);
    match service.get(&id) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn transition_handler<R>(
    State(service): State<Arc<ApplicationService<R>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<TransitionRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let id = ApplicationId(application_id);
    match service.transition(
        &id,
        request.requested_status,
        &request.actor,
        request.version,
        Utc::now(),
    ) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn opportunity_applications_handler<R>(
    State(service): State<Arc<ApplicationService<R>>>,
    Path(criteria_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let criteria_id = CriteriaId(criteria_id);
    match service.ranked_for_opportunity(&criteria_id) {
        Ok(applications) => {
            let payload = OpportunityApplicationsResponse {
                criteria_id,
                applications,
            };
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => service_error_response(error),
    }
}

fn service_error_response(error: ApplicationServiceError) -> Response {
    let status = match &error {
        ApplicationServiceError::Criteria(_) | ApplicationServiceError::Profile(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ApplicationServiceError::Transition(_) => StatusCode::CONFLICT,
        ApplicationServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ApplicationServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ApplicationServiceError::Repository(RepositoryError::StaleVersion { current }) => {
            let payload = json!({
                "error": error.to_string(),
                "current_version": current,
            });
            return (StatusCode::PRECONDITION_FAILED, axum::Json(payload)).into_response();
        }
        ApplicationServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
