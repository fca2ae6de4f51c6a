use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio_util::sync::CancellationToken;

use super::criteria::{CriteriaId, CriteriaModel};
use super::profile::{CandidateId, CandidateProfile, ResumeData};
use super::ranking::{RankingError, RankingService};
use super::scoring::ScoreResult;

/// Router builder exposing the scoring and ranking endpoints.
pub fn matching_router(service: Arc<RankingService>) -> Router {
    Router::new()
        .route("/api/v1/scores", post(score_handler))
        .route(
            "/api/v1/rankings/opportunities",
            post(opportunity_ranking_handler),
        )
        .route(
            "/api/v1/rankings/candidates",
            post(candidate_ranking_handler),
        )
        .with_state(service)
}

/// One resume scored against one opportunity.
#[derive(Debug, Deserialize)]
pub(crate) struct ScoreRequest {
    pub(crate) resume: ResumeData,
    pub(crate) criteria: CriteriaModel,
    /// Evaluation date for ongoing experience; defaults to today.
    #[serde(default)]
    pub(crate) as_of: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpportunityRankingRequest {
    pub(crate) resume: ResumeData,
    pub(crate) criteria: Vec<CriteriaModel>,
    #[serde(default)]
    pub(crate) as_of: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CandidateRankingRequest {
    pub(crate) criteria: CriteriaModel,
    pub(crate) candidates: Vec<CandidateResume>,
    #[serde(default)]
    pub(crate) as_of: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CandidateResume {
    pub(crate) candidate_id: CandidateId,
    pub(crate) resume: ResumeData,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpportunityRankingResponse {
    pub(crate) ranked: Vec<RankedOpportunity>,
    pub(crate) failed: Vec<FailedOpportunity>,
    pub(crate) skipped: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct RankedOpportunity {
    pub(crate) criteria_id: CriteriaId,
    pub(crate) score: ScoreResult,
}

#[derive(Debug, Serialize)]
pub(crate) struct FailedOpportunity {
    pub(crate) criteria_id: CriteriaId,
    pub(crate) reason: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CandidateRankingResponse {
    pub(crate) ranked: Vec<RankedCandidate>,
    pub(crate) failed: Vec<FailedCandidate>,
    pub(crate) skipped: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct RankedCandidate {
    pub(crate) candidate_id: CandidateId,
    pub(crate) score: ScoreResult,
}

#[derive(Debug, Serialize)]
pub(crate) struct FailedCandidate {
    pub(crate) candidate_id: CandidateId,
    pub(crate) reason: String,
}

pub(crate) async fn score_handler(
    State(service): State<Arc<RankingService>>,
    axum::Json(request): axum::Json<ScoreRequest>,
) -> Response {
    let as_of = request.as_of.unwrap_or_else(|| Utc::now().date_naive());

    let criteria = match request.criteria.canonicalized() {
        Ok(criteria) => criteria,
        Err(error) => return validation_error(error.to_string()),
    };
    let profile = match CandidateProfile::from_resume(&request.resume, as_of) {
        Ok(profile) => profile,
        Err(error) => return validation_error(error.to_string()),
    };

    let score = service.engine().score(&profile, &criteria);
    (StatusCode::OK, axum::Json(score)).into_response()
}

pub(crate) async fn opportunity_ranking_handler(
    State(service): State<Arc<RankingService>>,
    axum::Json(request): axum::Json<OpportunityRankingRequest>,
) -> Response {
    let as_of = request.as_of.unwrap_or_else(|| Utc::now().date_naive());

    let profile = match CandidateProfile::from_resume(&request.resume, as_of) {
        Ok(profile) => profile,
        Err(error) => return validation_error(error.to_string()),
    };

    // Dropping the request future (client gone) cancels in-flight workers.
    let cancel = CancellationToken::new();
    let _abandon = cancel.clone().drop_guard();

    match service
        .rank_opportunities_for_candidate(&profile, request.criteria, &cancel)
        .await
    {
        Ok(ranking) => {
            let response = OpportunityRankingResponse {
                ranked: ranking
                    .ranked
                    .into_iter()
                    .map(|entry| RankedOpportunity {
                        criteria_id: entry.id,
                        score: entry.score,
                    })
                    .collect(),
                failed: ranking
                    .failed
                    .into_iter()
                    .map(|failure| FailedOpportunity {
                        criteria_id: failure.id,
                        reason: failure.reason,
                    })
                    .collect(),
                skipped: ranking.skipped,
            };
            (StatusCode::OK, axum::Json(response)).into_response()
        }
        Err(error) => ranking_error_response(error),
    }
}

pub(crate) async fn candidate_ranking_handler(
    State(service): State<Arc<RankingService>>,
    axum::Json(request): axum::Json<CandidateRankingRequest>,
) -> Response {
    let as_of = request.as_of.unwrap_or_else(|| Utc::now().date_naive());

    let mut unreadable = Vec::new();
    let mut candidates = Vec::with_capacity(request.candidates.len());
    for entry in request.candidates {
        match CandidateProfile::from_resume(&entry.resume, as_of) {
            Ok(profile) => candidates.push((entry.candidate_id, profile)),
            Err(error) => unreadable.push(FailedCandidate {
                candidate_id: entry.candidate_id,
                reason: error.to_string(),
            }),
        }
    }

    let cancel = CancellationToken::new();
    let _abandon = cancel.clone().drop_guard();

    match service
        .rank_candidates_for_opportunity(&request.criteria, candidates, &cancel)
        .await
    {
        Ok(ranking) => {
            let mut failed: Vec<FailedCandidate> = ranking
                .failed
                .into_iter()
                .map(|failure| FailedCandidate {
                    candidate_id: failure.id,
                    reason: failure.reason,
                })
                .collect();
            failed.extend(unreadable);
            failed.sort_by(|a, b| a.candidate_id.cmp(&b.candidate_id));

            let response = CandidateRankingResponse {
                ranked: ranking
                    .ranked
                    .into_iter()
                    .map(|entry| RankedCandidate {
                        candidate_id: entry.id,
                        score: entry.score,
                    })
                    .collect(),
                failed,
                skipped: ranking.skipped,
            };
            (StatusCode::OK, axum::Json(response)).into_response()
        }
        Err(error) => ranking_error_response(error),
    }
}

fn validation_error(message: String) -> Response {
    let payload = json!({ "error": message });
    (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
}

fn ranking_error_response(error: RankingError) -> Response {
    match error {
        RankingError::Criteria(error) => validation_error(error.to_string()),
        RankingError::Profile(error) => validation_error(error.to_string()),
        other => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
