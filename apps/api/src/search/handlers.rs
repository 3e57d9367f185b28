//! Axum route handlers for the Job Search API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::search::escalator::{plan_stages, EscalationStage};
use crate::search::normalizer::SearchTerms;
use crate::search::pipeline::{run_find_jobs, FindJobsRequest, FindJobsResponse};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchTermsRequest {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub eligible_roles: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchTermsResponse {
    #[serde(flatten)]
    pub terms: SearchTerms,
    /// Stages a find-jobs run would issue for these terms, in order.
    pub stages: Vec<EscalationStage>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/jobs/find
///
/// Full pipeline: normalize → escalate → fallback → annotate → outreach.
/// The run is abandoned if the client disconnects or the request times out.
pub async fn handle_find_jobs(
    State(state): State<AppState>,
    Json(request): Json<FindJobsRequest>,
) -> Result<Json<FindJobsResponse>, AppError> {
    let input = request.validate()?;

    let run_id = Uuid::new_v4();
    let span = tracing::info_span!("find_jobs", %run_id);

    async move {
        info!(
            "Find jobs: {} skills, {} eligible roles",
            input.skills.len(),
            input.eligible_roles.len()
        );
        let mut rng = fastrand::Rng::new();
        let response = run_find_jobs(&state, input, &mut rng, chrono::Utc::now()).await?;
        info!("Find jobs returned {} listings", response.data.len());
        Ok::<_, AppError>(Json(response))
    }
    .instrument(span)
    .await
}

/// POST /api/v1/jobs/search-terms
///
/// Returns the normalized terms and stage plan without calling the provider.
pub async fn handle_search_terms(
    Json(request): Json<SearchTermsRequest>,
) -> Result<Json<SearchTermsResponse>, AppError> {
    let input = FindJobsRequest {
        skills: request.skills,
        eligible_roles: request.eligible_roles,
        ..FindJobsRequest::default()
    }
    .validate()?;

    let terms = SearchTerms::build(&input.skills, &input.eligible_roles);
    let stages = plan_stages(&terms, &input.additional_filters)
        .into_iter()
        .map(|(stage, _)| stage)
        .collect();

    Ok(Json(SearchTermsResponse { terms, stages }))
}
