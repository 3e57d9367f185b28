//! Axum route handlers for the Outreach API.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::listing::JobListing;
use crate::models::outreach::{OutreachMessage, Recipient, UserInfo};
use crate::outreach::dispatch::run_timestamp;
use crate::outreach::synthesizer::compose_message;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    pub recipient: String,
    pub job: JobListing,
    #[serde(default)]
    pub skills: Vec<String>,
    pub user_info: Option<UserInfo>,
}

/// POST /api/v1/outreach/preview
///
/// Composes the message a recipient would receive for a job. Nothing is sent.
pub async fn handle_preview(
    State(state): State<AppState>,
    Json(request): Json<PreviewRequest>,
) -> Result<Json<OutreachMessage>, AppError> {
    let recipient = Recipient::parse(&request.recipient).ok_or_else(|| {
        AppError::Validation(format!("Invalid recipient '{}'", request.recipient))
    })?;

    let applicant = state
        .config
        .outreach
        .applicant
        .merged_with(request.user_info.as_ref());
    let timestamp = run_timestamp(chrono::Utc::now());

    Ok(Json(compose_message(
        &recipient,
        &request.job,
        &request.skills,
        &applicant,
        &timestamp,
    )))
}
