//! Find-jobs pipeline: orchestrates one run end to end.
//!
//! Flow: validate → normalize → escalate → (static fallback) → annotate →
//!       outreach dispatch → response.
//!
//! Listings are never persisted; every run starts from scratch.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::listing::JobListing;
use crate::models::outreach::{DispatchOutcome, UserInfo};
use crate::outreach::dispatch::{dispatch_outreach, run_timestamp};
use crate::search::annotator::annotate_listings;
use crate::search::escalator::escalate;
use crate::search::fallback::{
    select_fallback_companies, synthesize_listings, FALLBACK_COMPANY_COUNT,
};
use crate::search::normalizer::SearchTerms;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindJobsRequest {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub eligible_roles: Vec<String>,
    #[serde(default)]
    pub additional_filters: Map<String, Value>,
    pub send_emails: Option<bool>,
    pub user_info: Option<UserInfo>,
}

/// A request that passed boundary validation.
#[derive(Debug, Clone)]
pub struct JobSearchInput {
    pub skills: Vec<String>,
    pub eligible_roles: Vec<String>,
    pub additional_filters: Map<String, Value>,
    pub send_emails: Option<bool>,
    pub user_info: Option<UserInfo>,
}

impl FindJobsRequest {
    /// Drops blank entries and requires at least one skill or role.
    pub fn validate(self) -> Result<JobSearchInput, AppError> {
        let clean = |items: Vec<String>| -> Vec<String> {
            items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        };
        let skills = clean(self.skills);
        let eligible_roles = clean(self.eligible_roles);

        if skills.is_empty() && eligible_roles.is_empty() {
            return Err(AppError::Validation(
                "Skills or eligible roles are required".to_string(),
            ));
        }

        Ok(JobSearchInput {
            skills,
            eligible_roles,
            additional_filters: self.additional_filters,
            send_emails: self.send_emails,
            user_info: self.user_info,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FindJobsResponse {
    pub data: Vec<JobListing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_results: Option<Vec<DispatchOutcome>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_error: Option<String>,
    #[serde(rename = "from_yc_companies", skip_serializing_if = "Option::is_none")]
    pub from_fallback_dataset: Option<bool>,
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Runs the full pipeline for one validated request.
///
/// Steps:
/// 1. SearchTerms::build() → roles / generic terms / technology slugs
/// 2. escalate() → first non-empty provider stage (opening-stage failure aborts)
/// 3. static fallback when every stage was empty
/// 4. annotate_listings() → matched skills / role
/// 5. dispatch_outreach() when sending is enabled and there is something to send
pub async fn run_find_jobs(
    state: &AppState,
    input: JobSearchInput,
    rng: &mut fastrand::Rng,
    now: DateTime<Utc>,
) -> Result<FindJobsResponse, AppError> {
    // Step 1: Normalize
    let terms = SearchTerms::build(&input.skills, &input.eligible_roles);
    info!(
        "Search terms: {} roles, {} generic terms, {} technologies",
        terms.roles.len(),
        terms.generic_terms.len(),
        terms.technologies.len()
    );

    // Step 2: Escalate through live search stages
    let outcome = escalate(state.search.as_ref(), &terms, &input.additional_filters).await?;
    info!(
        "Escalation settled on {:?} after {:?}",
        outcome.stage, outcome.attempted
    );

    // Step 3: Static fallback
    let mut from_fallback_dataset = None;
    let listings = if outcome.is_exhausted() {
        info!("No provider results, falling back to the company dataset");
        let dataset = state.dataset.clone();
        let companies = tokio::task::spawn_blocking(move || dataset.load())
            .await
            .context("company dataset load task failed")?;

        let picked = select_fallback_companies(
            &companies,
            &input.skills,
            &input.eligible_roles,
            FALLBACK_COMPANY_COUNT,
            rng,
        );
        let synthesized = synthesize_listings(&picked, &input.skills, &input.eligible_roles);
        if !synthesized.is_empty() {
            info!("Created {} listings from the company dataset", synthesized.len());
            from_fallback_dataset = Some(true);
        }
        synthesized
    } else {
        outcome.listings
    };

    // Step 4: Annotate
    let data = annotate_listings(listings, &input.skills, &input.eligible_roles);

    let mut response = FindJobsResponse {
        data,
        email_results: None,
        email_error: None,
        from_fallback_dataset,
    };

    // Step 5: Outreach
    let outreach = &state.config.outreach;
    let send = input.send_emails.unwrap_or(outreach.auto_send);
    if send && !response.data.is_empty() {
        let applicant = outreach.applicant.merged_with(input.user_info.as_ref());
        let timestamp = run_timestamp(now);
        match dispatch_outreach(
            state.channel.as_ref(),
            outreach,
            &response.data,
            &input.skills,
            &applicant,
            &timestamp,
        )
        .await
        {
            Ok(report) => response.email_results = Some(report),
            Err(e) => {
                warn!("Outreach dispatch skipped: {}", e);
                response.email_error = Some(e.to_string());
            }
        }
    }

    Ok(response)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::listing::GENERIC_SKILL_TAG;
    use crate::models::outreach::DispatchStatus;
    use crate::outreach::dispatch::tests::StubChannel;
    use crate::search::escalator::tests::{StubProvider, StubReply};
    use crate::state::tests::test_state;
    use chrono::TimeZone;
    use serde_json::json;
    use std::io::Write;
    use std::sync::Arc;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap()
    }

    fn request(skills: &[&str], roles: &[&str]) -> FindJobsRequest {
        FindJobsRequest {
            skills: strings(skills),
            eligible_roles: strings(roles),
            ..FindJobsRequest::default()
        }
    }

    fn dataset_file(rows: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Company Name,Website,Company Description,Industry,Location").unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
        file
    }

    #[test]
    fn test_validation_requires_skills_or_roles() {
        let err = request(&[], &[]).validate().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = request(&["  "], &[""]).validate().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let input = request(&[" Rust "], &[]).validate().unwrap();
        assert_eq!(input.skills, strings(&["Rust"]));
    }

    #[test]
    fn test_request_decodes_camel_case() {
        let body = json!({
            "skills": ["Python"],
            "eligibleRoles": ["Backend Engineer"],
            "additionalFilters": {"remote": true},
            "sendEmails": false,
            "userInfo": {"name": "Ada"}
        });
        let req: FindJobsRequest = serde_json::from_value(body).unwrap();
        assert_eq!(req.eligible_roles, strings(&["Backend Engineer"]));
        assert_eq!(req.additional_filters["remote"], true);
        assert_eq!(req.send_emails, Some(false));
        assert_eq!(req.user_info.unwrap().name.as_deref(), Some("Ada"));
    }

    #[tokio::test]
    async fn test_end_to_end_role_search_with_wraparound_dispatch() {
        let provider = Arc::new(StubProvider {
            roles: StubReply::Listings(3),
            ..StubProvider::empty()
        });
        let channel = Arc::new(StubChannel::new(&[]));
        let state = test_state(provider.clone(), channel.clone(), "/no/such/dataset.csv");

        let input = request(&["Python", "React"], &["Backend Engineer"])
            .validate()
            .unwrap();
        let mut rng = fastrand::Rng::with_seed(11);
        let response = run_find_jobs(&state, input, &mut rng, now()).await.unwrap();

        assert_eq!(response.data.len(), 3);
        for listing in &response.data {
            assert_eq!(listing.matched_skills, strings(&["Python", "React"]));
            assert_eq!(listing.matched_role.as_deref(), Some("Backend Engineer"));
            assert!(!listing.is_fallback_sourced);
        }
        let results = response.email_results.unwrap();
        assert_eq!(results.len(), 5);
        assert!(results.iter().all(|r| r.status == DispatchStatus::Sent));
        assert_eq!(results[3].job_title, response.data[0].title);
        assert!(response.email_error.is_none());
        assert!(response.from_fallback_dataset.is_none());
        assert_eq!(provider.calls().len(), 1);
        assert!(channel.sent()[0].subject.ends_with("2026-10-19 09:00:00"));
    }

    #[tokio::test]
    async fn test_fallback_dataset_when_all_stages_empty() {
        let file = dataset_file(&[
            "PayCo,https://payco.example,Fintech for freelancers,Fintech,Berlin",
            "Lendr,https://lendr.example,Loans,Fintech,",
            "Boring,https://boring.example,Tunnels,Construction,Austin",
        ]);
        let provider = Arc::new(StubProvider::empty());
        let channel = Arc::new(StubChannel::new(&[]));
        let state = test_state(provider.clone(), channel.clone(), file.path());

        let mut input = request(&["fintech"], &[]).validate().unwrap();
        input.send_emails = Some(false);
        let mut rng = fastrand::Rng::with_seed(5);
        let response = run_find_jobs(&state, input, &mut rng, now()).await.unwrap();

        assert_eq!(response.data.len(), 3);
        assert_eq!(response.from_fallback_dataset, Some(true));
        assert!(response.data.iter().all(|l| l.is_fallback_sourced && l.id >= 1000));
        assert!(response
            .data
            .iter()
            .all(|l| l.matched_skills == strings(&["fintech"])));
        assert!(response.email_results.is_none());
        assert!(channel.sent().is_empty());
        assert_eq!(provider.calls().len(), 1, "only the default-title stage applies");
    }

    #[tokio::test]
    async fn test_missing_dataset_returns_empty_result() {
        let provider = Arc::new(StubProvider::empty());
        let channel = Arc::new(StubChannel::new(&[]));
        let state = test_state(provider, channel.clone(), "/no/such/dataset.csv");

        let input = request(&["Rust"], &["Systems Engineer"]).validate().unwrap();
        let mut rng = fastrand::Rng::with_seed(2);
        let response = run_find_jobs(&state, input, &mut rng, now()).await.unwrap();

        assert!(response.data.is_empty());
        assert!(response.from_fallback_dataset.is_none());
        assert!(response.email_results.is_none());
        assert!(channel.sent().is_empty());
    }

    #[tokio::test]
    async fn test_opening_stage_failure_aborts_pipeline() {
        let provider = Arc::new(StubProvider {
            roles: StubReply::Fail(503),
            ..StubProvider::empty()
        });
        let channel = Arc::new(StubChannel::new(&[]));
        let state = test_state(provider, channel.clone(), "/no/such/dataset.csv");

        let input = request(&[], &["Backend Engineer"]).validate().unwrap();
        let mut rng = fastrand::Rng::with_seed(2);
        let err = run_find_jobs(&state, input, &mut rng, now()).await.unwrap_err();

        assert!(matches!(err, AppError::ProviderUnavailable { .. }));
        assert!(channel.sent().is_empty());
    }

    #[tokio::test]
    async fn test_unmatched_listings_get_sentinel_tag() {
        let provider = Arc::new(StubProvider {
            default_titles: StubReply::Listings(2),
            ..StubProvider::empty()
        });
        let channel = Arc::new(StubChannel::new(&[]));
        let state = test_state(provider.clone(), channel, "/no/such/dataset.csv");

        let mut input = request(&["COBOL"], &[]).validate().unwrap();
        input.send_emails = Some(false);
        let mut rng = fastrand::Rng::with_seed(2);
        let response = run_find_jobs(&state, input, &mut rng, now()).await.unwrap();

        assert_eq!(response.data.len(), 2);
        assert!(response
            .data
            .iter()
            .all(|l| l.matched_skills == vec![GENERIC_SKILL_TAG.to_string()]));
        assert_eq!(provider.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_unconfigured_outreach_reports_email_error() {
        let provider = Arc::new(StubProvider {
            roles: StubReply::Listings(1),
            ..StubProvider::empty()
        });
        let channel = Arc::new(StubChannel::new(&[]));
        let mut state = test_state(provider, channel.clone(), "/no/such/dataset.csv");
        state.config.outreach.sender_address = None;

        let input = request(&["Go"], &["Platform Engineer"]).validate().unwrap();
        let mut rng = fastrand::Rng::with_seed(2);
        let response = run_find_jobs(&state, input, &mut rng, now()).await.unwrap();

        assert_eq!(response.data.len(), 1);
        assert!(response.email_results.is_none());
        assert!(response.email_error.unwrap().contains("sender"));
        assert!(channel.sent().is_empty());
    }

    #[tokio::test]
    async fn test_user_info_overrides_signature() {
        let provider = Arc::new(StubProvider {
            roles: StubReply::Listings(1),
            ..StubProvider::empty()
        });
        let channel = Arc::new(StubChannel::new(&[]));
        let state = test_state(provider, channel.clone(), "/no/such/dataset.csv");

        let mut input = request(&["Go"], &["Platform Engineer"]).validate().unwrap();
        input.user_info = Some(UserInfo {
            name: Some("Grace Hopper".to_string()),
            ..UserInfo::default()
        });
        let mut rng = fastrand::Rng::with_seed(2);
        run_find_jobs(&state, input, &mut rng, now()).await.unwrap();

        assert!(channel.sent()[0].html_body.contains("Grace Hopper<br>"));
    }
}
