//! Job search provider: the single point of entry for external job index calls.
//!
//! `JobSearchProvider` is the seam; `TheirStackClient` is the HTTP backend and
//! `AppState` carries it as `Arc<dyn JobSearchProvider>`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::listing::JobListing;

/// Results requested per stage.
pub const SEARCH_LIMIT: u32 = 25;
/// Maximum listing age accepted from the provider.
pub const MAX_AGE_DAYS: u32 = 90;

const KEY_LIMIT: &str = "limit";
const KEY_MAX_AGE: &str = "posted_at_max_age_days";
const KEY_COMPANY: &str = "company_name_or";
const KEY_TITLE_OR: &str = "job_title_or";
const KEY_TITLE_PATTERN_OR: &str = "job_title_pattern_or";
const KEY_TECHNOLOGY_OR: &str = "job_technology_slug_or";

/// Payload keys callers may not set through extra filters.
const RESERVED_KEYS: &[&str] = &[
    KEY_LIMIT,
    KEY_MAX_AGE,
    KEY_COMPANY,
    KEY_TITLE_OR,
    KEY_TITLE_PATTERN_OR,
    KEY_TECHNOLOGY_OR,
];

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl SearchError {
    /// Raw detail suitable for surfacing to the caller.
    pub fn details(&self) -> String {
        match self {
            SearchError::Http(e) => e.to_string(),
            SearchError::Api { message, .. } => message.clone(),
        }
    }
}

/// The one title/technology filter a stage searches by.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchFilter {
    Roles(Vec<String>),
    TitlePatterns(Vec<String>),
    Technologies(Vec<String>),
}

/// One immutable provider query. Exactly one filter per query by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub limit: u32,
    pub max_age_days: u32,
    /// `[""]` means any company.
    pub company_filter: Vec<String>,
    pub filter: SearchFilter,
    pub extra_filters: Map<String, Value>,
}

impl SearchQuery {
    pub fn new(filter: SearchFilter) -> Self {
        Self {
            limit: SEARCH_LIMIT,
            max_age_days: MAX_AGE_DAYS,
            company_filter: vec![String::new()],
            filter,
            extra_filters: Map::new(),
        }
    }

    /// Attaches caller filters, discarding any key that would override policy or
    /// the stage filter.
    pub fn with_extra_filters(mut self, extra: &Map<String, Value>) -> Self {
        self.extra_filters = extra
            .iter()
            .filter(|(key, _)| {
                let reserved = RESERVED_KEYS.contains(&key.as_str());
                if reserved {
                    warn!("Ignoring reserved search filter '{}'", key);
                }
                !reserved
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        self
    }

    /// Provider request body.
    pub fn to_payload(&self) -> Value {
        let mut body = self.extra_filters.clone();
        body.insert(KEY_LIMIT.to_string(), Value::from(self.limit));
        body.insert(KEY_MAX_AGE.to_string(), Value::from(self.max_age_days));
        body.insert(KEY_COMPANY.to_string(), Value::from(self.company_filter.clone()));

        let (key, values) = match &self.filter {
            SearchFilter::Roles(v) => (KEY_TITLE_OR, v),
            SearchFilter::TitlePatterns(v) => (KEY_TITLE_PATTERN_OR, v),
            SearchFilter::Technologies(v) => (KEY_TECHNOLOGY_OR, v),
        };
        body.insert(key.to_string(), Value::from(values.clone()));

        Value::Object(body)
    }
}

/// The job search trait. Swap backends without touching the escalator.
#[async_trait]
pub trait JobSearchProvider: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<JobListing>, SearchError>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<JobListing>,
}

/// TheirStack jobs-search client. Every call is bounded by the configured timeout.
#[derive(Clone)]
pub struct TheirStackClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl TheirStackClient {
    pub fn new(api_url: String, api_key: String, timeout: Duration) -> Result<Self, SearchError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_url,
            api_key,
        })
    }
}

#[async_trait]
impl JobSearchProvider for TheirStackClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<JobListing>, SearchError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&query.to_payload())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: SearchResponse = response.json().await?;
        debug!("Job search returned {} listings", parsed.data.len());
        Ok(parsed.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_carries_policy_constants() {
        let query = SearchQuery::new(SearchFilter::Roles(vec!["backend engineer".to_string()]));
        let payload = query.to_payload();
        assert_eq!(payload["limit"], 25);
        assert_eq!(payload["posted_at_max_age_days"], 90);
        assert_eq!(payload["company_name_or"], json!([""]));
        assert_eq!(payload["job_title_or"], json!(["backend engineer"]));
        assert!(payload.get("job_technology_slug_or").is_none());
        assert!(payload.get("job_title_pattern_or").is_none());
    }

    #[test]
    fn test_payload_uses_single_filter_key() {
        let query = SearchQuery::new(SearchFilter::Technologies(vec!["rust".to_string()]));
        let payload = query.to_payload();
        assert_eq!(payload["job_technology_slug_or"], json!(["rust"]));
        assert!(payload.get("job_title_or").is_none());

        let query = SearchQuery::new(SearchFilter::TitlePatterns(vec!["web dev".to_string()]));
        assert_eq!(query.to_payload()["job_title_pattern_or"], json!(["web dev"]));
    }

    #[test]
    fn test_extra_filters_cannot_override_policy() {
        let extra = json!({
            "limit": 500,
            "job_title_or": ["ceo"],
            "job_country_code_or": ["US"],
            "remote": true
        });
        let query = SearchQuery::new(SearchFilter::Technologies(vec!["go".to_string()]))
            .with_extra_filters(extra.as_object().unwrap());
        let payload = query.to_payload();

        assert_eq!(payload["limit"], 25);
        assert!(payload.get("job_title_or").is_none());
        assert_eq!(payload["job_country_code_or"], json!(["US"]));
        assert_eq!(payload["remote"], true);
    }

    #[test]
    fn test_search_response_defaults_missing_data() {
        let parsed: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.data.is_empty());
    }

    #[test]
    fn test_null_title_does_not_reject_stage_response() {
        let parsed: SearchResponse = serde_json::from_str(
            r#"{"data":[{"id":1,"job_title":"Backend Engineer"},{"id":2,"job_title":null}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.data.len(), 2);
        assert_eq!(parsed.data[0].title, "Backend Engineer");
        assert_eq!(parsed.data[1].title, "");
    }

    #[test]
    fn test_api_error_details_is_raw_body() {
        let err = SearchError::Api {
            status: 401,
            message: "invalid token".to_string(),
        };
        assert_eq!(err.details(), "invalid token");
    }
}
