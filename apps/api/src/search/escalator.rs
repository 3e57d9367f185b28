//! Search Escalator: issues progressively looser provider queries and stops at
//! the first stage that returns anything.
//!
//! Stage order: roles | title patterns → technologies → default titles.
//! Only the opening stage may fail the run; later failures count as empty.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::listing::JobListing;
use crate::search::normalizer::SearchTerms;
use crate::search::provider::{JobSearchProvider, SearchFilter, SearchQuery};

/// Titles searched when the caller supplied no usable roles.
pub const DEFAULT_JOB_TITLES: &[&str] = &[
    "software engineer",
    "developer",
    "programmer",
    "data scientist",
    "product manager",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationStage {
    Roles,
    TitlePatterns,
    Technologies,
    GenericFallback,
}

impl EscalationStage {
    fn is_opening(self) -> bool {
        matches!(self, EscalationStage::Roles | EscalationStage::TitlePatterns)
    }
}

/// Terminal state of an escalation run.
#[derive(Debug, Clone)]
pub struct EscalationOutcome {
    pub listings: Vec<JobListing>,
    /// Stage that produced `listings`; `None` when every stage came back empty.
    pub stage: Option<EscalationStage>,
    /// Stages actually issued, in order.
    pub attempted: Vec<EscalationStage>,
}

impl EscalationOutcome {
    pub fn is_exhausted(&self) -> bool {
        self.stage.is_none()
    }
}

/// Builds the ordered stage plan for the given terms. Stages whose trigger
/// condition does not hold are left out.
pub fn plan_stages(
    terms: &SearchTerms,
    extra_filters: &Map<String, Value>,
) -> Vec<(EscalationStage, SearchQuery)> {
    let mut plan = Vec::with_capacity(3);

    if !terms.roles.is_empty() {
        plan.push((
            EscalationStage::Roles,
            SearchQuery::new(SearchFilter::Roles(terms.roles.clone()))
                .with_extra_filters(extra_filters),
        ));
    } else if !terms.generic_terms.is_empty() {
        plan.push((
            EscalationStage::TitlePatterns,
            SearchQuery::new(SearchFilter::TitlePatterns(terms.generic_terms.clone()))
                .with_extra_filters(extra_filters),
        ));
    }

    if !terms.technologies.is_empty() {
        plan.push((
            EscalationStage::Technologies,
            SearchQuery::new(SearchFilter::Technologies(terms.technologies.clone()))
                .with_extra_filters(extra_filters),
        ));
    }

    let fallback_titles = if terms.roles.is_empty() {
        DEFAULT_JOB_TITLES.iter().map(|t| t.to_string()).collect()
    } else {
        terms.roles.clone()
    };
    plan.push((
        EscalationStage::GenericFallback,
        SearchQuery::new(SearchFilter::Roles(fallback_titles)),
    ));

    plan
}

/// Runs the stage plan sequentially. Each stage depends on the previous one
/// being empty, so there is no fan-out.
pub async fn escalate(
    provider: &dyn JobSearchProvider,
    terms: &SearchTerms,
    extra_filters: &Map<String, Value>,
) -> Result<EscalationOutcome, AppError> {
    let mut attempted = Vec::new();

    for (stage, query) in plan_stages(terms, extra_filters) {
        attempted.push(stage);
        info!("Search stage {:?} payload: {}", stage, query.to_payload());

        let listings = match provider.search(&query).await {
            Ok(listings) => listings,
            Err(e) if stage.is_opening() => {
                return Err(AppError::ProviderUnavailable {
                    details: e.details(),
                });
            }
            Err(e) => {
                warn!("Search stage {:?} failed, escalating: {}", stage, e);
                Vec::new()
            }
        };

        info!("Search stage {:?} returned {} listings", stage, listings.len());

        if !listings.is_empty() {
            return Ok(EscalationOutcome {
                listings,
                stage: Some(stage),
                attempted,
            });
        }
    }

    info!("All search stages exhausted without results");
    Ok(EscalationOutcome {
        listings: Vec::new(),
        stage: None,
        attempted,
    })
}
