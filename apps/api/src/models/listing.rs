use serde::{Deserialize, Deserializer, Serialize};

/// Tag applied when no candidate skill appears in a listing.
pub const GENERIC_SKILL_TAG: &str = "Tech Job";

/// A single job listing, either returned by the search provider or synthesized
/// from the company dataset. Listings live for one pipeline run only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobListing {
    pub id: i64,
    #[serde(rename = "job_title", default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(
        rename = "job_description",
        alias = "description",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "date_posted", default, skip_serializing_if = "Option::is_none")]
    pub posted_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub matched_skills: Vec<String>,
    #[serde(default)]
    pub matched_role: Option<String>,
    #[serde(default)]
    pub is_fallback_sourced: bool,
}

/// Provider listings may carry `"job_title": null`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl JobListing {
    /// Creates a bare provider-style listing with no annotations.
    #[cfg(test)]
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            company: None,
            url: None,
            posted_date: None,
            location: None,
            matched_skills: Vec::new(),
            matched_role: None,
            is_fallback_sourced: false,
        }
    }

    #[cfg(test)]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[cfg(test)]
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }
}
