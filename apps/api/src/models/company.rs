use serde::{Deserialize, Serialize};

/// One row of the static company dataset. Read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    #[serde(rename = "Company Name")]
    pub name: String,
    #[serde(rename = "Website", default)]
    pub website: String,
    #[serde(rename = "Company Description", default)]
    pub description: String,
    #[serde(rename = "Industry", default)]
    pub industry: String,
    #[serde(rename = "Location", default)]
    pub location: String,
}
