use serde::{Deserialize, Serialize};

use crate::models::listing::JobListing;

/// An outreach recipient from the configured roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub email_address: String,
    pub display_identity: String,
}

impl Recipient {
    /// Parses `addr@host` or `Display Name <addr@host>`.
    /// Returns `None` for blank input or an address without `@`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let (display, address) = match (raw.find('<'), raw.rfind('>')) {
            (Some(open), Some(close)) if open < close => {
                (raw[..open].trim(), raw[open + 1..close].trim())
            }
            _ => ("", raw),
        };

        if !address.contains('@') {
            return None;
        }

        let display_identity = if display.is_empty() {
            local_part(address).to_string()
        } else {
            display.to_string()
        };

        Some(Self {
            email_address: address.to_string(),
            display_identity,
        })
    }

    /// The part of the address before `@`. Drives phrase selection.
    pub fn local_part(&self) -> &str {
        local_part(&self.email_address)
    }
}

fn local_part(address: &str) -> &str {
    address.split('@').next().unwrap_or(address)
}

/// Signature block printed at the bottom of every outreach message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicantProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Caller-supplied overrides for the applicant signature.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl ApplicantProfile {
    /// Applies non-blank `UserInfo` fields over the configured profile.
    pub fn merged_with(&self, info: Option<&UserInfo>) -> ApplicantProfile {
        let Some(info) = info else {
            return self.clone();
        };
        let pick = |over: &Option<String>, base: &str| {
            over.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(base)
                .to_string()
        };
        ApplicantProfile {
            name: pick(&info.name, &self.name),
            email: pick(&info.email, &self.email),
            phone: pick(&info.phone, &self.phone),
        }
    }
}

/// A fully composed message for one (recipient, job) pairing.
#[derive(Debug, Clone, Serialize)]
pub struct OutreachMessage {
    pub recipient: Recipient,
    pub job: JobListing,
    pub subject_line: String,
    pub body_html: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStatus {
    Sent,
    Error,
}

/// Result of one send attempt. One per recipient per run; never retried.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchOutcome {
    pub recipient: String,
    pub job_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub status: DispatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(rename = "error", skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}
