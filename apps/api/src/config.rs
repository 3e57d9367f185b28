use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::warn;

use crate::models::outreach::{ApplicantProfile, Recipient};

const DEFAULT_JOB_SEARCH_API_URL: &str = "https://api.theirstack.com/v1/jobs/search";
const DEFAULT_MAIL_API_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// Application configuration loaded from environment variables.
/// Resolved once at startup and threaded into every component.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Bounds every outbound provider / send-channel call.
    pub http_timeout: Duration,
    /// Bounds a whole inbound request.
    pub request_timeout: Duration,
    pub job_search: JobSearchConfig,
    pub mail: MailConfig,
    pub company_dataset_path: PathBuf,
    pub outreach: OutreachConfig,
}

#[derive(Debug, Clone)]
pub struct JobSearchConfig {
    pub api_url: String,
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
}

/// Recipient roster and sender identity for the dispatch stage.
#[derive(Debug, Clone)]
pub struct OutreachConfig {
    pub sender_address: Option<String>,
    pub recipients: Vec<Recipient>,
    /// Upper bound on recipients contacted per run.
    pub max_recipients: usize,
    pub send_delay: Duration,
    /// Whether dispatch runs when the request does not say.
    pub auto_send: bool,
    pub applicant: ApplicantProfile,
}

impl Default for OutreachConfig {
    fn default() -> Self {
        Self {
            sender_address: None,
            recipients: Vec::new(),
            max_recipients: 5,
            send_delay: Duration::from_millis(1000),
            auto_send: true,
            applicant: ApplicantProfile::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = OutreachConfig::default();

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            http_timeout: Duration::from_secs(parse_env("HTTP_TIMEOUT_SECS", 30)?),
            request_timeout: Duration::from_secs(parse_env("REQUEST_TIMEOUT_SECS", 180)?),
            job_search: JobSearchConfig {
                api_url: optional_env("JOB_SEARCH_API_URL")
                    .unwrap_or_else(|| DEFAULT_JOB_SEARCH_API_URL.to_string()),
                api_key: require_env("JOB_SEARCH_API_KEY")?,
            },
            mail: MailConfig {
                api_url: optional_env("MAIL_API_URL")
                    .unwrap_or_else(|| DEFAULT_MAIL_API_URL.to_string()),
                api_key: optional_env("MAIL_API_KEY").unwrap_or_default(),
            },
            company_dataset_path: optional_env("COMPANY_DATASET_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("yc.csv")),
            outreach: OutreachConfig {
                sender_address: optional_env("OUTREACH_SENDER"),
                recipients: parse_recipients(
                    &optional_env("OUTREACH_RECIPIENTS").unwrap_or_default(),
                ),
                max_recipients: parse_env("OUTREACH_MAX_RECIPIENTS", defaults.max_recipients)?,
                send_delay: Duration::from_millis(parse_env("OUTREACH_SEND_DELAY_MS", 1000)?),
                auto_send: parse_env("OUTREACH_AUTO_SEND", defaults.auto_send)?,
                applicant: ApplicantProfile {
                    name: optional_env("APPLICANT_NAME").unwrap_or_default(),
                    email: optional_env("APPLICANT_EMAIL").unwrap_or_default(),
                    phone: optional_env("APPLICANT_PHONE").unwrap_or_default(),
                },
            },
        })
    }
}

/// Parses a comma-separated roster. Malformed entries are skipped with a warning.
pub fn parse_recipients(raw: &str) -> Vec<Recipient> {
    raw.split(',')
        .filter(|entry| !entry.trim().is_empty())
        .filter_map(|entry| {
            let parsed = Recipient::parse(entry);
            if parsed.is_none() {
                warn!("Ignoring malformed outreach recipient '{}'", entry.trim());
            }
            parsed
        })
        .collect()
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
