//! Dispatch Reporter: sends one message per recipient and reports each outcome.
//!
//! Sends are sequential with a fixed pause between them. A failed send is
//! recorded and the loop moves on; nothing is retried within a run.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::OutreachConfig;
use crate::models::listing::JobListing;
use crate::models::outreach::{ApplicantProfile, DispatchOutcome, DispatchStatus};
use crate::outreach::channel::{OutgoingMail, OutreachChannel};
use crate::outreach::synthesizer::compose_message;

#[derive(Debug, Error, PartialEq)]
pub enum DispatchError {
    #[error("Outreach sender address is not configured")]
    MissingSender,

    #[error("Outreach recipient list is empty")]
    NoRecipients,
}

/// Run timestamp as printed in subjects and bodies.
pub fn run_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Sends to at most `max_recipients` recipients. Recipient `i` gets
/// `jobs[i % jobs.len()]`. Returns an empty report when `jobs` is empty.
pub async fn dispatch_outreach(
    channel: &dyn OutreachChannel,
    config: &OutreachConfig,
    jobs: &[JobListing],
    skills: &[String],
    applicant: &ApplicantProfile,
    timestamp: &str,
) -> Result<Vec<DispatchOutcome>, DispatchError> {
    let sender = config
        .sender_address
        .as_deref()
        .ok_or(DispatchError::MissingSender)?;
    if config.recipients.is_empty() {
        return Err(DispatchError::NoRecipients);
    }
    if jobs.is_empty() {
        return Ok(Vec::new());
    }

    let recipients: Vec<_> = config
        .recipients
        .iter()
        .take(config.max_recipients)
        .collect();
    info!(
        "Dispatching outreach to {} recipients across {} jobs",
        recipients.len(),
        jobs.len()
    );

    let mut report = Vec::with_capacity(recipients.len());

    for (i, recipient) in recipients.iter().enumerate() {
        if i > 0 && !config.send_delay.is_zero() {
            tokio::time::sleep(config.send_delay).await;
        }

        let job = &jobs[i % jobs.len()];
        let message = compose_message(recipient, job, skills, applicant, timestamp);
        let mail = OutgoingMail {
            to: recipient.email_address.clone(),
            from_address: sender.to_string(),
            subject: message.subject_line,
            html_body: message.body_html,
        };

        let outcome = match channel.send(&mail).await {
            Ok(receipt) => {
                info!(
                    "Outreach sent to {} (message id: {})",
                    recipient.email_address,
                    receipt.message_id.as_deref().unwrap_or("not available")
                );
                DispatchOutcome {
                    recipient: recipient.email_address.clone(),
                    job_title: job.title.clone(),
                    company: job.company.clone(),
                    status: DispatchStatus::Sent,
                    message_id: receipt.message_id,
                    error_detail: None,
                }
            }
            Err(e) => {
                warn!("Outreach to {} failed: {}", recipient.email_address, e);
                DispatchOutcome {
                    recipient: recipient.email_address.clone(),
                    job_title: job.title.clone(),
                    company: job.company.clone(),
                    status: DispatchStatus::Error,
                    message_id: None,
                    error_detail: Some(e.detail()),
                }
            }
        };
        report.push(outcome);
    }

    Ok(report)
}
