//! Outreach send channel: delivers one composed message per call.
//!
//! `SendGridClient` is the HTTP backend; tests substitute their own
//! `OutreachChannel`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

const MESSAGE_ID_HEADER: &str = "X-Message-Id";

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Send rejected (status {status}): {body}")]
    Rejected { status: u16, body: String },
}

impl ChannelError {
    /// Raw error detail recorded in the dispatch report.
    pub fn detail(&self) -> String {
        match self {
            ChannelError::Http(e) => e.to_string(),
            ChannelError::Rejected { body, .. } => body.clone(),
        }
    }
}

/// One outbound message as handed to the channel.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMail {
    pub to: String,
    pub from_address: String,
    pub subject: String,
    pub html_body: String,
}

/// Provider acknowledgement of an accepted message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SendReceipt {
    pub message_id: Option<String>,
}

#[async_trait]
pub trait OutreachChannel: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<SendReceipt, ChannelError>;
}

#[derive(Debug, Serialize)]
struct MailRequest<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: Address<'a>,
    content: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
    subject: &'a str,
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    content_type: &'a str,
    value: &'a str,
}

impl<'a> MailRequest<'a> {
    fn from_mail(mail: &'a OutgoingMail) -> Self {
        Self {
            personalizations: vec![Personalization {
                to: vec![Address { email: &mail.to }],
                subject: &mail.subject,
            }],
            from: Address {
                email: &mail.from_address,
            },
            content: vec![Content {
                content_type: "text/html",
                value: &mail.html_body,
            }],
        }
    }
}

/// SendGrid v3 mail-send client. No retries: a failed send is reported, not repeated.
#[derive(Clone)]
pub struct SendGridClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl SendGridClient {
    pub fn new(api_url: String, api_key: String, timeout: Duration) -> Result<Self, ChannelError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_url,
            api_key,
        })
    }
}

#[async_trait]
impl OutreachChannel for SendGridClient {
    async fn send(&self, mail: &OutgoingMail) -> Result<SendReceipt, ChannelError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&MailRequest::from_mail(mail))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChannelError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let message_id = response
            .headers()
            .get(MESSAGE_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok(SendReceipt { message_id })
    }
}
