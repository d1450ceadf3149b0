//! Webhook client for customer notifications.
//!
//! Contacts containing `@` are treated as email addresses; strings made
//! of digits (optionally prefixed with `+` and broken up with separators)
//! are treated as phone numbers. Anything else is rejected as invalid
//! input before any network call is made.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use pricepilot_core::error::{PricingError, Result};
use pricepilot_core::traits::Notifier;

/// Delivery channel inferred from a contact string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyChannel {
    Email,
    Sms,
}

/// Configuration for the notification client.
#[derive(Debug, Clone)]
pub struct NotifyClientConfig {
    /// Webhook URL for email delivery.
    pub email_webhook_url: String,

    /// Webhook URL for SMS delivery.
    pub sms_webhook_url: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for NotifyClientConfig {
    fn default() -> Self {
        Self {
            email_webhook_url: "http://127.0.0.1:5000/mock-api/send_email".to_string(),
            sms_webhook_url: "http://127.0.0.1:5000/mock-api/send_sms".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Serialize)]
struct NotifyRequest<'a> {
    contact: &'a str,
    message: &'a str,
}

pub struct NotifyClient {
    config: NotifyClientConfig,
    http: Client,
}

impl NotifyClient {
    /// Creates a client with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: NotifyClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| PricingError::external(format!("client build failed: {err}")))?;
        Ok(Self { config, http })
    }

    fn webhook_for(&self, channel: NotifyChannel) -> &str {
        match channel {
            NotifyChannel::Email => &self.config.email_webhook_url,
            NotifyChannel::Sms => &self.config.sms_webhook_url,
        }
    }
}

/// Infers the delivery channel from a contact string.
///
/// # Errors
///
/// Returns `InvalidInput` if the contact matches neither an email shape
/// nor a phone-number shape.
pub fn channel_for(contact: &str) -> Result<NotifyChannel> {
    let trimmed = contact.trim();
    if trimmed.is_empty() {
        return Err(PricingError::invalid_input("contact is empty"));
    }
    if trimmed.contains('@') {
        return Ok(NotifyChannel::Email);
    }
    let digits = trimmed.trim_start_matches('+');
    let looks_like_phone = !digits.is_empty()
        && digits
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'))
        && digits.chars().any(|c| c.is_ascii_digit());
    if looks_like_phone {
        return Ok(NotifyChannel::Sms);
    }
    Err(PricingError::invalid_input(format!(
        "contact {trimmed:?} is neither an email address nor a phone number"
    )))
}

#[async_trait]
impl Notifier for NotifyClient {
    async fn send(&self, contact: &str, message: &str) -> Result<()> {
        let channel = channel_for(contact)?;
        let url = self.webhook_for(channel);
        let body = NotifyRequest { contact, message };

        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PricingError::external(format!(
                "notification returned {status}: {message}"
            )));
        }

        debug!(?channel, "notification dispatched");
        Ok(())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> PricingError {
    if err.is_timeout() {
        PricingError::external(format!("notification timed out: {err}"))
    } else {
        PricingError::external(format!("notification request failed: {err}"))
    }
}
