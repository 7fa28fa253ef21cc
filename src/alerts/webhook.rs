//! Slack-compatible incoming-webhook notifier
//!
//! Posts `{"text": ..., "attachments": [{"fallback": ..., "fields": [...]}]}`
//! to the configured URL. The async `reqwest` client is driven on a private
//! current-thread runtime so callers stay synchronous.

use crate::alerts::{Alert, AlertField, Notifier};
use crate::error::AlertError;
use log::{info, warn};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};

/// Request body for an incoming webhook
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
    attachments: Vec<WebhookAttachment<'a>>,
}

#[derive(Debug, Serialize)]
struct WebhookAttachment<'a> {
    fallback: &'a str,
    fields: &'a [AlertField],
}

impl<'a> WebhookPayload<'a> {
    fn from_alert(alert: &'a Alert) -> Self {
        let attachments = if alert.fields.is_empty() {
            Vec::new()
        } else {
            vec![WebhookAttachment {
                fallback: &alert.title,
                fields: &alert.fields,
            }]
        };

        Self {
            text: &alert.summary,
            attachments,
        }
    }
}

/// Notifier that delivers alerts to an HTTP(S) webhook
///
/// With no URL configured every alert is logged and skipped; no request is
/// made and the call succeeds.
pub struct WebhookNotifier {
    client: Client,
    runtime: Runtime,
    url: Option<String>,
}

impl WebhookNotifier {
    /// Create a webhook notifier
    ///
    /// # Arguments
    ///
    /// * `url` - Webhook endpoint, or `None` to disable delivery
    /// * `timeout` - Upper bound on a single delivery attempt
    ///
    /// # Errors
    ///
    /// Returns `AlertError` if the HTTP client or its runtime cannot be built.
    pub fn new(url: Option<String>, timeout: Duration) -> Result<Self, AlertError> {
        let client = Client::builder().timeout(timeout).build()?;
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(AlertError::RuntimeError)?;

        Ok(Self {
            client,
            runtime,
            url: url.filter(|u| !u.trim().is_empty()),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    async fn post(&self, url: &str, alert: &Alert) -> Result<(), AlertError> {
        let payload = WebhookPayload::from_alert(alert);
        let response = self.client.post(url).json(&payload).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AlertError::NotificationFailed(format!(
                "webhook returned {}: {}",
                status, error_text
            )));
        }

        Ok(())
    }
}

impl Notifier for WebhookNotifier {
    fn notify(&self, alert: &Alert) -> Result<(), AlertError> {
        let Some(url) = self.url.as_deref() else {
            warn!("Webhook URL not configured; skipping alert: {}", alert.summary);
            return Ok(());
        };

        self.runtime.block_on(self.post(url, alert))?;
        info!("Alert sent: {}", alert.summary);
        Ok(())
    }
}
