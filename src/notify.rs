//! Completion notifications to nominee phones.
//!
//! The dispatcher builds the message body and hands it to a
//! `NotificationChannel`. The Twilio channel posts to the Messages REST
//! endpoint; when credentials are absent a disabled channel reports every
//! send as failed, so task completion still commits without SMS.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

use crate::config::TwilioConfig;
use crate::store::Task;

/// Error from a notification send attempt.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification channel is not configured")]
    Disabled,

    #[error("network error: {0}")]
    Network(String),

    #[error("provider rejected message (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Receipt for an accepted message.
#[derive(Debug, Clone)]
pub struct DeliveryReceipt {
    /// Provider-side message id, when the provider returns one.
    pub message_id: Option<String>,
}

/// Outbound SMS transport.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> Result<DeliveryReceipt, NotifyError>;
}

/// Twilio Messages REST API channel.
pub struct TwilioChannel {
    client: Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

impl TwilioChannel {
    pub fn new(account_sid: String, auth_token: String, from_number: String) -> Self {
        Self {
            client: Client::new(),
            account_sid,
            auth_token,
            from_number,
        }
    }

    /// Build a channel from config; None unless all credentials are set.
    pub fn from_config(config: &TwilioConfig) -> Option<Self> {
        match (&config.account_sid, &config.auth_token, &config.from_number) {
            (Some(sid), Some(token), Some(from)) => {
                Some(Self::new(sid.clone(), token.clone(), from.clone()))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TwilioMessageResponse {
    sid: Option<String>,
}

#[async_trait]
impl NotificationChannel for TwilioChannel {
    async fn send(&self, to: &str, body: &str) -> Result<DeliveryReceipt, NotifyError> {
        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.account_sid
        );
        let form = [
            ("To", to),
            ("From", self.from_number.as_str()),
            ("Body", body),
        ];

        let response = match self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&form)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                if e.is_timeout() {
                    return Err(NotifyError::Network(format!("Request timeout: {}", e)));
                } else if e.is_connect() {
                    return Err(NotifyError::Network(format!("Connection failed: {}", e)));
                } else {
                    return Err(NotifyError::Network(format!("Request failed: {}", e)));
                }
            }
        };

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body: text,
            });
        }

        // Twilio returns the message resource as JSON; tolerate a body we
        // cannot parse since the send itself was accepted.
        let parsed: TwilioMessageResponse =
            serde_json::from_str(&text).unwrap_or(TwilioMessageResponse { sid: None });
        Ok(DeliveryReceipt {
            message_id: parsed.sid,
        })
    }
}

/// Channel used when SMS credentials are absent; every send fails soft.
pub struct DisabledChannel;

#[async_trait]
impl NotificationChannel for DisabledChannel {
    async fn send(&self, _to: &str, _body: &str) -> Result<DeliveryReceipt, NotifyError> {
        Err(NotifyError::Disabled)
    }
}

/// Pick the channel for this configuration.
pub fn channel_from_config(config: &TwilioConfig) -> Arc<dyn NotificationChannel> {
    match TwilioChannel::from_config(config) {
        Some(channel) => Arc::new(channel),
        None => {
            tracing::warn!("Twilio credentials not configured; completion SMS disabled");
            Arc::new(DisabledChannel)
        }
    }
}

/// Builds completion messages and pushes them through the channel.
pub struct NotificationDispatcher {
    channel: Arc<dyn NotificationChannel>,
}

impl NotificationDispatcher {
    pub fn new(channel: Arc<dyn NotificationChannel>) -> Self {
        Self { channel }
    }

    /// The exact body sent to nominees when a task completes.
    pub fn completion_message(task: &Task) -> String {
        let disease = task
            .metric
            .map(|m| m.disease.name().to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let value = task
            .metric
            .map(|m| m.value.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        format!(
            "Task \"{}\" has been completed. Disease: {}, Value: {}",
            task.name, disease, value
        )
    }

    /// Send the completion notification for a task.
    ///
    /// The result is advisory: a failed send never undoes the completion
    /// that triggered it.
    pub async fn notify_completion(&self, task: &Task) -> Result<DeliveryReceipt, NotifyError> {
        let body = Self::completion_message(task);
        match self.channel.send(&task.nominee_phone, &body).await {
            Ok(receipt) => {
                tracing::info!(task_id = %task.id, to = %task.nominee_phone, "completion notification sent");
                Ok(receipt)
            }
            Err(e) => {
                tracing::warn!(task_id = %task.id, error = %e, "completion notification failed");
                Err(e)
            }
        }
    }
}
