use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;

use crate::config::MailerConfig;

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("mail delivery is not configured")]
    Unconfigured,
    #[error("mail delivery failed with status {0}")]
    Delivery(u16),
    #[error("mail delivery failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Outbound delivery of one-time reset codes. The auth core only depends on
/// this trait; the webhook client below is wired in at process start.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_reset_code(&self, email: &str, code: &str) -> Result<(), NotifierError>;
}

pub struct WebhookNotifier {
    client: reqwest::Client,
    config: Option<MailerConfig>,
}

impl WebhookNotifier {
    pub fn new(config: Option<MailerConfig>) -> Self {
        if config.is_none() {
            tracing::warn!("mailer not configured; password-reset delivery will fail");
        }
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send_reset_code(&self, email: &str, code: &str) -> Result<(), NotifierError> {
        let config = self.config.as_ref().ok_or(NotifierError::Unconfigured)?;

        let payload = json!({
            "to": email,
            "from": config.from_address,
            "subject": "Password recovery code",
            "text": format!(
                "Your verification code is: {code}. It expires in a few minutes."
            ),
            "html": format!(
                "<p>Your verification code is: <strong>{code}</strong>.</p>\
                 <p>It expires in a few minutes.</p>"
            ),
        });

        let mut request = self.client.post(&config.webhook_url).json(&payload);
        if let Some(api_key) = config.api_key.as_deref() {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            tracing::error!(status = response.status().as_u16(), "reset mail rejected");
            return Err(NotifierError::Delivery(response.status().as_u16()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Notifier, NotifierError, WebhookNotifier};

    #[tokio::test]
    async fn unconfigured_notifier_fails_closed() {
        let notifier = WebhookNotifier::new(None);

        let err = notifier
            .send_reset_code("ana@x.com", "123456")
            .await
            .expect_err("delivery should fail");
        assert!(matches!(err, NotifierError::Unconfigured));
    }
}
