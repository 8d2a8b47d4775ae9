//! Reqwest-backed mail API client and its logging fallback.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use tracing::{error, info};
use zeroize::Zeroizing;

use crate::domain::ports::{MailMessage, Mailer, MailerError};

/// Endpoint and credentials for the mail API.
pub struct MailApiConfig {
    pub endpoint: Url,
    pub api_key: Zeroizing<String>,
    pub sender: String,
}

#[derive(Debug, Serialize)]
struct OutgoingMailDto<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Sends mail through an HTTP API authenticated with a bearer key.
pub struct HttpMailer {
    client: Client,
    config: MailApiConfig,
}

impl HttpMailer {
    /// Build a mailer with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`MailerError::Transport`] when the client cannot be built.
    pub fn new(config: MailApiConfig, timeout: Duration) -> Result<Self, MailerError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| MailerError::transport(err.to_string()))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailerError> {
        let response = self
            .client
            .post(self.config.endpoint.clone())
            .bearer_auth(self.config.api_key.as_str())
            .json(&OutgoingMailDto {
                from: &self.config.sender,
                to: &message.to,
                subject: &message.subject,
                text: &message.body,
            })
            .send()
            .await
            .map_err(|err| {
                error!(error = %err, "mail API unreachable");
                MailerError::transport(err.to_string())
            })?;
        let status = response.status();
        if !status.is_success() {
            error!(status = status.as_u16(), to = %message.to, "mail API rejected message");
            return Err(MailerError::rejected(status.as_u16()));
        }
        info!(to = %message.to, subject = %message.subject, "mail sent");
        Ok(())
    }
}

/// Records sends in the log without delivering them. Message bodies are not
/// logged because they carry one-time passwords.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingMailer;

#[async_trait]
impl Mailer for LoggingMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailerError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            "mail API not configured; message not delivered"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn logging_mailer_accepts_every_message() {
        let message = MailMessage::otp("ada@example.com", "123456", 60);
        assert!(LoggingMailer.send(&message).await.is_ok());
    }

    #[test]
    fn outgoing_payload_uses_api_field_names() {
        let dto = OutgoingMailDto {
            from: "shop@example.com",
            to: "ada@example.com",
            subject: "Hi",
            text: "Body",
        };
        let value = serde_json::to_value(&dto).expect("serialises");
        assert_eq!(value["from"], "shop@example.com");
        assert_eq!(value["text"], "Body");
    }
}
