//! Port for outbound transactional email.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    pub enum MailerError {
        Transport { message: String } => "mail API unreachable: {message}",
        Rejected { status: u16 } => "mail API rejected the message ({status})",
    }
}

/// Plain-text email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl MailMessage {
    /// The one-time password email.
    pub fn otp(to: &str, code: &str, ttl_seconds: i64) -> Self {
        Self {
            to: to.to_owned(),
            subject: "Your verification code".to_owned(),
            body: format!(
                "Your verification code is {code}. It expires in {ttl_seconds} seconds."
            ),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &MailMessage) -> Result<(), MailerError>;
}
