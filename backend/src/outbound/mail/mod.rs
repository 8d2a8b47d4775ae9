//! Transactional mail adapters.
//!
//! [`HttpMailer`] posts messages to a JSON mail API; [`LoggingMailer`] is used
//! when no API is configured and only records that a message was sent.

mod http_mailer;

pub use http_mailer::{HttpMailer, LoggingMailer, MailApiConfig};
