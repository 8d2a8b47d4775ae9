//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `STOREFRONT_*` environment variables and an
//! optional configuration file. Optional values fall back to development
//! defaults through the accessor methods; secrets are required and are
//! handed out wrapped in [`Zeroizing`].

use std::net::SocketAddr;
use std::time::Duration as StdDuration;

use chrono::Duration;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use crate::outbound::mail::MailApiConfig;
use crate::outbound::payment::RazorpayCredentials;
use crate::outbound::security::{TokenSecrets, TokenTtls};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DATABASE_URL: &str = "postgres://localhost/storefront";
const DEFAULT_OTP_TTL_SECS: i64 = 60;
const DEFAULT_MAIL_SENDER: &str = "no-reply@storefront.local";

/// Why the loaded settings cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("missing required setting: {name}")]
    Missing { name: &'static str },
    #[error("invalid value for {name}: {message}")]
    Invalid { name: &'static str, message: String },
}

impl SettingsError {
    fn invalid(name: &'static str, message: impl ToString) -> Self {
        Self::Invalid {
            name,
            message: message.to_string(),
        }
    }
}

/// Runtime settings for the storefront server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "STOREFRONT")]
pub struct StorefrontSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    #[ortho_config(default = 10)]
    pub pool_size: u32,
    /// HS256 secret for access tokens.
    pub access_token_secret: Option<String>,
    /// HS256 secret for refresh tokens.
    pub refresh_token_secret: Option<String>,
    /// HS256 secret for password reset tokens.
    pub reset_token_secret: Option<String>,
    /// Access token lifetime in minutes.
    pub access_token_ttl_minutes: Option<i64>,
    /// Refresh token lifetime in days.
    pub refresh_token_ttl_days: Option<i64>,
    /// Reset token lifetime in minutes.
    pub reset_token_ttl_minutes: Option<i64>,
    /// Lifetime of a sign-up or reset OTP in seconds.
    pub otp_ttl_seconds: Option<i64>,
    /// Bootstrap admin account, created or refreshed at startup.
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    /// Payment gateway API key pair.
    pub razorpay_key_id: Option<String>,
    pub razorpay_key_secret: Option<String>,
    /// Payment gateway base URL override.
    pub razorpay_base_url: Option<String>,
    /// Mail API endpoint; mail is only logged when unset.
    pub mail_api_url: Option<String>,
    pub mail_api_key: Option<String>,
    pub mail_sender: Option<String>,
    /// Timeout for payment and mail API calls, in seconds.
    #[ortho_config(default = 10)]
    pub upstream_timeout_seconds: u64,
}

impl StorefrontSettings {
    /// Bind address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        match self.bind_addr {
            Some(addr) => Ok(addr),
            None => DEFAULT_BIND_ADDR
                .parse()
                .map_err(|err| SettingsError::invalid("bind_addr", err)),
        }
    }

    pub fn database_url(&self) -> &str {
        self.database_url.as_deref().unwrap_or(DEFAULT_DATABASE_URL)
    }

    pub fn pool_size(&self) -> u32 {
        self.pool_size
    }

    /// All three token secrets; each must be set and non-blank.
    pub fn token_secrets(&self) -> Result<TokenSecrets, SettingsError> {
        Ok(TokenSecrets {
            access: secret("access_token_secret", self.access_token_secret.as_deref())?,
            refresh: secret("refresh_token_secret", self.refresh_token_secret.as_deref())?,
            reset: secret("reset_token_secret", self.reset_token_secret.as_deref())?,
        })
    }

    /// Token lifetimes, each falling back to the adapter default.
    pub fn token_ttls(&self) -> Result<TokenTtls, SettingsError> {
        let defaults = TokenTtls::default();
        Ok(TokenTtls {
            access: positive(
                "access_token_ttl_minutes",
                self.access_token_ttl_minutes,
                Duration::minutes,
            )?
            .unwrap_or(defaults.access),
            refresh: positive(
                "refresh_token_ttl_days",
                self.refresh_token_ttl_days,
                Duration::days,
            )?
            .unwrap_or(defaults.refresh),
            reset: positive(
                "reset_token_ttl_minutes",
                self.reset_token_ttl_minutes,
                Duration::minutes,
            )?
            .unwrap_or(defaults.reset),
        })
    }

    pub fn otp_ttl(&self) -> Result<Duration, SettingsError> {
        Ok(
            positive("otp_ttl_seconds", self.otp_ttl_seconds, Duration::seconds)?
                .unwrap_or_else(|| Duration::seconds(DEFAULT_OTP_TTL_SECS)),
        )
    }

    /// Bootstrap admin credentials when both halves are configured.
    pub fn admin_credentials(&self) -> Option<(&str, Zeroizing<String>)> {
        match (self.admin_email.as_deref(), self.admin_password.as_deref()) {
            (Some(email), Some(password)) => Some((email, Zeroizing::new(password.to_owned()))),
            _ => None,
        }
    }

    /// Gateway credentials; `None` leaves online payments unavailable.
    pub fn razorpay_credentials(&self) -> Option<RazorpayCredentials> {
        let key_id = self.razorpay_key_id.as_deref()?.trim();
        let key_secret = self.razorpay_key_secret.as_deref()?;
        if key_id.is_empty() || key_secret.trim().is_empty() {
            return None;
        }
        Some(RazorpayCredentials {
            key_id: key_id.to_owned(),
            key_secret: Zeroizing::new(key_secret.to_owned()),
        })
    }

    pub fn razorpay_base_url(&self) -> Result<Option<Url>, SettingsError> {
        self.razorpay_base_url
            .as_deref()
            .map(|raw| Url::parse(raw).map_err(|err| SettingsError::invalid("razorpay_base_url", err)))
            .transpose()
    }

    /// Mail API settings; `None` when no endpoint is configured.
    pub fn mail_api(&self) -> Result<Option<MailApiConfig>, SettingsError> {
        let Some(raw) = self.mail_api_url.as_deref() else {
            return Ok(None);
        };
        let endpoint =
            Url::parse(raw).map_err(|err| SettingsError::invalid("mail_api_url", err))?;
        Ok(Some(MailApiConfig {
            endpoint,
            api_key: secret("mail_api_key", self.mail_api_key.as_deref())?,
            sender: self
                .mail_sender
                .clone()
                .unwrap_or_else(|| DEFAULT_MAIL_SENDER.to_owned()),
        }))
    }

    pub fn upstream_timeout(&self) -> StdDuration {
        StdDuration::from_secs(self.upstream_timeout_seconds)
    }
}

fn secret(name: &'static str, value: Option<&str>) -> Result<Zeroizing<String>, SettingsError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(Zeroizing::new(value.to_owned())),
        _ => Err(SettingsError::Missing { name }),
    }
}

fn positive(
    name: &'static str,
    value: Option<i64>,
    unit: fn(i64) -> Duration,
) -> Result<Option<Duration>, SettingsError> {
    match value {
        None => Ok(None),
        Some(amount) if amount > 0 => Ok(Some(unit(amount))),
        Some(amount) => Err(SettingsError::invalid(name, format!("{amount} is not positive"))),
    }
}
