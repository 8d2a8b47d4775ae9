//! HS256 JSON Web Tokens with one secret per token kind.

use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use zeroize::Zeroizing;

use crate::domain::ports::{TokenClaims, TokenError, TokenKind, TokenService, TokenSubject};

/// Signing secrets. Access, refresh and reset tokens never share a key.
pub struct TokenSecrets {
    pub access: Zeroizing<String>,
    pub refresh: Zeroizing<String>,
    pub reset: Zeroizing<String>,
}

/// Lifetimes per token kind.
#[derive(Debug, Clone, Copy)]
pub struct TokenTtls {
    pub access: Duration,
    pub refresh: Duration,
    pub reset: Duration,
}

impl Default for TokenTtls {
    fn default() -> Self {
        Self {
            access: Duration::minutes(15),
            refresh: Duration::days(7),
            reset: Duration::minutes(10),
        }
    }
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// [`TokenService`] backed by `jsonwebtoken`.
pub struct JwtTokenService {
    access: KeyPair,
    refresh: KeyPair,
    reset: KeyPair,
    ttls: TokenTtls,
    clock: Arc<dyn Clock>,
}

impl JwtTokenService {
    pub fn new(secrets: &TokenSecrets, ttls: TokenTtls, clock: Arc<dyn Clock>) -> Self {
        Self {
            access: KeyPair::from_secret(&secrets.access),
            refresh: KeyPair::from_secret(&secrets.refresh),
            reset: KeyPair::from_secret(&secrets.reset),
            ttls,
            clock,
        }
    }

    fn keys(&self, kind: TokenKind) -> (&KeyPair, Duration) {
        match kind {
            TokenKind::Access => (&self.access, self.ttls.access),
            TokenKind::Refresh => (&self.refresh, self.ttls.refresh),
            TokenKind::PasswordReset => (&self.reset, self.ttls.reset),
        }
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, subject: &TokenSubject, kind: TokenKind) -> Result<String, TokenError> {
        let (keys, ttl) = self.keys(kind);
        let issued_at = self.clock.utc();
        let claims = TokenClaims {
            sub: subject.id,
            email: subject.email.clone(),
            role: subject.role,
            kind,
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
            .map_err(|err| TokenError::signing(err.to_string()))
    }

    fn verify(&self, token: &str, kind: TokenKind) -> Result<TokenClaims, TokenError> {
        let (keys, _) = self.keys(kind);
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<TokenClaims>(token, &keys.decoding, &validation).map_err(|err| {
            match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::expired(),
                _ => TokenError::invalid(err.to_string()),
            }
        })?;
        if data.claims.kind != kind {
            return Err(TokenError::wrong_kind());
        }
        Ok(data.claims)
    }
}
