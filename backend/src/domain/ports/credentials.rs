//! Ports for password hashing and bearer tokens.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::user::Role;

use super::define_port_error;

define_port_error! {
    pub enum PasswordHashError {
        Hash { message: String } => "password hashing failed: {message}",
        Malformed { message: String } => "stored password hash is malformed: {message}",
    }
}

impl From<PasswordHashError> for Error {
    fn from(error: PasswordHashError) -> Self {
        Self::internal(error.to_string())
    }
}

/// One-way password hashing.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError>;
}

define_port_error! {
    pub enum TokenError {
        /// Signature, audience or shape is wrong.
        Invalid { message: String } => "token is invalid: {message}",
        Expired => "token has expired",
        /// The token was issued for another purpose.
        WrongKind => "token kind mismatch",
        Signing { message: String } => "token signing failed: {message}",
    }
}

/// Purpose a token was issued for. Each kind is signed with its own secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
    PasswordReset,
}

/// Who a token speaks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

/// Verified token contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

impl TokenClaims {
    /// The subject the token was issued to.
    pub fn subject(&self) -> TokenSubject {
        TokenSubject {
            id: self.sub,
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// Issues and verifies signed tokens.
#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    fn issue(&self, subject: &TokenSubject, kind: TokenKind) -> Result<String, TokenError>;

    fn verify(&self, token: &str, kind: TokenKind) -> Result<TokenClaims, TokenError>;
}
