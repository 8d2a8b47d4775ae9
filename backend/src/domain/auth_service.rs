//! Sign-up, OTP verification, login and token refresh for customers and
//! administrators.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use rand::Rng;
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use super::ports::{
    AdminRepository, MailMessage, Mailer, OtpRepository, PasswordHasher, TokenError, TokenKind,
    TokenService, TokenSubject, UserRepository,
};
use super::user::{Admin, AdminProfile, Otp, Role, SignUpDraft, User, UserProfile};
use super::validation::{email, password, required};
use super::{AdminId, Error, UserId};

/// Repositories and collaborators the auth flows depend on.
#[derive(Clone)]
pub struct AuthPorts {
    pub users: Arc<dyn UserRepository>,
    pub admins: Arc<dyn AdminRepository>,
    pub otps: Arc<dyn OtpRepository>,
    pub mailer: Arc<dyn Mailer>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub tokens: Arc<dyn TokenService>,
}

/// Raw sign-up form.
#[derive(Debug, Clone)]
pub struct SignUpRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile: String,
    pub password: String,
}

/// Profile supplied by a Google sign-in on the client.
#[derive(Debug, Clone)]
pub struct GoogleProfile {
    pub email: String,
    pub display_name: String,
    pub photo_url: Option<String>,
    pub uid: String,
}

/// Access token for the response body and refresh token for the cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Authenticated customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    pub user: UserProfile,
    pub tokens: IssuedTokens,
}

/// Authenticated administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    pub admin: AdminProfile,
    pub tokens: IssuedTokens,
}

/// Result of redeeming an OTP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OtpVerification {
    /// The email is now verified and the user is signed in.
    Verified(UserSession),
    /// Forgot-password mode: the token authorises one password reset.
    ResetToken { email: String, reset_token: String },
}

/// Digest stored in place of an OTP.
pub(crate) fn hash_otp(code: &str) -> String {
    hex::encode(Sha256::digest(code.as_bytes()))
}

fn generate_otp() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
}

fn map_token_error(error: TokenError) -> Error {
    match error {
        TokenError::Signing { .. } => Error::internal(error.to_string()),
        _ => Error::forbidden("token is invalid or expired"),
    }
}

/// Customer and administrator authentication.
#[derive(Clone)]
pub struct AuthService {
    ports: AuthPorts,
    clock: Arc<dyn Clock>,
    otp_ttl: Duration,
}

impl AuthService {
    /// Build the service; `otp_ttl` bounds how long a mailed code stays valid.
    pub fn new(ports: AuthPorts, clock: Arc<dyn Clock>, otp_ttl: Duration) -> Self {
        Self {
            ports,
            clock,
            otp_ttl,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    fn user_subject(user: &User) -> TokenSubject {
        TokenSubject {
            id: *user.id.as_uuid(),
            email: user.email.clone(),
            role: Role::User,
        }
    }

    fn admin_subject(admin: &Admin) -> TokenSubject {
        TokenSubject {
            id: *admin.id.as_uuid(),
            email: admin.email.clone(),
            role: Role::Admin,
        }
    }

    fn issue_pair(&self, subject: &TokenSubject) -> Result<IssuedTokens, Error> {
        let tokens = &self.ports.tokens;
        Ok(IssuedTokens {
            access_token: tokens
                .issue(subject, TokenKind::Access)
                .map_err(map_token_error)?,
            refresh_token: tokens
                .issue(subject, TokenKind::Refresh)
                .map_err(map_token_error)?,
        })
    }

    fn user_session(&self, user: &User) -> Result<UserSession, Error> {
        Ok(UserSession {
            user: UserProfile::from(user),
            tokens: self.issue_pair(&Self::user_subject(user))?,
        })
    }

    async fn find_user_by_email(&self, address: &str) -> Result<Option<User>, Error> {
        Ok(self.ports.users.find_by_email(address).await?)
    }

    /// Mail a fresh code to `address` and store its digest.
    async fn send_otp(&self, address: &str) -> Result<(), Error> {
        let code = generate_otp();
        let now = self.now();
        self.ports
            .otps
            .insert(&Otp {
                email: address.to_owned(),
                code_hash: hash_otp(&code),
                expires_at: now + self.otp_ttl,
                created_at: now,
            })
            .await?;
        self.ports
            .mailer
            .send(&MailMessage::otp(address, &code, self.otp_ttl.num_seconds()))
            .await
            .map_err(|err| {
                warn!(error = %err, "failed to send OTP email");
                Error::service_unavailable("could not send the verification email")
            })?;
        info!(email = %address, "otp issued");
        Ok(())
    }

    /// Register an unverified customer and mail a verification code.
    /// Returns the normalised email.
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<String, Error> {
        let draft = SignUpDraft::new(
            &request.first_name,
            &request.last_name,
            &request.email,
            &request.mobile,
        )?;
        password("password", &request.password)?;
        if let Some(existing) = self.find_user_by_email(&draft.email).await? {
            let message = if existing.google_id.is_some() {
                "an account with this email already exists; sign in with Google"
            } else {
                "an account with this email already exists"
            };
            return Err(Error::conflict(message));
        }
        let now = self.now();
        let user = User {
            id: UserId::random(),
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email.clone(),
            mobile: Some(draft.mobile),
            password_hash: Some(self.ports.hasher.hash(&request.password)?),
            google_id: None,
            date_of_birth: None,
            photo_url: None,
            is_verified: false,
            is_blocked: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        self.ports.users.insert(&user).await?;
        info!(user_id = %user.id, "user signed up");
        self.send_otp(&user.email).await?;
        Ok(user.email)
    }

    /// Mail another code, either to finish verification or to reset a
    /// forgotten password.
    pub async fn resend_otp(&self, raw_email: &str, forgot_password: bool) -> Result<(), Error> {
        let address = email("email", raw_email)?;
        let user = self
            .find_user_by_email(&address)
            .await?
            .filter(|user| !user.is_deleted())
            .ok_or_else(|| Error::not_found("no account exists for this email"))?;
        match (forgot_password, user.is_verified) {
            (false, true) => Err(Error::invalid_request("email is already verified")),
            (true, false) => Err(Error::invalid_request(
                "verify your email before resetting the password",
            )),
            _ => self.send_otp(&address).await,
        }
    }

    /// Redeem the latest code mailed to `raw_email`.
    pub async fn verify_otp(
        &self,
        raw_email: &str,
        code: &str,
        forgot_password: bool,
    ) -> Result<OtpVerification, Error> {
        let address = email("email", raw_email)?;
        let code = required("otp", code)?;
        let otp = self
            .ports
            .otps
            .latest(&address)
            .await?
            .ok_or_else(|| Error::invalid_request("no OTP was requested for this email"))?;
        if !otp.is_live(self.now()) {
            return Err(Error::invalid_request("OTP has expired"));
        }
        if otp.code_hash != hash_otp(&code) {
            warn!(email = %address, "otp mismatch");
            return Err(Error::invalid_request("invalid OTP"));
        }
        let mut user = self
            .find_user_by_email(&address)
            .await?
            .filter(|user| !user.is_deleted())
            .ok_or_else(|| Error::not_found("no account exists for this email"))?;
        self.ports.otps.delete_for(&address).await?;

        if forgot_password {
            let reset_token = self
                .ports
                .tokens
                .issue(&Self::user_subject(&user), TokenKind::PasswordReset)
                .map_err(map_token_error)?;
            return Ok(OtpVerification::ResetToken {
                email: address,
                reset_token,
            });
        }
        if !user.is_verified {
            user.is_verified = true;
            user.updated_at = self.now();
            self.ports.users.update(&user).await?;
            info!(user_id = %user.id, "email verified");
        }
        Ok(OtpVerification::Verified(self.user_session(&user)?))
    }

    /// Email and password login for customers.
    pub async fn login(&self, raw_email: &str, raw_password: &str) -> Result<UserSession, Error> {
        let invalid = || Error::unauthorized("invalid email or password");
        let address = email("email", raw_email).map_err(|_| invalid())?;
        let user = self
            .find_user_by_email(&address)
            .await?
            .filter(|user| !user.is_deleted())
            .ok_or_else(invalid)?;
        let Some(hash) = user.password_hash.as_deref() else {
            return Err(Error::invalid_request(
                "this account uses Google sign-in; continue with Google",
            ));
        };
        if !self.ports.hasher.verify(raw_password, hash)? {
            warn!(user_id = %user.id, "failed login");
            return Err(invalid());
        }
        if user.is_blocked {
            return Err(Error::forbidden("this account has been blocked"));
        }
        if !user.is_verified {
            self.send_otp(&address).await?;
            return Err(Error::forbidden(
                "email is not verified; a new code has been sent",
            )
            .with_details(json!({ "code": "email_not_verified", "email": address })));
        }
        info!(user_id = %user.id, "user logged in");
        self.user_session(&user)
    }

    /// Sign in or register through Google. The flag reports whether a new
    /// account was created.
    pub async fn google_sign_in(&self, profile: GoogleProfile) -> Result<(UserSession, bool), Error> {
        let address = email("email", &profile.email)?;
        let display_name = required("displayName", &profile.display_name)?;
        let uid = required("uid", &profile.uid)?;
        let now = self.now();

        if let Some(mut user) = self
            .find_user_by_email(&address)
            .await?
            .filter(|user| !user.is_deleted())
        {
            if user.is_blocked {
                return Err(Error::forbidden("this account has been blocked"));
            }
            match user.google_id.as_deref() {
                Some(linked) if linked != uid => {
                    return Err(Error::invalid_request(
                        "this email is linked to a different Google account",
                    ));
                }
                Some(_) => {}
                None => {
                    user.google_id = Some(uid);
                    user.is_verified = true;
                    user.updated_at = now;
                    self.ports.users.update(&user).await?;
                    info!(user_id = %user.id, "google account linked");
                }
            }
            return Ok((self.user_session(&user)?, false));
        }

        let (first_name, last_name) = match display_name.split_once(char::is_whitespace) {
            Some((first, rest)) => (first.to_owned(), rest.trim().to_owned()),
            None => (display_name.clone(), String::new()),
        };
        let user = User {
            id: UserId::random(),
            first_name,
            last_name,
            email: address,
            mobile: None,
            password_hash: None,
            google_id: Some(uid),
            date_of_birth: None,
            photo_url: profile
                .photo_url
                .map(|url| url.trim().to_owned())
                .filter(|url| !url.is_empty()),
            is_verified: true,
            is_blocked: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        self.ports.users.insert(&user).await?;
        info!(user_id = %user.id, "user registered through google");
        Ok((self.user_session(&user)?, true))
    }

    /// Exchange a refresh token for a new customer access token.
    pub async fn refresh_user(&self, refresh_token: &str) -> Result<String, Error> {
        let claims = self
            .ports
            .tokens
            .verify(refresh_token, TokenKind::Refresh)
            .map_err(map_token_error)?;
        if claims.role != Role::User {
            return Err(Error::forbidden("token is invalid or expired"));
        }
        let user = self
            .ports
            .users
            .find_by_id(&UserId::from_uuid(claims.sub))
            .await?
            .filter(|user| !user.is_deleted())
            .ok_or_else(|| Error::unauthorized("account no longer exists"))?;
        if user.is_blocked {
            return Err(Error::forbidden("this account has been blocked"));
        }
        self.ports
            .tokens
            .issue(&Self::user_subject(&user), TokenKind::Access)
            .map_err(map_token_error)
    }

    /// Set a new password using the token issued by OTP verification.
    pub async fn reset_password(
        &self,
        reset_token: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), Error> {
        if new_password.is_empty() || confirm_password.is_empty() {
            return Err(Error::invalid_request(
                "newPassword and confirmPassword are required",
            ));
        }
        if new_password != confirm_password {
            return Err(Error::invalid_request("passwords do not match"));
        }
        password("newPassword", new_password)?;
        let claims = self
            .ports
            .tokens
            .verify(reset_token, TokenKind::PasswordReset)
            .map_err(map_token_error)?;
        let mut user = self
            .ports
            .users
            .find_by_id(&UserId::from_uuid(claims.sub))
            .await?
            .filter(|user| !user.is_deleted())
            .ok_or_else(|| Error::not_found("user not found"))?;
        if let Some(current) = user.password_hash.as_deref()
            && self.ports.hasher.verify(new_password, current)?
        {
            return Err(Error::invalid_request(
                "new password must differ from the current one",
            ));
        }
        user.password_hash = Some(self.ports.hasher.hash(new_password)?);
        user.updated_at = self.now();
        self.ports.users.update(&user).await?;
        info!(user_id = %user.id, "password reset");
        Ok(())
    }

    /// Resolve an access token to an active customer.
    pub async fn authorize_user(&self, access_token: &str) -> Result<User, Error> {
        let denied = || Error::forbidden("access denied");
        let claims = self
            .ports
            .tokens
            .verify(access_token, TokenKind::Access)
            .map_err(|_| denied())?;
        if claims.role != Role::User {
            return Err(denied());
        }
        self.ports
            .users
            .find_by_id(&UserId::from_uuid(claims.sub))
            .await?
            .filter(|user| !user.is_deleted() && !user.is_blocked)
            .ok_or_else(denied)
    }

    /// Resolve an access token to an administrator.
    pub async fn authorize_admin(&self, access_token: &str) -> Result<Admin, Error> {
        let denied = || Error::forbidden("access denied");
        let claims = self
            .ports
            .tokens
            .verify(access_token, TokenKind::Access)
            .map_err(|_| denied())?;
        if claims.role != Role::Admin {
            return Err(denied());
        }
        self.ports
            .admins
            .find_by_id(&AdminId::from_uuid(claims.sub))
            .await?
            .ok_or_else(denied)
    }

    /// Email and password login for administrators.
    pub async fn admin_login(&self, raw_email: &str, raw_password: &str) -> Result<AdminSession, Error> {
        let invalid = || Error::unauthorized("invalid email or password");
        let address = email("email", raw_email).map_err(|_| invalid())?;
        let admin = self
            .ports
            .admins
            .find_by_email(&address)
            .await?
            .ok_or_else(invalid)?;
        if !self.ports.hasher.verify(raw_password, &admin.password_hash)? {
            warn!(admin_id = %admin.id, "failed admin login");
            return Err(invalid());
        }
        info!(admin_id = %admin.id, "admin logged in");
        Ok(AdminSession {
            admin: AdminProfile::from(&admin),
            tokens: self.issue_pair(&Self::admin_subject(&admin))?,
        })
    }

    /// Exchange a refresh token for a new administrator access token.
    pub async fn refresh_admin(&self, refresh_token: &str) -> Result<String, Error> {
        let claims = self
            .ports
            .tokens
            .verify(refresh_token, TokenKind::Refresh)
            .map_err(map_token_error)?;
        if claims.role != Role::Admin {
            return Err(Error::forbidden("token is invalid or expired"));
        }
        let admin = self
            .ports
            .admins
            .find_by_id(&AdminId::from_uuid(claims.sub))
            .await?
            .ok_or_else(|| Error::unauthorized("account no longer exists"))?;
        self.ports
            .tokens
            .issue(&Self::admin_subject(&admin), TokenKind::Access)
            .map_err(map_token_error)
    }

    /// Create the bootstrap administrator or refresh its password.
    pub async fn ensure_admin(&self, raw_email: &str, raw_password: &str) -> Result<(), Error> {
        let address = email("adminEmail", raw_email)?;
        required("adminPassword", raw_password)?;
        let hash = self.ports.hasher.hash(raw_password)?;
        let admin = match self.ports.admins.find_by_email(&address).await? {
            Some(existing) => Admin {
                password_hash: hash,
                ..existing
            },
            None => Admin {
                id: AdminId::random(),
                email: address,
                password_hash: hash,
                created_at: self.now(),
            },
        };
        self.ports.admins.upsert(&admin).await?;
        info!(admin_id = %admin.id, "bootstrap admin ensured");
        Ok(())
    }
}

#[cfg(test)]
#[path = "auth_service_tests.rs"]
mod tests;
