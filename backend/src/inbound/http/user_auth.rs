//! Customer authentication handlers.
//!
//! ```text
//! POST   /api/v1/auth/user/sign-up
//! POST   /api/v1/auth/user/resend-otp
//! POST   /api/v1/auth/user/verify-otp
//! POST   /api/v1/auth/user/login
//! POST   /api/v1/auth/user/google-sign-in
//! GET    /api/v1/auth/user/refresh-token
//! POST   /api/v1/auth/user/reset-password
//! DELETE /api/v1/auth/user/logout
//! ```
//!
//! Access tokens travel in response bodies; refresh tokens only in the
//! `jwtUser` cookie.

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::user::UserProfile;
use crate::domain::{Error, GoogleProfile, OtpVerification, SignUpRequest, UserSession};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{AccessTokenResponse, MessageResponse};
use crate::inbound::http::session::RefreshSession;
use crate::inbound::http::state::HttpState;

/// Sign-up form.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct SignUpBody {
    pub first_name: String,
    pub last_name: String,
    #[schema(example = "asha@example.com")]
    pub email: String,
    #[schema(example = "9876543210")]
    pub mobile: String,
    pub password: String,
}

impl From<SignUpBody> for SignUpRequest {
    fn from(body: SignUpBody) -> Self {
        Self {
            first_name: body.first_name,
            last_name: body.last_name,
            email: body.email,
            mobile: body.mobile,
            password: body.password,
        }
    }
}

/// Acknowledges a sign-up; the OTP went to `email`.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SignUpResponse {
    pub message: String,
    pub email: String,
}

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ResendOtpBody {
    pub email: String,
    /// Send a password-reset OTP instead of a verification OTP.
    pub forgot_password: bool,
}

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct VerifyOtpBody {
    pub email: String,
    #[schema(example = "042517")]
    pub otp: String,
    pub forgot_password: bool,
}

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct CredentialsBody {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct GoogleSignInBody {
    pub email: String,
    pub display_name: String,
    pub photo_url: Option<String>,
    /// Firebase user id.
    pub uid: String,
}

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ResetPasswordBody {
    pub reset_token: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Signed-in customer.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserLoginResponse {
    pub user: UserProfile,
    pub access_token: String,
}

/// Token authorising one password reset.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetTokenResponse {
    pub email: String,
    pub reset_token: String,
}

fn signed_in(session: &RefreshSession, signed: UserSession) -> Result<UserLoginResponse, Error> {
    session.persist(&signed.tokens.refresh_token)?;
    Ok(UserLoginResponse {
        user: signed.user,
        access_token: signed.tokens.access_token,
    })
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/user/sign-up",
    request_body = SignUpBody,
    responses(
        (status = 201, description = "Account created and OTP sent", body = SignUpResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 503, description = "Mail delivery unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "userSignUp",
    security(())
)]
#[post("/sign-up")]
pub async fn sign_up(
    state: web::Data<HttpState>,
    payload: web::Json<SignUpBody>,
) -> ApiResult<HttpResponse> {
    let email = state.auth.sign_up(payload.into_inner().into()).await?;
    Ok(HttpResponse::Created().json(SignUpResponse {
        message: "verification code sent".into(),
        email,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/user/resend-otp",
    request_body = ResendOtpBody,
    responses(
        (status = 200, description = "OTP sent", body = MessageResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Unknown email", body = Error)
    ),
    tags = ["auth"],
    operation_id = "userResendOtp",
    security(())
)]
#[post("/resend-otp")]
pub async fn resend_otp(
    state: web::Data<HttpState>,
    payload: web::Json<ResendOtpBody>,
) -> ApiResult<web::Json<MessageResponse>> {
    state
        .auth
        .resend_otp(&payload.email, payload.forgot_password)
        .await?;
    Ok(web::Json(MessageResponse::new("verification code sent")))
}

/// Redeem an OTP.
///
/// In forgot-password mode the body is `{email, resetToken}`; otherwise the
/// account is verified and signed in.
#[utoipa::path(
    post,
    path = "/api/v1/auth/user/verify-otp",
    request_body = VerifyOtpBody,
    responses(
        (status = 200, description = "Verified and signed in; `ResetTokenResponse` in forgot-password mode",
            body = UserLoginResponse,
            headers(("Set-Cookie" = String, description = "jwtUser refresh cookie"))),
        (status = 400, description = "Missing, expired or wrong OTP", body = Error)
    ),
    tags = ["auth"],
    operation_id = "userVerifyOtp",
    security(())
)]
#[post("/verify-otp")]
pub async fn verify_otp(
    state: web::Data<HttpState>,
    session: RefreshSession,
    payload: web::Json<VerifyOtpBody>,
) -> ApiResult<HttpResponse> {
    let outcome = state
        .auth
        .verify_otp(&payload.email, &payload.otp, payload.forgot_password)
        .await?;
    match outcome {
        OtpVerification::Verified(signed) => {
            Ok(HttpResponse::Ok().json(signed_in(&session, signed)?))
        }
        OtpVerification::ResetToken { email, reset_token } => {
            Ok(HttpResponse::Ok().json(ResetTokenResponse { email, reset_token }))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/user/login",
    request_body = CredentialsBody,
    responses(
        (status = 200, description = "Signed in", body = UserLoginResponse,
            headers(("Set-Cookie" = String, description = "jwtUser refresh cookie"))),
        (status = 400, description = "Google-only account", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 403, description = "Blocked or unverified", body = Error)
    ),
    tags = ["auth"],
    operation_id = "userLogin",
    security(())
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: RefreshSession,
    payload: web::Json<CredentialsBody>,
) -> ApiResult<web::Json<UserLoginResponse>> {
    let signed = state.auth.login(&payload.email, &payload.password).await?;
    Ok(web::Json(signed_in(&session, signed)?))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/user/google-sign-in",
    request_body = GoogleSignInBody,
    responses(
        (status = 200, description = "Existing account signed in", body = UserLoginResponse),
        (status = 201, description = "Account created from the Google profile", body = UserLoginResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Blocked", body = Error)
    ),
    tags = ["auth"],
    operation_id = "userGoogleSignIn",
    security(())
)]
#[post("/google-sign-in")]
pub async fn google_sign_in(
    state: web::Data<HttpState>,
    session: RefreshSession,
    payload: web::Json<GoogleSignInBody>,
) -> ApiResult<HttpResponse> {
    let GoogleSignInBody {
        email,
        display_name,
        photo_url,
        uid,
    } = payload.into_inner();
    let (signed, created) = state
        .auth
        .google_sign_in(GoogleProfile {
            email,
            display_name,
            photo_url,
            uid,
        })
        .await?;
    let body = signed_in(&session, signed)?;
    Ok(if created {
        HttpResponse::Created().json(body)
    } else {
        HttpResponse::Ok().json(body)
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/user/refresh-token",
    responses(
        (status = 200, description = "New access token", body = AccessTokenResponse),
        (status = 401, description = "No refresh cookie or account gone", body = Error),
        (status = 403, description = "Refresh token invalid or account blocked", body = Error)
    ),
    tags = ["auth"],
    operation_id = "userRefreshToken",
    security(())
)]
#[get("/refresh-token")]
pub async fn refresh_token(
    state: web::Data<HttpState>,
    session: RefreshSession,
) -> ApiResult<web::Json<AccessTokenResponse>> {
    let refresh = session.require_refresh_token()?;
    let access_token = state.auth.refresh_user(&refresh).await?;
    Ok(web::Json(AccessTokenResponse { access_token }))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/user/reset-password",
    request_body = ResetPasswordBody,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Reset token invalid or expired", body = Error),
        (status = 404, description = "Unknown account", body = Error)
    ),
    tags = ["auth"],
    operation_id = "userResetPassword",
    security(())
)]
#[post("/reset-password")]
pub async fn reset_password(
    state: web::Data<HttpState>,
    payload: web::Json<ResetPasswordBody>,
) -> ApiResult<web::Json<MessageResponse>> {
    state
        .auth
        .reset_password(
            &payload.reset_token,
            &payload.new_password,
            &payload.confirm_password,
        )
        .await?;
    Ok(web::Json(MessageResponse::new("password updated")))
}

/// Drop the refresh cookie. Without one there is nothing to do.
#[utoipa::path(
    delete,
    path = "/api/v1/auth/user/logout",
    responses(
        (status = 200, description = "Signed out", body = MessageResponse),
        (status = 204, description = "No session to end")
    ),
    tags = ["auth"],
    operation_id = "userLogout",
    security(())
)]
#[delete("/logout")]
pub async fn logout(session: RefreshSession) -> ApiResult<HttpResponse> {
    end_session(&session)
}

/// Shared by the user and admin logout routes.
pub(crate) fn end_session(session: &RefreshSession) -> ApiResult<HttpResponse> {
    if session.refresh_token()?.is_none() {
        return Ok(HttpResponse::NoContent().finish());
    }
    session.clear();
    Ok(HttpResponse::Ok().json(MessageResponse::new("signed out")))
}

#[cfg(test)]
#[path = "user_auth_tests.rs"]
mod tests;
