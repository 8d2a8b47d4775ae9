//! Administrator authentication handlers.
//!
//! ```text
//! POST   /api/v1/auth/admin/login
//! GET    /api/v1/auth/admin/refresh-token
//! DELETE /api/v1/auth/admin/logout
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::Serialize;

use crate::domain::Error;
use crate::domain::user::AdminProfile;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{AccessTokenResponse, MessageResponse};
use crate::inbound::http::session::RefreshSession;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::user_auth::{CredentialsBody, end_session};

/// Signed-in administrator.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminLoginResponse {
    pub admin: AdminProfile,
    pub access_token: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/admin/login",
    request_body = CredentialsBody,
    responses(
        (status = 200, description = "Signed in", body = AdminLoginResponse,
            headers(("Set-Cookie" = String, description = "jwtAdmin refresh cookie"))),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["auth"],
    operation_id = "adminLogin",
    security(())
)]
#[post("/login")]
pub async fn admin_login(
    state: web::Data<HttpState>,
    session: RefreshSession,
    payload: web::Json<CredentialsBody>,
) -> ApiResult<web::Json<AdminLoginResponse>> {
    let signed = state
        .auth
        .admin_login(&payload.email, &payload.password)
        .await?;
    session.persist(&signed.tokens.refresh_token)?;
    Ok(web::Json(AdminLoginResponse {
        admin: signed.admin,
        access_token: signed.tokens.access_token,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/admin/refresh-token",
    responses(
        (status = 200, description = "New access token", body = AccessTokenResponse),
        (status = 401, description = "No refresh cookie or account gone", body = Error),
        (status = 403, description = "Refresh token invalid", body = Error)
    ),
    tags = ["auth"],
    operation_id = "adminRefreshToken",
    security(())
)]
#[get("/refresh-token")]
pub async fn admin_refresh_token(
    state: web::Data<HttpState>,
    session: RefreshSession,
) -> ApiResult<web::Json<AccessTokenResponse>> {
    let refresh = session.require_refresh_token()?;
    let access_token = state.auth.refresh_admin(&refresh).await?;
    Ok(web::Json(AccessTokenResponse { access_token }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/auth/admin/logout",
    responses(
        (status = 200, description = "Signed out", body = MessageResponse),
        (status = 204, description = "No session to end")
    ),
    tags = ["auth"],
    operation_id = "adminLogout",
    security(())
)]
#[delete("/logout")]
pub async fn admin_logout(session: RefreshSession) -> ApiResult<HttpResponse> {
    end_session(&session)
}
