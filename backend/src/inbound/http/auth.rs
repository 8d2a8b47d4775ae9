//! Bearer-token guards.
//!
//! [`CurrentUser`] and [`CurrentAdmin`] are extractors: a handler that takes
//! one only runs for a valid access token of the matching role. Every failure
//! (missing or malformed header, bad or expired token, wrong role, blocked or
//! deleted account) is answered with 403.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::debug;

use super::state::HttpState;
use crate::domain::Error;
use crate::domain::user::{Admin, User};

fn denied() -> Error {
    Error::forbidden("access denied")
}

/// Pull the token out of `Authorization: Bearer <token>`.
pub(crate) fn bearer_token(req: &HttpRequest) -> Result<String, Error> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(denied)?
        .to_str()
        .map_err(|_| denied())?;
    let (scheme, token) = header.split_once(' ').ok_or_else(denied)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(denied());
    }
    Ok(token.to_owned())
}

fn state_of(req: &HttpRequest) -> Result<web::Data<HttpState>, Error> {
    req.app_data::<web::Data<HttpState>>()
        .cloned()
        .ok_or_else(|| Error::internal("HTTP state is not registered"))
}

/// The signed-in customer.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequest for CurrentUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let prepared = state_of(req).and_then(|state| Ok((state, bearer_token(req)?)));
        Box::pin(async move {
            let (state, token) = prepared.inspect_err(|err| debug!(error = %err, "user guard"))?;
            state.auth.authorize_user(&token).await.map(CurrentUser)
        })
    }
}

/// The signed-in administrator.
#[derive(Debug, Clone)]
pub struct CurrentAdmin(pub Admin);

impl FromRequest for CurrentAdmin {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let prepared = state_of(req).and_then(|state| Ok((state, bearer_token(req)?)));
        Box::pin(async move {
            let (state, token) = prepared.inspect_err(|err| debug!(error = %err, "admin guard"))?;
            state.auth.authorize_admin(&token).await.map(CurrentAdmin)
        })
    }
}
