//! Refresh-token cookie sessions.
//!
//! Refresh tokens never appear in response bodies. They live in an encrypted,
//! HTTP-only cookie session: `jwtUser` scoped to the user auth routes and
//! `jwtAdmin` scoped to the admin ones.

use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::storage::CookieSessionStore;
use actix_session::{Session, SessionMiddleware};
use actix_web::cookie::time::Duration;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use super::session_config::SessionSettings;
use crate::domain::Error;

pub(crate) const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Cookie carrying a customer's refresh token.
pub const USER_REFRESH_COOKIE: &str = "jwtUser";
/// Cookie carrying an administrator's refresh token.
pub const ADMIN_REFRESH_COOKIE: &str = "jwtAdmin";

/// Matches the default refresh-token lifetime.
const REFRESH_COOKIE_TTL_DAYS: i64 = 7;

/// Private, HTTP-only cookie session named `cookie_name` and sent only to
/// requests under `path`.
pub fn refresh_cookie_middleware(
    settings: &SessionSettings,
    cookie_name: &str,
    path: &str,
) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), settings.key.clone())
        .cookie_name(cookie_name.to_owned())
        .cookie_path(path.to_owned())
        .cookie_secure(settings.cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(settings.same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(Duration::days(REFRESH_COOKIE_TTL_DAYS)),
        )
        .build()
}

/// Handler-facing view of the refresh cookie.
#[derive(Clone)]
pub struct RefreshSession(Session);

impl RefreshSession {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Store the refresh token, replacing any previous one.
    pub fn persist(&self, refresh_token: &str) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(REFRESH_TOKEN_KEY, refresh_token)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// The stored refresh token, if the cookie holds one.
    pub fn refresh_token(&self) -> Result<Option<String>, Error> {
        self.0
            .get::<String>(REFRESH_TOKEN_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))
    }

    /// Require a refresh token or answer `401 Unauthorized`.
    pub fn require_refresh_token(&self) -> Result<String, Error> {
        self.refresh_token()?
            .ok_or_else(|| Error::unauthorized("refresh token is missing"))
    }

    /// Drop the cookie.
    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for RefreshSession {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(RefreshSession::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::test_session_middleware;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    #[actix_web::test]
    async fn stores_reads_and_clears_the_token() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware(USER_REFRESH_COOKIE))
                .route(
                    "/set",
                    web::get().to(|session: RefreshSession| async move {
                        session.persist("refresh.jwt")?;
                        Ok::<_, Error>(HttpResponse::Ok().finish())
                    }),
                )
                .route(
                    "/get",
                    web::get().to(|session: RefreshSession| async move {
                        let token = session.require_refresh_token()?;
                        Ok::<_, Error>(HttpResponse::Ok().body(token))
                    }),
                )
                .route(
                    "/clear",
                    web::get().to(|session: RefreshSession| async move {
                        session.clear();
                        HttpResponse::Ok().finish()
                    }),
                ),
        )
        .await;

        let set = test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        let cookie = set
            .response()
            .cookies()
            .find(|cookie| cookie.name() == USER_REFRESH_COOKIE)
            .expect("refresh cookie set")
            .into_owned();
        assert!(cookie.http_only().unwrap_or(false));

        let get = test::call_service(
            &app,
            test::TestRequest::get().uri("/get").cookie(cookie.clone()).to_request(),
        )
        .await;
        assert_eq!(get.status(), StatusCode::OK);
        assert_eq!(test::read_body(get).await, "refresh.jwt");

        let cleared = test::call_service(
            &app,
            test::TestRequest::get().uri("/clear").cookie(cookie).to_request(),
        )
        .await;
        let removal = cleared
            .response()
            .cookies()
            .find(|cookie| cookie.name() == USER_REFRESH_COOKIE)
            .expect("removal cookie");
        assert_eq!(removal.value(), "");
    }

    #[actix_web::test]
    async fn missing_cookie_is_unauthorised() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware(USER_REFRESH_COOKIE))
                .route(
                    "/get",
                    web::get().to(|session: RefreshSession| async move {
                        session.require_refresh_token()?;
                        Ok::<_, Error>(HttpResponse::Ok().finish())
                    }),
                ),
        )
        .await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/get").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn refresh_cookie_is_scoped_to_its_path() {
        use actix_web::cookie::{Key, SameSite};

        let settings = SessionSettings {
            key: Key::generate(),
            cookie_secure: true,
            same_site: SameSite::Strict,
        };
        let app = test::init_service(
            App::new().service(
                web::scope("/api/v1/auth/admin")
                    .wrap(refresh_cookie_middleware(
                        &settings,
                        ADMIN_REFRESH_COOKIE,
                        "/api/v1/auth/admin",
                    ))
                    .route(
                        "/login",
                        web::post().to(|session: RefreshSession| async move {
                            session.persist("admin.jwt")?;
                            Ok::<_, Error>(HttpResponse::Ok().finish())
                        }),
                    ),
            ),
        )
        .await;
        let res = test::call_service(
            &app,
            test::TestRequest::post().uri("/api/v1/auth/admin/login").to_request(),
        )
        .await;
        let cookie = res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == ADMIN_REFRESH_COOKIE)
            .expect("admin cookie")
            .into_owned();
        assert_eq!(cookie.path(), Some("/api/v1/auth/admin"));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.max_age(), Some(Duration::days(REFRESH_COOKIE_TTL_DAYS)));
        assert_ne!(cookie.value(), "admin.jwt");
    }
}
