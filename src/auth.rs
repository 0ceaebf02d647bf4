use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, HeaderValue, header, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use std::convert::Infallible;

use crate::{
    config::AppConfig,
    errors::{AppError, AppResult},
    models::Principal,
    paths::Route,
    redirect::RedirectResolver,
    session::{SessionCookie, SessionState},
};

/// Message stored in the session after a failed login and shown by the login page.
pub const BAD_CREDENTIALS: &str = "Bad credentials";

/// AuthUser
///
/// Extractor for handlers that require a logged-in principal holding at least one
/// recognized role. Anything else is answered with a redirect to the login form.
///
/// The access middleware stores the session principal in the request extensions; when
/// the extractor runs without that middleware it falls back to a session lookup.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    SessionState: FromRef<S>,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let principal = match parts.extensions.get::<Principal>() {
            Some(principal) => Some(principal.clone()),
            None => {
                let sessions = SessionState::from_ref(state);
                current_principal(&parts.headers, &sessions).await
            }
        };

        principal
            .filter(Principal::is_authenticated)
            .map(AuthUser)
            .ok_or_else(|| Redirect::to(Route::Login.path()))
    }
}

/// CurrentUser
///
/// Optional counterpart of [`AuthUser`] for pages that render for everyone but adapt to
/// the visitor (navigation links, greeting). Never rejects.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<Principal>);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    SessionState: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<Principal>() {
            return Ok(CurrentUser(Some(principal.clone())));
        }
        let sessions = SessionState::from_ref(state);
        Ok(CurrentUser(current_principal(&parts.headers, &sessions).await))
    }
}

/// current_principal
///
/// Resolves the principal attached to the request's session cookie, if any.
pub async fn current_principal(headers: &HeaderMap, sessions: &SessionState) -> Option<Principal> {
    let cookie = SessionCookie::from_headers(headers)?;
    sessions.get(&cookie.session_id).await?.principal
}

/// complete_login
///
/// Runs after credentials have been verified: resolves the landing page, replaces the
/// caller's previous session (dropping any authentication-failure marker it carried)
/// with a fresh authenticated one, and redirects.
///
/// # Errors
/// `AppError::UnresolvableRedirect` when the principal holds no role with a landing page.
/// No session is created in that case.
pub async fn complete_login(
    sessions: &SessionState,
    resolver: &RedirectResolver,
    config: &AppConfig,
    previous: Option<SessionCookie>,
    principal: Principal,
) -> AppResult<Response> {
    let target = resolver
        .resolve(principal.authorities.iter().map(String::as_str))?
        .to_string();

    if let Some(cookie) = previous {
        sessions.remove(&cookie.session_id).await;
    }

    let username = principal.username.clone();
    let session = sessions.create(Some(principal)).await;
    tracing::info!(username = %username, target = %target, "login succeeded");

    let cookie = SessionCookie::new(session.id)
        .to_cookie_header(config.secure_cookies, config.session_ttl_secs);
    redirect_with_cookie(&target, &cookie)
}

/// record_login_failure
///
/// Stores the failure marker in the caller's session (creating an anonymous one when
/// needed) and sends the client back to the login form.
pub async fn record_login_failure(
    sessions: &SessionState,
    config: &AppConfig,
    previous: Option<SessionCookie>,
    username: &str,
) -> AppResult<Response> {
    let existing = match previous {
        Some(cookie) => sessions.get(&cookie.session_id).await,
        None => None,
    };
    let mut session = match existing {
        Some(session) => session,
        None => sessions.create(None).await,
    };

    session.auth_failure = Some(BAD_CREDENTIALS.to_string());
    sessions.save(session.clone()).await;
    tracing::warn!(username = %username, "login failed");

    let cookie = SessionCookie::new(session.id)
        .to_cookie_header(config.secure_cookies, config.session_ttl_secs);
    redirect_with_cookie(&format!("{}?error", Route::Login.path()), &cookie)
}

/// end_session
///
/// Deletes the caller's session and expires the cookie.
pub async fn end_session(sessions: &SessionState, headers: &HeaderMap) -> AppResult<Response> {
    if let Some(cookie) = SessionCookie::from_headers(headers) {
        if sessions.remove(&cookie.session_id).await {
            tracing::info!("session ended");
        }
    }
    redirect_with_cookie(Route::Root.path(), &SessionCookie::delete_cookie_header())
}

fn redirect_with_cookie(target: &str, cookie: &str) -> AppResult<Response> {
    let value = HeaderValue::from_str(cookie)
        .map_err(|e| AppError::Session(format!("unencodable cookie: {e}")))?;
    let mut response = Redirect::to(target).into_response();
    response.headers_mut().insert(header::SET_COOKIE, value);
    Ok(response)
}
