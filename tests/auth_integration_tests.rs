use axum::{
    extract::FromRequestParts,
    http::{Request, StatusCode, header, request::Parts},
    response::IntoResponse,
};
use role_portal::{
    AppConfig, AppError, AppState,
    auth::{self, AuthUser, BAD_CREDENTIALS, CurrentUser},
    models::Principal,
    redirect::RedirectResolver,
    session::{SessionCookie, SessionStore},
};

// --- Helpers ---

fn test_state() -> AppState {
    AppState::from_config(AppConfig::default()).expect("default state builds")
}

fn parts_with_cookie(session_id: Option<&str>) -> Parts {
    let mut builder = Request::builder().uri("/user/main");
    if let Some(id) = session_id {
        builder = builder.header(header::COOKIE, format!("portal_session={id}"));
    }
    let (parts, _) = builder.body(()).unwrap().into_parts();
    parts
}

fn user() -> Principal {
    Principal::new("myuser", vec!["ROLE_USER".to_string()])
}

fn location(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn set_cookie_id(response: &axum::response::Response) -> String {
    let raw = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("response sets a cookie");
    raw.split(';')
        .next()
        .and_then(|pair| pair.strip_prefix("portal_session="))
        .expect("session cookie present")
        .to_string()
}

// --- Extractor Tests ---

#[tokio::test]
async fn test_auth_user_without_cookie_redirects_to_login() {
    let state = test_state();
    let mut parts = parts_with_cookie(None);

    let rejection = AuthUser::from_request_parts(&mut parts, &state)
        .await
        .expect_err("anonymous request must be rejected");
    let response = rejection.into_response();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_auth_user_with_unknown_session_redirects() {
    let state = test_state();
    let mut parts = parts_with_cookie(Some("does-not-exist"));
    assert!(AuthUser::from_request_parts(&mut parts, &state).await.is_err());
}

#[tokio::test]
async fn test_auth_user_resolves_session_principal() {
    let state = test_state();
    let session = state.sessions.create(Some(user())).await;
    let mut parts = parts_with_cookie(Some(&session.id));

    let AuthUser(principal) = AuthUser::from_request_parts(&mut parts, &state)
        .await
        .expect("session principal accepted");
    assert_eq!(principal, user());
}

#[tokio::test]
async fn test_auth_user_prefers_request_extension() {
    let state = test_state();
    let mut parts = parts_with_cookie(None);
    parts.extensions.insert(user());

    let AuthUser(principal) = AuthUser::from_request_parts(&mut parts, &state)
        .await
        .expect("extension principal accepted");
    assert_eq!(principal.username, "myuser");
}

#[tokio::test]
async fn test_auth_user_rejects_principal_without_known_role() {
    let state = test_state();
    let session = state
        .sessions
        .create(Some(Principal::new("svc", vec!["SCOPE_read".to_string()])))
        .await;
    let mut parts = parts_with_cookie(Some(&session.id));

    assert!(AuthUser::from_request_parts(&mut parts, &state).await.is_err());
}

#[tokio::test]
async fn test_current_user_is_optional() {
    let state = test_state();

    let mut anonymous = parts_with_cookie(None);
    let CurrentUser(none) = CurrentUser::from_request_parts(&mut anonymous, &state)
        .await
        .unwrap();
    assert!(none.is_none());

    let session = state.sessions.create(Some(user())).await;
    let mut known = parts_with_cookie(Some(&session.id));
    let CurrentUser(some) = CurrentUser::from_request_parts(&mut known, &state)
        .await
        .unwrap();
    assert_eq!(some, Some(user()));
}

// --- Login Flow Tests ---

#[tokio::test]
async fn test_complete_login_redirects_by_role_and_rotates_session() {
    let state = test_state();
    let mut previous = state.sessions.create(None).await;
    previous.auth_failure = Some(BAD_CREDENTIALS.to_string());
    state.sessions.save(previous.clone()).await;

    let admin = Principal::new(
        "admin",
        vec!["ROLE_ADMIN".to_string(), "ROLE_USER".to_string()],
    );
    let response = auth::complete_login(
        &state.sessions,
        &state.resolver,
        &state.config,
        Some(SessionCookie::new(previous.id.clone())),
        admin.clone(),
    )
    .await
    .expect("admin login completes");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/admin");

    // The old session and its failure marker are gone.
    assert!(state.sessions.get(&previous.id).await.is_none());

    let new_id = set_cookie_id(&response);
    assert_ne!(new_id, previous.id);
    let fresh = state.sessions.get(&new_id).await.expect("new session stored");
    assert_eq!(fresh.principal, Some(admin));
    assert_eq!(fresh.auth_failure, None);
}

#[tokio::test]
async fn test_complete_login_for_user_lands_on_user_main() {
    let state = test_state();
    let response = auth::complete_login(
        &state.sessions,
        &state.resolver,
        &state.config,
        None,
        user(),
    )
    .await
    .unwrap();
    assert_eq!(location(&response), "/user/main");
}

#[tokio::test]
async fn test_complete_login_without_known_role_fails() {
    let state = test_state();
    let previous = state.sessions.create(None).await;

    let result = auth::complete_login(
        &state.sessions,
        &RedirectResolver::by_role(),
        &state.config,
        Some(SessionCookie::new(previous.id.clone())),
        Principal::new("svc", vec!["ROLE_UNKNOWN".to_string()]),
    )
    .await;

    assert!(matches!(result, Err(AppError::UnresolvableRedirect(_))));
    // Nothing was touched.
    assert!(state.sessions.get(&previous.id).await.is_some());
}

#[tokio::test]
async fn test_record_login_failure_sets_marker() {
    let state = test_state();
    let response = auth::record_login_failure(&state.sessions, &state.config, None, "myuser")
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?error");

    let session = state.sessions.get(&set_cookie_id(&response)).await.unwrap();
    assert_eq!(session.auth_failure.as_deref(), Some(BAD_CREDENTIALS));
    assert!(session.principal.is_none());
}

#[tokio::test]
async fn test_record_login_failure_reuses_existing_session() {
    let state = test_state();
    let existing = state.sessions.create(None).await;

    let response = auth::record_login_failure(
        &state.sessions,
        &state.config,
        Some(SessionCookie::new(existing.id.clone())),
        "admin",
    )
    .await
    .unwrap();

    assert_eq!(set_cookie_id(&response), existing.id);
}

#[tokio::test]
async fn test_end_session_removes_session() {
    let state = test_state();
    let session = state.sessions.create(Some(user())).await;
    let parts = parts_with_cookie(Some(&session.id));

    let response = auth::end_session(&state.sessions, &parts.headers).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert!(state.sessions.get(&session.id).await.is_none());
    let cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.contains("Max-Age=0"));
}
