use crate::{AppState, handlers, paths::Route};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Pages and endpoints every visitor may reach, including the login surface.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route(Route::Health.path(), get(|| async { "ok" }))
        .route(Route::Root.path(), get(handlers::index))
        .route(Route::Other.path(), get(handlers::other))
        // GET|POST /login
        // Form display and credential submission.
        .route(
            Route::Login.path(),
            get(handlers::login_page).post(handlers::login_submit),
        )
        // GET|POST /logout
        // Both verbs end the session, so plain links work as well as forms.
        .route(
            Route::Logout.path(),
            get(handlers::logout).post(handlers::logout),
        )
        // Older entry points kept as permanent redirects.
        .route(Route::LegacyMain.path(), get(handlers::legacy_main))
        .route(Route::LegacyAdmin.path(), get(handlers::legacy_admin))
}
