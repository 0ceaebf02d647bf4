use crate::{AppState, handlers, paths::Route};
use axum::{Router, routing::get};

/// API Router Module
///
/// JSON endpoints under `/api/`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // GET /api/users
        // Username and authorities of every configured account.
        .route(Route::ApiUsers.path(), get(handlers::list_users))
}
