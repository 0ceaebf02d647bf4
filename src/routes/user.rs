use crate::{AppState, handlers, paths::Route};
use axum::{Router, routing::get};

/// User Router Module
///
/// Pages of the user area. Every path here lives under `/user/`, which the access table
/// guards with the USER role; the handlers additionally take `AuthUser`.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        // GET /user/main
        // Landing page for principals whose best role is USER.
        .route(Route::UserMain.path(), get(handlers::user_main))
        .route(Route::UserOther.path(), get(handlers::user_other))
}
