use crate::{AppState, handlers, paths::Route};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Pages of the admin area, guarded by the ADMIN role through the `/admin/` rule.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/admin
        // Landing page for administrators; shows the user listing.
        .route(Route::AdminAdmin.path(), get(handlers::admin_admin))
        .route(Route::AdminOther.path(), get(handlers::admin_other))
}
