/// Route
///
/// The table of logical routes served by the portal. Every path the application
/// registers, redirects to, or protects is named here exactly once, so the routers,
/// the redirect table, and the access table cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Root,
    Other,
    UserArea,
    UserMain,
    UserOther,
    AdminArea,
    AdminAdmin,
    AdminOther,
    Login,
    Logout,
    ApiArea,
    ApiUsers,
    Health,
    LegacyMain,
    LegacyAdmin,
}

impl Route {
    pub const ALL: [Route; 15] = [
        Route::Root,
        Route::Other,
        Route::UserArea,
        Route::UserMain,
        Route::UserOther,
        Route::AdminArea,
        Route::AdminAdmin,
        Route::AdminOther,
        Route::Login,
        Route::Logout,
        Route::ApiArea,
        Route::ApiUsers,
        Route::Health,
        Route::LegacyMain,
        Route::LegacyAdmin,
    ];

    pub const fn path(self) -> &'static str {
        match self {
            Route::Root => "/",
            Route::Other => "/other",
            // Area prefixes end with a slash so `/administrator` is not caught by `/admin/`.
            Route::UserArea => "/user/",
            Route::UserMain => "/user/main",
            Route::UserOther => "/user/other",
            Route::AdminArea => "/admin/",
            Route::AdminAdmin => "/admin/admin",
            Route::AdminOther => "/admin/other",
            Route::Login => "/login",
            Route::Logout => "/logout",
            Route::ApiArea => "/api/",
            Route::ApiUsers => "/api/users",
            Route::Health => "/health",
            Route::LegacyMain => "/main",
            Route::LegacyAdmin => "/admin",
        }
    }

    /// Area prefixes are matched by the access table, never routed directly.
    pub const fn is_prefix(self) -> bool {
        matches!(self, Route::UserArea | Route::AdminArea | Route::ApiArea)
    }
}
