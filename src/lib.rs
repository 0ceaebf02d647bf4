use axum::{
    Router,
    extract::{FromRef, Request, State},
    http::{HeaderName, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod access;
pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod paths;
pub mod redirect;
pub mod repository;
pub mod roles;
pub mod session;

// Router segregation (public, user area, admin area, API).
pub mod routes;
use routes::{admin, api, public, user};

use access::{AccessDecision, AccessTable};
use paths::Route;

// --- Public Re-exports ---

pub use config::AppConfig;
pub use errors::{AppError, AppResult};
pub use redirect::RedirectResolver;
pub use repository::{InMemoryUserRepository, RepositoryState};
pub use session::{InMemorySessionStore, SessionState};

/// ApiDoc
///
/// OpenAPI document for the JSON surface, served at `/api-docs/openapi.json` and browsable
/// through Swagger UI.
#[derive(OpenApi)]
#[openapi(
    paths(handlers::list_users),
    components(schemas(models::UserData)),
    tags(
        (name = "users", description = "Operations regarding users")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// Everything a request may need, built once at startup. Only the session store holds
/// mutable state; the directory and both rule tables are read-only.
#[derive(Clone)]
pub struct AppState {
    pub repo: RepositoryState,
    pub sessions: SessionState,
    pub resolver: Arc<RedirectResolver>,
    pub access: Arc<AccessTable>,
    pub config: AppConfig,
}

impl AppState {
    /// with_sessions
    ///
    /// Builds the directory and rule tables from `config` around an existing session
    /// store.
    ///
    /// # Errors
    /// `AppError::Directory` when the seed accounts are inconsistent.
    pub fn with_sessions(config: AppConfig, sessions: SessionState) -> AppResult<Self> {
        let repo = InMemoryUserRepository::seeded(
            &config.seed_user_password,
            &config.seed_admin_password,
        )?;
        let access = AccessTable::standard(&config);

        if config.public_user_listing {
            tracing::warn!(
                path = Route::ApiUsers.path(),
                "user listing is exposed without authentication"
            );
        }

        Ok(Self {
            repo: Arc::new(repo) as RepositoryState,
            sessions,
            resolver: Arc::new(RedirectResolver::by_role()),
            access: Arc::new(access),
            config,
        })
    }

    /// Same as [`AppState::with_sessions`] with a fresh in-memory session store.
    pub fn from_config(config: AppConfig) -> AppResult<Self> {
        let sessions = Arc::new(InMemorySessionStore::with_ttl_secs(config.session_ttl_secs));
        Self::with_sessions(config, sessions as SessionState)
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for SessionState {
    fn from_ref(app_state: &AppState) -> SessionState {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// access_middleware
///
/// Evaluates every request against the access table. Anonymous visitors of a guarded
/// prefix are sent to the login form, principals lacking the role get 403. Permitted
/// requests carry the session principal in their extensions for the extractors.
async fn access_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let principal = auth::current_principal(request.headers(), &state.sessions).await;
    let path = request.uri().path().to_owned();

    match state.access.decide(&path, principal.as_ref()) {
        AccessDecision::Permit => {
            if let Some(principal) = principal {
                request.extensions_mut().insert(principal);
            }
            next.run(request).await
        }
        AccessDecision::Authenticate => {
            tracing::debug!(path = %path, "login required");
            Redirect::to(Route::Login.path()).into_response()
        }
        AccessDecision::Deny => {
            let username = principal.map(|p| p.username).unwrap_or_default();
            tracing::warn!(path = %path, username = %username, "access denied");
            StatusCode::FORBIDDEN.into_response()
        }
    }
}

/// create_router
///
/// Assembles the routers, the access middleware and the observability layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(user::user_routes())
        .merge(admin::admin_routes())
        .merge(api::api_routes())
        .fallback(handlers::not_found)
        // `layer`, not `route_layer`: unmatched paths under a guarded prefix are checked too.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            access_middleware,
        ))
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(
                    x_request_id.clone(),
                    MakeRequestUuid,
                ))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for one request, correlated by its `x-request-id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
