use axum::{
    Form, Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, Redirect, Response},
};
use serde::Deserialize;

use crate::{
    AppState,
    auth::{self, AuthUser, CurrentUser},
    errors::AppResult,
    models::{LoginForm, Principal, UserData},
    paths::Route,
    repository::RepositoryState,
    session::{SessionCookie, SessionState},
};

// --- Page Rendering ---

/// Escapes the five HTML-significant characters.
pub fn html_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// render_page
///
/// Wraps `body` in the shared layout. The navigation offers "Logout" to visitors whose
/// session holds a recognized role and "Login" to everyone else.
fn render_page(title: &str, principal: Option<&Principal>, body: &str) -> Html<String> {
    let session_link = match principal.filter(|p| p.is_authenticated()) {
        Some(p) => format!(
            r#"<span>Signed in as <strong>{}</strong></span> <a href="{}">Logout</a>"#,
            html_escape(&p.username),
            Route::Logout.path()
        ),
        None => format!(r#"<a href="{}">Login</a>"#, Route::Login.path()),
    };

    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title}</title>
    <style>
        body {{ font-family: Arial, sans-serif; max-width: 720px; margin: 40px auto; padding: 0 20px; }}
        nav a {{ margin-right: 12px; }}
        table {{ border-collapse: collapse; margin-top: 16px; }}
        td, th {{ border: 1px solid #ccc; padding: 6px 12px; text-align: left; }}
        .error {{ color: #b00020; }}
    </style>
</head>
<body>
    <nav>
        <a href="{root}">Home</a>
        <a href="{other}">Other</a>
        <a href="{user_main}">User</a>
        <a href="{admin}">Admin</a>
        {session_link}
    </nav>
    <h1>{title}</h1>
    {body}
</body>
</html>"#,
        title = html_escape(title),
        root = Route::Root.path(),
        other = Route::Other.path(),
        user_main = Route::UserMain.path(),
        admin = Route::AdminAdmin.path(),
    ))
}

// --- Public Views ---

/// [Public Route] Landing page.
pub async fn index(CurrentUser(principal): CurrentUser) -> Html<String> {
    render_page(
        "Home",
        principal.as_ref(),
        "<p>Welcome. Log in to reach the user and admin areas.</p>",
    )
}

/// [Public Route] A second unprotected page.
pub async fn other(CurrentUser(principal): CurrentUser) -> Html<String> {
    render_page("Other", principal.as_ref(), "<p>Another public page.</p>")
}

// --- User Area Views ---

pub async fn user_main(AuthUser(principal): AuthUser) -> Html<String> {
    let body = format!(
        r#"<p>Hello {}, this is the user area.</p><p><a href="{}">More</a></p>"#,
        html_escape(&principal.username),
        Route::UserOther.path()
    );
    render_page("User Main", Some(&principal), &body)
}

pub async fn user_other(AuthUser(principal): AuthUser) -> Html<String> {
    render_page(
        "User Other",
        Some(&principal),
        "<p>Another page of the user area.</p>",
    )
}

// --- Admin Area Views ---

/// [Admin Route] Admin landing page. The users table is filled client-side from
/// GET /api/users.
pub async fn admin_admin(AuthUser(principal): AuthUser) -> Html<String> {
    let body = format!(
        r#"<p>Configured users:</p>
    <table>
        <thead><tr><th>Username</th><th>Authorities</th></tr></thead>
        <tbody id="tbl"></tbody>
    </table>
    <p><a href="{other}">More</a></p>
    <script>
        const tBody = document.getElementById("tbl");
        const cell = text => {{ const td = document.createElement("td"); td.textContent = text; return td; }};
        fetch("{api}")
            .then(response => {{ if (!response.ok) throw new Error(response.status); return response.json(); }})
            .then(users => users.forEach(user => {{
                const tr = document.createElement("tr");
                tr.append(cell(user.username), cell(user.authorities));
                tBody.append(tr);
            }}))
            .catch(() => {{
                const tr = document.createElement("tr");
                const td = cell("ERROR");
                td.colSpan = 2;
                tr.append(td);
                tBody.append(tr);
            }});
    </script>"#,
        other = Route::AdminOther.path(),
        api = Route::ApiUsers.path(),
    );
    render_page("Admin", Some(&principal), &body)
}

pub async fn admin_other(AuthUser(principal): AuthUser) -> Html<String> {
    render_page(
        "Admin Other",
        Some(&principal),
        "<p>Another page of the admin area.</p>",
    )
}

/// Fallback for unknown paths.
pub async fn not_found(CurrentUser(principal): CurrentUser) -> (StatusCode, Html<String>) {
    (
        StatusCode::NOT_FOUND,
        render_page("Not Found", principal.as_ref(), "<p>No such page.</p>"),
    )
}

// --- Legacy Aliases ---

pub async fn legacy_main() -> Redirect {
    Redirect::permanent(Route::UserMain.path())
}

pub async fn legacy_admin() -> Redirect {
    Redirect::permanent(Route::AdminAdmin.path())
}

// --- Login / Logout ---

/// LoginQuery
///
/// `?error` is appended by the failed-login redirect.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
}

/// login_page
///
/// [Public Route] Renders the login form. A failure marker left in the session by the
/// previous attempt is shown above the form.
pub async fn login_page(
    State(sessions): State<SessionState>,
    CurrentUser(principal): CurrentUser,
    Query(query): Query<LoginQuery>,
    headers: HeaderMap,
) -> Html<String> {
    let marker = match SessionCookie::from_headers(&headers) {
        Some(cookie) => sessions
            .get(&cookie.session_id)
            .await
            .and_then(|session| session.auth_failure),
        None => None,
    };
    let failure = marker.or_else(|| query.error.map(|_| auth::BAD_CREDENTIALS.to_string()));

    let error_html = failure
        .map(|message| format!(r#"<p class="error">{}</p>"#, html_escape(&message)))
        .unwrap_or_default();

    let body = format!(
        r#"{error_html}
    <form method="POST" action="{action}">
        <p><label>Username <input type="text" name="username" required autofocus></label></p>
        <p><label>Password <input type="password" name="password" required></label></p>
        <button type="submit">Sign in</button>
    </form>"#,
        action = Route::Login.path(),
    );
    render_page("Login", principal.as_ref(), &body)
}

/// login_submit
///
/// [Public Route] Verifies the posted credentials. Success redirects to the landing page
/// of the principal's most privileged role; failure returns to the form.
pub async fn login_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let previous = SessionCookie::from_headers(&headers);

    match state.repo.authenticate(&form.username, &form.password).await? {
        Some(principal) => {
            auth::complete_login(
                &state.sessions,
                &state.resolver,
                &state.config,
                previous,
                principal,
            )
            .await
        }
        None => {
            auth::record_login_failure(&state.sessions, &state.config, previous, &form.username)
                .await
        }
    }
}

/// logout
///
/// [Public Route] Ends the session and returns to the landing page.
pub async fn logout(
    State(sessions): State<SessionState>,
    headers: HeaderMap,
) -> AppResult<Response> {
    auth::end_session(&sessions, &headers).await
}

// --- API ---

/// list_users
///
/// [API Route] Lists every configured user with a comma-joined authority string.
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    responses(
        (status = 200, description = "Returns all users", body = [UserData]),
        (status = 303, description = "Not logged in; redirected to the login form")
    )
)]
pub async fn list_users(State(repo): State<RepositoryState>) -> AppResult<Json<Vec<UserData>>> {
    let users = repo.list_users().await?;
    Ok(Json(users))
}
