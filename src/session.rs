use async_trait::async_trait;
use axum::http::{HeaderMap, header};
use chrono::{DateTime, Duration, Utc};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::Principal;

pub const SESSION_COOKIE_NAME: &str = "portal_session";

/// Session
///
/// Server-side state behind the session cookie. An anonymous session exists only to
/// carry the authentication-failure marker between a failed login and the login page.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub principal: Option<Principal>,
    pub auth_failure: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    fn new(principal: Option<Principal>) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            principal,
            auth_failure: None,
            created_at: Utc::now(),
        }
    }
}

/// SessionStore
///
/// Contract for session persistence. The in-memory store is the only implementation the
/// portal needs, but handlers depend on the trait so tests can observe store traffic.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Creates and stores a new session with a fresh random id.
    async fn create(&self, principal: Option<Principal>) -> Session;

    /// Returns a live session. Expired sessions are evicted and reported as missing.
    async fn get(&self, id: &str) -> Option<Session>;

    /// Overwrites an existing session. Unknown ids are ignored.
    async fn save(&self, session: Session);

    /// Deletes a session, returning whether it existed.
    async fn remove(&self, id: &str) -> bool;
}

/// SessionState
///
/// The concrete type used to share the session store across the application state.
pub type SessionState = Arc<dyn SessionStore>;

/// InMemorySessionStore
///
/// Sessions in a `HashMap` behind an async `RwLock`; the only mutable state in the
/// process.
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    ttl: Duration,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn with_ttl_secs(secs: i64) -> Self {
        Self::new(Duration::seconds(secs))
    }

    fn is_expired(&self, session: &Session, now: DateTime<Utc>) -> bool {
        now - session.created_at >= self.ttl
    }

    /// Drops every expired session, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !self.is_expired(session, now));
        before - sessions.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, principal: Option<Principal>) -> Session {
        let session = Session::new(principal);
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());
        session
    }

    async fn get(&self, id: &str) -> Option<Session> {
        let now = Utc::now();
        {
            let sessions = self.sessions.read().await;
            match sessions.get(id) {
                Some(session) if !self.is_expired(session, now) => return Some(session.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        // Expired: evict under the write lock.
        self.sessions.write().await.remove(id);
        tracing::debug!(session_id = %id, "evicted expired session");
        None
    }

    async fn save(&self, session: Session) {
        let mut sessions = self.sessions.write().await;
        if let Some(slot) = sessions.get_mut(&session.id) {
            *slot = session;
        }
    }

    async fn remove(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }
}

/// SessionCookie
///
/// Reads and writes the `portal_session` cookie.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionCookie {
    pub session_id: String,
}

impl SessionCookie {
    pub fn new(session_id: String) -> Self {
        Self { session_id }
    }

    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|raw| raw.split(';'))
            .map(str::trim)
            .find_map(|cookie| {
                cookie
                    .strip_prefix(SESSION_COOKIE_NAME)
                    .and_then(|rest| rest.strip_prefix('='))
                    .filter(|value| !value.is_empty())
                    .map(|value| Self::new(value.to_string()))
            })
    }

    pub fn to_cookie_header(&self, secure: bool, max_age_secs: i64) -> String {
        format!(
            "{}={}; HttpOnly; {}SameSite=Lax; Path=/; Max-Age={}",
            SESSION_COOKIE_NAME,
            self.session_id,
            if secure { "Secure; " } else { "" },
            max_age_secs
        )
    }

    pub fn delete_cookie_header() -> String {
        format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", SESSION_COOKIE_NAME)
    }
}
