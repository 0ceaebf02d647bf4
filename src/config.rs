use std::env;

use crate::access::DefaultAccess;

/// AppConfig
///
/// The whole runtime configuration. Loaded once at startup, immutable afterwards, and
/// pulled into handlers through `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format, cookie flags and secret handling.
    pub env: Env,
    // Address the HTTP listener binds to.
    pub bind_addr: String,
    // Policy for paths no access rule matches.
    pub default_access: DefaultAccess,
    // When true, GET /api/users is reachable without logging in.
    pub public_user_listing: bool,
    // Session lifetime in seconds.
    pub session_ttl_secs: i64,
    // Adds the `Secure` attribute to the session cookie.
    pub secure_cookies: bool,
    // Password of the seeded `myuser` account.
    pub seed_user_password: String,
    // Password of the seeded `admin` account.
    pub seed_admin_password: String,
}

/// Env
///
/// Runtime context. `Production` hardens cookies and refuses to start with default
/// account passwords.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_SESSION_TTL_SECS: i64 = 3600;
pub const LOCAL_USER_PASSWORD: &str = "mypassword";
pub const LOCAL_ADMIN_PASSWORD: &str = "adminpwd";

impl Default for AppConfig {
    /// default
    ///
    /// Local settings with the well-known seed passwords. Used by tests to build state
    /// without touching the environment.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            default_access: DefaultAccess::PermitAll,
            public_user_listing: false,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            secure_cookies: false,
            seed_user_password: LOCAL_USER_PASSWORD.to_string(),
            seed_admin_password: LOCAL_ADMIN_PASSWORD.to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Panics
    /// Panics in production when a seed password is missing, and in any environment when
    /// a variable is present but malformed. The service must not start half-configured.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let default_access = match env::var("DEFAULT_ACCESS") {
            Ok(raw) => raw
                .parse()
                .unwrap_or_else(|e| panic!("FATAL: DEFAULT_ACCESS is invalid: {e}")),
            Err(_) => DefaultAccess::PermitAll,
        };

        let public_user_listing = match env::var("PUBLIC_USER_LISTING") {
            Ok(raw) => parse_flag(&raw)
                .unwrap_or_else(|| panic!("FATAL: PUBLIC_USER_LISTING must be true or false")),
            Err(_) => false,
        };

        let session_ttl_secs = match env::var("SESSION_TTL_SECS") {
            Ok(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|secs| *secs > 0)
                .unwrap_or_else(|| panic!("FATAL: SESSION_TTL_SECS must be a positive integer")),
            Err(_) => DEFAULT_SESSION_TTL_SECS,
        };

        match env {
            Env::Local => Self {
                env: Env::Local,
                bind_addr,
                default_access,
                public_user_listing,
                session_ttl_secs,
                secure_cookies: false,
                seed_user_password: env::var("SEED_USER_PASSWORD")
                    .unwrap_or_else(|_| LOCAL_USER_PASSWORD.to_string()),
                seed_admin_password: env::var("SEED_ADMIN_PASSWORD")
                    .unwrap_or_else(|_| LOCAL_ADMIN_PASSWORD.to_string()),
            },
            Env::Production => Self {
                env: Env::Production,
                bind_addr,
                default_access,
                public_user_listing,
                session_ttl_secs,
                secure_cookies: true,
                seed_user_password: env::var("SEED_USER_PASSWORD")
                    .expect("FATAL: SEED_USER_PASSWORD must be set in production."),
                seed_admin_password: env::var("SEED_ADMIN_PASSWORD")
                    .expect("FATAL: SEED_ADMIN_PASSWORD must be set in production."),
            },
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
