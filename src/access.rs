use std::str::FromStr;
use thiserror::Error;

use crate::{config::AppConfig, models::Principal, paths::Route, roles::Role};

/// AccessRule
///
/// Guards every path starting with `prefix`. `required_role: None` is an explicit
/// exemption: matching requests are let through even when the default policy would
/// demand a login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRule {
    pub prefix: String,
    pub required_role: Option<Role>,
}

impl AccessRule {
    pub fn require(prefix: impl Into<String>, role: Role) -> Self {
        Self {
            prefix: prefix.into(),
            required_role: Some(role),
        }
    }

    pub fn permit(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            required_role: None,
        }
    }

    fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

/// DefaultAccess
///
/// What happens to a request no rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultAccess {
    PermitAll,
    Authenticated,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("expected `permit_all` or `authenticated`, got `{0}`")]
pub struct InvalidDefaultAccess(pub String);

impl FromStr for DefaultAccess {
    type Err = InvalidDefaultAccess;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permit_all" | "permit-all" => Ok(DefaultAccess::PermitAll),
            "authenticated" => Ok(DefaultAccess::Authenticated),
            _ => Err(InvalidDefaultAccess(s.to_string())),
        }
    }
}

/// AccessDecision
///
/// Outcome of evaluating a request against the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// Serve the request.
    Permit,
    /// No usable principal; send the client to the login form.
    Authenticate,
    /// Logged in, but without the required role.
    Deny,
}

/// AccessTable
///
/// Ordered prefix rules plus a default policy. Rules are kept most specific (longest
/// prefix) first and the first match wins.
#[derive(Debug, Clone)]
pub struct AccessTable {
    rules: Vec<AccessRule>,
    default: DefaultAccess,
}

impl AccessTable {
    pub fn new(mut rules: Vec<AccessRule>, default: DefaultAccess) -> Self {
        // Stable sort keeps declaration order among equally long prefixes.
        rules.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        Self { rules, default }
    }

    /// standard
    ///
    /// The portal's rule set: the user area needs USER, the admin area needs ADMIN and
    /// the API needs USER unless the listing has been made public on purpose.
    pub fn standard(config: &AppConfig) -> Self {
        let api_rule = if config.public_user_listing {
            AccessRule::permit(Route::ApiArea.path())
        } else {
            AccessRule::require(Route::ApiArea.path(), Role::User)
        };

        Self::new(
            vec![
                // The login surface must stay reachable under the `Authenticated` default.
                AccessRule::permit(Route::Login.path()),
                AccessRule::permit(Route::Logout.path()),
                AccessRule::permit(Route::Health.path()),
                AccessRule::require(Route::UserArea.path(), Role::User),
                AccessRule::require(Route::AdminArea.path(), Role::Admin),
                api_rule,
            ],
            config.default_access,
        )
    }

    /// The first rule guarding `path`, if any.
    pub fn rule_for(&self, path: &str) -> Option<&AccessRule> {
        self.rules.iter().find(|rule| rule.matches(path))
    }

    /// decide
    ///
    /// Evaluates `path` for the given principal. A principal without any recognized role
    /// counts as anonymous.
    pub fn decide(&self, path: &str, principal: Option<&Principal>) -> AccessDecision {
        let principal = principal.filter(|p| p.is_authenticated());

        let required = match self.rule_for(path) {
            Some(rule) => rule.required_role,
            None => match self.default {
                DefaultAccess::PermitAll => None,
                DefaultAccess::Authenticated if principal.is_some() => None,
                DefaultAccess::Authenticated => return AccessDecision::Authenticate,
            },
        };

        match (required, principal) {
            (None, _) => AccessDecision::Permit,
            (Some(_), None) => AccessDecision::Authenticate,
            (Some(role), Some(p)) if p.has_role(role) => AccessDecision::Permit,
            (Some(_), Some(_)) => AccessDecision::Deny,
        }
    }

    pub fn rules(&self) -> &[AccessRule] {
        &self.rules
    }

    pub fn default_access(&self) -> DefaultAccess {
        self.default
    }
}
