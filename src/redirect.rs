use std::collections::{HashMap, HashSet};

use crate::{
    errors::{AppError, AppResult},
    paths::Route,
    roles::Role,
};

/// RedirectRule
///
/// Where a principal holding `authority` lands after login. Lower `priority` wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectRule {
    pub authority: String,
    pub priority: u32,
    pub target_url: String,
}

impl RedirectRule {
    pub fn new(authority: impl Into<String>, priority: u32, target_url: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
            priority,
            target_url: target_url.into(),
        }
    }
}

/// RedirectResolver
///
/// Picks the post-login landing page from the authorities of a freshly authenticated
/// principal. When several authorities match, the most privileged one (lowest priority
/// number) decides.
#[derive(Debug, Clone)]
pub struct RedirectResolver {
    rules: HashMap<String, RedirectRule>,
}

impl RedirectResolver {
    /// Builds a resolver from an explicit table. Authorities and priorities must both be
    /// unique, otherwise resolution would depend on iteration order.
    pub fn new(rules: impl IntoIterator<Item = RedirectRule>) -> AppResult<Self> {
        let mut by_authority = HashMap::new();
        let mut priorities = HashSet::new();

        for rule in rules {
            if !priorities.insert(rule.priority) {
                return Err(AppError::InvalidRedirectTable(format!(
                    "priority {} used more than once",
                    rule.priority
                )));
            }
            if by_authority.contains_key(&rule.authority) {
                return Err(AppError::InvalidRedirectTable(format!(
                    "authority {} listed more than once",
                    rule.authority
                )));
            }
            by_authority.insert(rule.authority.clone(), rule);
        }

        Ok(Self {
            rules: by_authority,
        })
    }

    /// by_role
    ///
    /// The standard table: admins land on the admin page, everyone else on the user
    /// main page.
    pub fn by_role() -> Self {
        let rules = [
            RedirectRule::new(Role::Admin.authority(), 1, Route::AdminAdmin.path()),
            RedirectRule::new(Role::User.authority(), 2, Route::UserMain.path()),
        ];
        Self {
            rules: rules
                .into_iter()
                .map(|rule| (rule.authority.clone(), rule))
                .collect(),
        }
    }

    /// resolve
    ///
    /// Returns the target of the highest-precedence rule matching any of `authorities`.
    ///
    /// # Errors
    /// `AppError::UnresolvableRedirect` when no authority has a rule.
    pub fn resolve<'a, I>(&self, authorities: I) -> AppResult<&str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let held: Vec<&str> = authorities.into_iter().collect();

        held.iter()
            .filter_map(|auth| self.rules.get(*auth))
            .min_by_key(|rule| rule.priority)
            .map(|rule| rule.target_url.as_str())
            .ok_or_else(|| {
                AppError::UnresolvableRedirect(held.iter().map(|a| a.to_string()).collect())
            })
    }

    pub fn rules(&self) -> impl Iterator<Item = &RedirectRule> {
        self.rules.values()
    }
}

impl Default for RedirectResolver {
    fn default() -> Self {
        Self::by_role()
    }
}
