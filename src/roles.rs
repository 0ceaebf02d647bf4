use std::{fmt, str::FromStr};
use thiserror::Error;

/// Prefix shared by every authority string.
pub const AUTHORITY_PREFIX: &str = "ROLE_";

/// Role
///
/// The closed set of roles the portal knows about. Variants are declared from the least
/// to the most privileged, so the derived ordering doubles as the role hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    User,
    Admin,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl Role {
    /// Every declared role, least privileged first.
    pub const ALL: [Role; 2] = [Role::User, Role::Admin];

    pub const fn name(self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    /// authority
    ///
    /// The externally visible form of the role, always `ROLE_<NAME>`.
    pub const fn authority(self) -> &'static str {
        match self {
            Role::User => "ROLE_USER",
            Role::Admin => "ROLE_ADMIN",
        }
    }

    /// Maps an authority string back to its role. Only exact matches are accepted.
    pub fn from_authority(authority: &str) -> Option<Role> {
        Self::ALL
            .into_iter()
            .find(|role| role.authority() == authority)
    }

    /// True when holding `self` satisfies a requirement for `required`.
    pub fn grants(self, required: Role) -> bool {
        self >= required
    }
}

/// Free-function form of [`Role::authority`].
pub fn authority_of(role: Role) -> &'static str {
    role.authority()
}

/// is_authority
///
/// Returns true iff `candidate` is the authority string of a declared role.
pub fn is_authority(candidate: &str) -> bool {
    Role::from_authority(candidate).is_some()
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    /// Parses a bare role name (`user`, `ADMIN`), ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}
