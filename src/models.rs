use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::roles::{Role, is_authority};

// --- Identity ---

/// Principal
///
/// The authenticated identity attached to a session. Authorities are kept as strings
/// because that is the form the redirect and access tables are keyed by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub authorities: Vec<String>,
}

impl Principal {
    pub fn new(username: impl Into<String>, authorities: Vec<String>) -> Self {
        Self {
            username: username.into(),
            authorities,
        }
    }

    /// True when at least one authority belongs to a declared role. A principal that
    /// only carries foreign authorities is treated as anonymous by the views and the
    /// `Authenticated` default policy.
    pub fn is_authenticated(&self) -> bool {
        self.authorities.iter().any(|auth| is_authority(auth))
    }

    /// Roles recognized among the authorities.
    pub fn roles(&self) -> impl Iterator<Item = Role> + '_ {
        self.authorities
            .iter()
            .filter_map(|auth| Role::from_authority(auth))
    }

    /// True when any held role satisfies `required`.
    pub fn has_role(&self, required: Role) -> bool {
        self.roles().any(|role| role.grants(required))
    }
}

// --- Output Schemas ---

/// UserData
///
/// One entry of the user listing (GET /api/users). `authorities` is a single
/// comma-joined string, e.g. `ROLE_ADMIN,ROLE_USER`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserData {
    #[schema(example = "admin")]
    pub username: String,
    #[schema(example = "ROLE_ADMIN,ROLE_USER")]
    pub authorities: String,
}

// --- Request Payloads ---

/// LoginForm
///
/// Form body posted by the login page (POST /login).
#[derive(Debug, Clone, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}
