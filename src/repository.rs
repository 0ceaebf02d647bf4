use async_trait::async_trait;
use std::{
    collections::{BTreeSet, HashSet},
    sync::Arc,
};

use crate::{
    errors::{AppError, AppResult},
    models::{Principal, UserData},
    roles::Role,
};

/// Credential
///
/// A single directory entry: a unique username, its password, and the roles it holds.
#[derive(Debug, Clone)]
pub struct Credential {
    pub username: String,
    pub password: String,
    pub roles: BTreeSet<Role>,
}

impl Credential {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        roles: impl IntoIterator<Item = Role>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            roles: roles.into_iter().collect(),
        }
    }

    /// Authority strings of the held roles, sorted lexicographically.
    pub fn authorities(&self) -> Vec<String> {
        let sorted: BTreeSet<&str> = self.roles.iter().map(|role| role.authority()).collect();
        sorted.into_iter().map(str::to_string).collect()
    }

    fn to_user_data(&self) -> UserData {
        UserData {
            username: self.username.clone(),
            authorities: self.authorities().join(","),
        }
    }

    fn to_principal(&self) -> Principal {
        Principal::new(self.username.clone(), self.authorities())
    }
}

/// UserRepository
///
/// The contract for the user directory. Handlers and the login flow only see this trait,
/// so the in-memory store can be swapped for a mock in tests.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Enumerates every known identity, in directory order.
    async fn list_users(&self) -> AppResult<Vec<UserData>>;

    /// Verifies a username/password pair. `Ok(None)` means bad credentials; `Err` means
    /// the directory itself failed.
    async fn authenticate(&self, username: &str, password: &str) -> AppResult<Option<Principal>>;
}

/// RepositoryState
///
/// The concrete type used to share the directory across the application state.
pub type RepositoryState = Arc<dyn UserRepository>;

/// InMemoryUserRepository
///
/// Owns the credential list outright. Built once at startup and never mutated, so it is
/// shared between request tasks without locking.
#[derive(Debug, Clone)]
pub struct InMemoryUserRepository {
    users: Vec<Credential>,
}

impl InMemoryUserRepository {
    /// Builds the directory, rejecting entries without roles and duplicate usernames.
    pub fn new(users: Vec<Credential>) -> AppResult<Self> {
        let mut seen = HashSet::new();
        for user in &users {
            if user.roles.is_empty() {
                return Err(AppError::Directory(format!(
                    "user '{}' has no roles",
                    user.username
                )));
            }
            if !seen.insert(user.username.as_str()) {
                return Err(AppError::Directory(format!(
                    "duplicate username '{}'",
                    user.username
                )));
            }
        }
        Ok(Self { users })
    }

    /// seeded
    ///
    /// The two fixed accounts the portal ships with: `myuser` (USER) and `admin`
    /// (USER, ADMIN).
    pub fn seeded(user_password: &str, admin_password: &str) -> AppResult<Self> {
        Self::new(vec![
            Credential::new("myuser", user_password, [Role::User]),
            Credential::new("admin", admin_password, [Role::User, Role::Admin]),
        ])
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list_users(&self) -> AppResult<Vec<UserData>> {
        Ok(self.users.iter().map(Credential::to_user_data).collect())
    }

    async fn authenticate(&self, username: &str, password: &str) -> AppResult<Option<Principal>> {
        Ok(self
            .users
            .iter()
            .find(|user| user.username == username && user.password == password)
            .map(Credential::to_principal))
    }
}
