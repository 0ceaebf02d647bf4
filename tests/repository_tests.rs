use role_portal::{
    AppError,
    models::UserData,
    repository::{Credential, InMemoryUserRepository, UserRepository},
    roles::Role,
};
use std::collections::BTreeSet;

fn seeded() -> InMemoryUserRepository {
    InMemoryUserRepository::seeded("mypassword", "adminpwd").expect("seed accounts are valid")
}

fn authority_set(user: &UserData) -> BTreeSet<&str> {
    user.authorities.split(',').collect()
}

#[tokio::test]
async fn test_list_users_returns_seed_accounts() {
    let repo = seeded();
    let users = repo.list_users().await.unwrap();

    assert_eq!(users.len(), 2);

    let admin = users.iter().find(|u| u.username == "admin").expect("admin listed");
    assert_eq!(authority_set(admin), BTreeSet::from(["ROLE_USER", "ROLE_ADMIN"]));

    let myuser = users.iter().find(|u| u.username == "myuser").expect("myuser listed");
    assert_eq!(authority_set(myuser), BTreeSet::from(["ROLE_USER"]));
}

#[tokio::test]
async fn test_authorities_are_comma_joined_and_sorted() {
    let repo = seeded();
    let users = repo.list_users().await.unwrap();
    let admin = users.iter().find(|u| u.username == "admin").unwrap();
    assert_eq!(admin.authorities, "ROLE_ADMIN,ROLE_USER");
}

#[tokio::test]
async fn test_list_users_is_repeatable() {
    let repo = seeded();
    let first = repo.list_users().await.unwrap();
    let second = repo.list_users().await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_authenticate_accepts_valid_credentials() {
    let repo = seeded();

    let admin = repo.authenticate("admin", "adminpwd").await.unwrap().expect("admin logs in");
    assert_eq!(admin.username, "admin");
    assert!(admin.has_role(Role::Admin));
    assert!(admin.has_role(Role::User));

    let user = repo.authenticate("myuser", "mypassword").await.unwrap().expect("myuser logs in");
    assert_eq!(user.authorities, vec!["ROLE_USER".to_string()]);
    assert!(!user.has_role(Role::Admin));
}

#[tokio::test]
async fn test_authenticate_rejects_bad_credentials() {
    let repo = seeded();
    assert!(repo.authenticate("admin", "mypassword").await.unwrap().is_none());
    assert!(repo.authenticate("nobody", "adminpwd").await.unwrap().is_none());
    assert!(repo.authenticate("ADMIN", "adminpwd").await.unwrap().is_none());
    assert!(repo.authenticate("", "").await.unwrap().is_none());
}

#[test]
fn test_directory_rejects_user_without_roles() {
    let result = InMemoryUserRepository::new(vec![Credential::new("ghost", "pw", [])]);
    assert!(matches!(result, Err(AppError::Directory(_))));
}

#[test]
fn test_directory_rejects_duplicate_usernames() {
    let result = InMemoryUserRepository::new(vec![
        Credential::new("twin", "a", [Role::User]),
        Credential::new("twin", "b", [Role::Admin]),
    ]);
    assert!(matches!(result, Err(AppError::Directory(_))));
}

#[test]
fn test_seeded_directory_size() {
    let repo = seeded();
    assert_eq!(repo.len(), 2);
    assert!(!repo.is_empty());
}
