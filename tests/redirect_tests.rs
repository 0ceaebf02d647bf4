use role_portal::{
    AppError,
    paths::Route,
    redirect::{RedirectResolver, RedirectRule},
};

#[test]
fn test_admin_wins_over_user() {
    let resolver = RedirectResolver::by_role();
    let target = resolver.resolve(["ROLE_ADMIN", "ROLE_USER"]).unwrap();
    assert_eq!(target, Route::AdminAdmin.path());

    // Order of the held authorities does not matter.
    let target = resolver.resolve(["ROLE_USER", "ROLE_ADMIN"]).unwrap();
    assert_eq!(target, Route::AdminAdmin.path());
}

#[test]
fn test_user_lands_on_user_main() {
    let resolver = RedirectResolver::by_role();
    assert_eq!(resolver.resolve(["ROLE_USER"]).unwrap(), Route::UserMain.path());
}

#[test]
fn test_unknown_authorities_are_ignored() {
    let resolver = RedirectResolver::by_role();
    let target = resolver
        .resolve(["SCOPE_read", "ROLE_USER", "ROLE_UNKNOWN"])
        .unwrap();
    assert_eq!(target, "/user/main");
}

#[test]
fn test_no_match_is_an_error() {
    let resolver = RedirectResolver::by_role();

    let empty: [&str; 0] = [];
    assert!(matches!(
        resolver.resolve(empty),
        Err(AppError::UnresolvableRedirect(held)) if held.is_empty()
    ));

    match resolver.resolve(["ROLE_UNKNOWN"]) {
        Err(AppError::UnresolvableRedirect(held)) => assert_eq!(held, vec!["ROLE_UNKNOWN"]),
        other => panic!("expected UnresolvableRedirect, got {other:?}"),
    }
}

#[test]
fn test_resolution_is_repeatable() {
    let resolver = RedirectResolver::default();
    let first = resolver.resolve(["ROLE_USER", "ROLE_ADMIN"]).unwrap().to_string();
    for _ in 0..10 {
        assert_eq!(resolver.resolve(["ROLE_USER", "ROLE_ADMIN"]).unwrap(), first);
    }
}

#[test]
fn test_custom_table_respects_priority() {
    let resolver = RedirectResolver::new([
        RedirectRule::new("ROLE_USER", 10, "/user/main"),
        RedirectRule::new("ROLE_AUDITOR", 5, "/audit"),
    ])
    .unwrap();

    assert_eq!(resolver.resolve(["ROLE_USER", "ROLE_AUDITOR"]).unwrap(), "/audit");
    assert_eq!(resolver.rules().count(), 2);
}

#[test]
fn test_duplicate_priorities_are_rejected() {
    let result = RedirectResolver::new([
        RedirectRule::new("ROLE_ADMIN", 1, "/admin/admin"),
        RedirectRule::new("ROLE_USER", 1, "/user/main"),
    ]);
    assert!(matches!(result, Err(AppError::InvalidRedirectTable(_))));
}

#[test]
fn test_duplicate_authorities_are_rejected() {
    let result = RedirectResolver::new([
        RedirectRule::new("ROLE_USER", 1, "/a"),
        RedirectRule::new("ROLE_USER", 2, "/b"),
    ]);
    assert!(matches!(result, Err(AppError::InvalidRedirectTable(_))));
}
