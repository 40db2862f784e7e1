use super::*;

fn creds(token: &str) -> Credentials {
    Credentials { access_token: token.to_owned(), email: "a@x.com".to_owned(), gid: "g1".to_owned() }
}

#[test]
fn authorization_joins_gid_and_token() {
    assert_eq!(creds("tok").authorization(), "g1:tok");
}

#[test]
fn authorization_keeps_colons_in_token() {
    assert_eq!(creds("a:b").authorization(), "g1:a:b");
}

#[test]
fn new_context_is_signed_out() {
    let ctx = SessionContext::new();
    assert!(!ctx.is_signed_in());
    assert!(ctx.snapshot().is_none());
}

#[test]
fn store_then_clear() {
    let ctx = SessionContext::new();
    ctx.store(creds("tok"));
    assert!(ctx.is_signed_in());
    assert_eq!(ctx.snapshot(), Some(creds("tok")));
    ctx.clear();
    assert!(!ctx.is_signed_in());
    assert!(ctx.snapshot().is_none());
}

#[test]
fn empty_access_token_is_not_signed_in() {
    let ctx = SessionContext::new();
    ctx.store(creds(""));
    assert!(!ctx.is_signed_in());
}

#[test]
fn clones_share_state() {
    let ctx = SessionContext::new();
    let other = ctx.clone();
    ctx.store(creds("tok"));
    assert!(other.is_signed_in());
}

#[test]
fn credentials_from_provider_user() {
    let user = ProviderUser { id: "g9".to_owned(), email: "z@x.com".to_owned(), access_token: "t9".to_owned() };
    let c = Credentials::from(&user);
    assert_eq!(c.gid, "g9");
    assert_eq!(c.email, "z@x.com");
    assert_eq!(c.access_token, "t9");
}
