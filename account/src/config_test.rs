use super::*;

#[test]
fn default_points_at_local_graphql() {
    let config = ClientConfig::default();
    assert_eq!(config.graphql_url, "http://localhost:8080/graphql");
    assert_eq!(config.scopes, vec!["openid", "email", "profile"]);
}

#[test]
fn join_endpoint_handles_slashes() {
    assert_eq!(join_endpoint("http://h/", "/graphql"), "http://h/graphql");
    assert_eq!(join_endpoint("http://h", "graphql"), "http://h/graphql");
}

#[test]
fn join_endpoint_keeps_absolute_urls() {
    assert_eq!(join_endpoint("http://h", "https://api.example.com/gql"), "https://api.example.com/gql");
}

#[test]
fn parse_scopes_splits_on_whitespace() {
    assert_eq!(parse_scopes("  a  b\tc "), vec!["a", "b", "c"]);
    assert!(parse_scopes("").is_empty());
}
