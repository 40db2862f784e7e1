//! Client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_ORIGIN: &str = "http://localhost:8080";
pub const DEFAULT_GRAPHQL_PATH: &str = "/graphql";
pub const DEFAULT_SCOPES: &str = "openid email profile";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Absolute URL of the GraphQL endpoint.
    pub graphql_url: String,
    /// OAuth scopes requested during consent.
    pub scopes: Vec<String>,
}

impl ClientConfig {
    /// Build config from environment variables.
    ///
    /// - `ACCOUNT_GRAPHQL_URL`: absolute endpoint URL, or a path joined onto
    ///   `ACCOUNT_ORIGIN` (default `/graphql`)
    /// - `ACCOUNT_ORIGIN`: default `http://localhost:8080`
    /// - `ACCOUNT_SCOPES`: space-separated, default `openid email profile`
    #[must_use]
    pub fn from_env() -> Self {
        let origin = std::env::var("ACCOUNT_ORIGIN").unwrap_or_else(|_| DEFAULT_ORIGIN.to_owned());
        let endpoint = std::env::var("ACCOUNT_GRAPHQL_URL").unwrap_or_else(|_| DEFAULT_GRAPHQL_PATH.to_owned());
        let scopes = std::env::var("ACCOUNT_SCOPES").unwrap_or_else(|_| DEFAULT_SCOPES.to_owned());
        Self { graphql_url: join_endpoint(&origin, &endpoint), scopes: parse_scopes(&scopes) }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            graphql_url: join_endpoint(DEFAULT_ORIGIN, DEFAULT_GRAPHQL_PATH),
            scopes: parse_scopes(DEFAULT_SCOPES),
        }
    }
}

fn join_endpoint(origin: &str, endpoint: &str) -> String {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        return endpoint.to_owned();
    }
    format!("{}/{}", origin.trim_end_matches('/'), endpoint.trim_start_matches('/'))
}

fn parse_scopes(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_owned).collect()
}
