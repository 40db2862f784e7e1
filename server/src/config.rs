//! Server configuration parsed from environment variables.
//!
//! SYSTEM CONTEXT
//! ==============
//! `main` loads a dotenv file chosen by `--environment` and then builds
//! `ServerConfig` from the process environment. Parsing goes through a
//! lookup closure so tests can feed variables without touching the real
//! environment.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_BUNDLE_DIR: &str = "./bundle";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_TOKENINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/tokeninfo";
pub const DEFAULT_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
/// Redirect URI used by popup-based offline-access consent.
pub const DEFAULT_REDIRECT_URI: &str = "postmessage";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    Missing(&'static str),
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// OAuth client settings for the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleConfig {
    pub client_id: String,
    /// Without a secret, `tokenRefresh` is disabled.
    pub client_secret: Option<String>,
    pub token_uri: String,
    pub tokeninfo_url: String,
    pub userinfo_url: String,
    pub redirect_uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Postgres URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub google: GoogleConfig,
    /// Directory holding the built front-end bundle.
    pub bundle_dir: PathBuf,
}

impl ServerConfig {
    /// Build config from the process environment.
    ///
    /// Required: `GOOGLE_CLIENT_ID`.
    ///
    /// Optional: `SERVER_HOST`, `SERVER_PORT`, `DATABASE_URL`,
    /// `DB_MAX_CONNECTIONS`, `GOOGLE_CLIENT_SECRET`, `GOOGLE_TOKEN_URI`, `GOOGLE_TOKENINFO_URL`,
    /// `GOOGLE_USERINFO_URL`, `GOOGLE_REDIRECT_URI`, `BUNDLE_DIR`.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value does
    /// not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("SERVER_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { var: "SERVER_PORT", value: raw })?,
            None => DEFAULT_PORT,
        };

        let db_max_connections = match var("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { var: "DB_MAX_CONNECTIONS", value: raw })?,
            None => DEFAULT_DB_MAX_CONNECTIONS,
        };

        let google = GoogleConfig {
            client_id: var("GOOGLE_CLIENT_ID").ok_or(ConfigError::Missing("GOOGLE_CLIENT_ID"))?,
            client_secret: var("GOOGLE_CLIENT_SECRET"),
            token_uri: var("GOOGLE_TOKEN_URI").unwrap_or_else(|| DEFAULT_TOKEN_URI.to_owned()),
            tokeninfo_url: var("GOOGLE_TOKENINFO_URL").unwrap_or_else(|| DEFAULT_TOKENINFO_URL.to_owned()),
            userinfo_url: var("GOOGLE_USERINFO_URL").unwrap_or_else(|| DEFAULT_USERINFO_URL.to_owned()),
            redirect_uri: var("GOOGLE_REDIRECT_URI").unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_owned()),
        };

        Ok(Self {
            host: var("SERVER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned()),
            port,
            database_url: var("DATABASE_URL"),
            db_max_connections,
            google,
            bundle_dir: PathBuf::from(var("BUNDLE_DIR").unwrap_or_else(|| DEFAULT_BUNDLE_DIR.to_owned())),
        })
    }

    /// `host:port` to bind.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Resolve the dotenv file for an `--environment` argument.
///
/// Values starting with `.` or `/` are paths; anything else names
/// `.<name>.env` in the working directory.
#[must_use]
pub fn env_file_path(environment: &str) -> PathBuf {
    if environment.starts_with('.') || environment.starts_with('/') {
        PathBuf::from(environment)
    } else {
        PathBuf::from(format!(".{environment}.env"))
    }
}
