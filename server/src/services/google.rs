//! Google OAuth: access-token verification, account emails, code exchange.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every GraphQL call carries the caller's Google access token. The backend
//! verifies it at the tokeninfo endpoint, asks the userinfo endpoint which
//! emails belong to an account when a profile email changes, and exchanges
//! offline-access authorization codes for refresh tokens.
//!
//! Handlers depend on the `TokenAuthority` trait so tests can substitute a
//! fake without reaching Google.

#[cfg(test)]
#[path = "google_test.rs"]
mod tests;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::GoogleConfig;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthorityError {
    #[error("Token could not be verified: \"{0}\"")]
    Rejected(String),
    #[error("Token was not issued for this application")]
    AudienceMismatch,
    #[error("identity provider request failed: {0}")]
    Request(String),
    #[error("authorization code exchange failed: {0}")]
    Exchange(String),
    #[error("token refresh is not configured")]
    NotConfigured,
}

/// Verified facts about an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    /// Google user id the token was issued to.
    pub sub: String,
    pub email: String,
    pub email_verified: bool,
    pub scope: String,
    /// Expiry as seconds since the epoch.
    pub expiry: i64,
    pub offline: bool,
}

/// Tokeninfo body as Google sends it: every value is a string.
#[derive(Debug, Deserialize)]
struct RawTokenInfo {
    #[serde(default)]
    aud: String,
    #[serde(default)]
    sub: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    email_verified: String,
    #[serde(default)]
    scope: String,
    #[serde(default)]
    exp: String,
    #[serde(default)]
    access_type: String,
}

impl TokenInfo {
    /// Parse a tokeninfo body and check it was issued for `audience`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::AudienceMismatch`] for a foreign token and
    /// [`AuthorityError::Rejected`] if the body is not a tokeninfo object.
    pub fn from_body(body: &str, audience: &str) -> Result<Self, AuthorityError> {
        let raw: RawTokenInfo =
            serde_json::from_str(body).map_err(|e| AuthorityError::Rejected(format!("unexpected tokeninfo: {e}")))?;
        if raw.aud != audience {
            return Err(AuthorityError::AudienceMismatch);
        }
        if raw.sub.is_empty() {
            return Err(AuthorityError::Rejected("tokeninfo has no subject".to_owned()));
        }
        Ok(Self {
            sub: raw.sub,
            email: raw.email,
            email_verified: raw.email_verified == "true",
            scope: raw.scope,
            expiry: raw.exp.parse().unwrap_or_default(),
            offline: raw.access_type == "offline",
        })
    }
}

/// Tokens returned by the token endpoint for an authorization code.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    /// Only present the first time a user grants offline access.
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub scope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    #[serde(default)]
    email: Option<String>,
}

#[async_trait]
pub trait TokenAuthority: Send + Sync {
    /// Verify an access token and return what it proves.
    async fn verify_token(&self, access_token: &str) -> Result<TokenInfo, AuthorityError>;

    /// Emails registered to the account that owns `access_token`.
    async fn account_emails(&self, access_token: &str) -> Result<Vec<String>, AuthorityError>;

    /// Exchange an offline-access authorization code.
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant, AuthorityError>;
}

/// `TokenAuthority` backed by Google's OAuth endpoints.
pub struct GoogleAuthority {
    http: reqwest::Client,
    config: GoogleConfig,
}

impl GoogleAuthority {
    #[must_use]
    pub fn new(config: GoogleConfig) -> Self {
        Self { http: reqwest::Client::new(), config }
    }
}

#[async_trait]
impl TokenAuthority for GoogleAuthority {
    async fn verify_token(&self, access_token: &str) -> Result<TokenInfo, AuthorityError> {
        let resp = self
            .http
            .get(&self.config.tokeninfo_url)
            .query(&[("access_token", access_token)])
            .send()
            .await
            .map_err(|e| AuthorityError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AuthorityError::Rejected(status.canonical_reason().unwrap_or("rejected").to_owned()));
        }

        let body = resp.text().await.map_err(|e| AuthorityError::Request(e.to_string()))?;
        TokenInfo::from_body(&body, &self.config.client_id)
    }

    async fn account_emails(&self, access_token: &str) -> Result<Vec<String>, AuthorityError> {
        let resp = self
            .http
            .get(&self.config.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthorityError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthorityError::Request(format!("{status}: {body}")));
        }

        let info: UserInfo = resp.json().await.map_err(|e| AuthorityError::Request(e.to_string()))?;
        Ok(info.email.into_iter().collect())
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenGrant, AuthorityError> {
        let Some(secret) = self.config.client_secret.as_deref() else {
            return Err(AuthorityError::NotConfigured);
        };

        let resp = self
            .http
            .post(&self.config.token_uri)
            .form(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", secret),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AuthorityError::Exchange(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| AuthorityError::Exchange(e.to_string()))?;
        if !status.is_success() {
            return Err(AuthorityError::Exchange(format!("{status}: {body}")));
        }
        serde_json::from_str(&body).map_err(|_| AuthorityError::Exchange(format!("unexpected response: {body}")))
    }
}
