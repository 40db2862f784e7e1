//! Identity-provider seam.
//!
//! SYSTEM CONTEXT
//! ==============
//! The provider is an external collaborator (a hosted OAuth sign-in client).
//! The session holder only needs its consent flow, interactive sign-in with
//! an optional account chooser, sign-out, and a stream of sign-in states.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::IdentityError;

/// User details the provider exposes once signed in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderUser {
    /// Opaque provider user id (the profile `gid`).
    pub id: String,
    pub email: String,
    pub access_token: String,
}

/// Sign-in state reported by the provider.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ProviderState {
    /// Client library still loading.
    #[default]
    Uninitialized,
    SignedOut,
    SignedIn(ProviderUser),
}

impl ProviderState {
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        !matches!(self, Self::Uninitialized)
    }

    #[must_use]
    pub fn user(&self) -> Option<&ProviderUser> {
        match self {
            Self::SignedIn(user) => Some(user),
            _ => None,
        }
    }
}

/// Prompt behavior for interactive sign-in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SignInPrompt {
    /// Let the provider reuse an existing session silently.
    #[default]
    Default,
    /// Force the account chooser.
    SelectAccount,
}

/// Authorization code returned by the consent flow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthCode(pub String);

impl AuthCode {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Request interactive consent for `scopes` and return the authorization code.
    async fn grant_offline_access(&self, scopes: &[String]) -> Result<AuthCode, IdentityError>;

    /// Run an interactive sign-in.
    async fn sign_in(&self, prompt: SignInPrompt) -> Result<(), IdentityError>;

    /// Clear the provider session.
    async fn sign_out(&self) -> Result<(), IdentityError>;

    /// Current sign-in state.
    fn state(&self) -> ProviderState;

    /// Stream of sign-in state changes.
    fn subscribe(&self) -> watch::Receiver<ProviderState>;
}
