//! Session context: the credential triple attached to outbound API calls.
//!
//! DESIGN
//! ======
//! The session holder writes credentials here on sign-in and clears them on
//! sign-out. Nothing reads it implicitly: the holder takes a snapshot and
//! hands it to each `ProfileApi` call, so request construction never
//! depends on ambient state.

#[cfg(test)]
#[path = "context_test.rs"]
mod context_test;

use std::sync::{Arc, RwLock};

use crate::identity::ProviderUser;

/// Credentials for the signed-in user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub email: String,
    pub gid: String,
}

impl Credentials {
    /// Value of the `authorization` header: `"<gid>:<access_token>"`.
    #[must_use]
    pub fn authorization(&self) -> String {
        format!("{}:{}", self.gid, self.access_token)
    }
}

impl From<&ProviderUser> for Credentials {
    fn from(user: &ProviderUser) -> Self {
        Self { access_token: user.access_token.clone(), email: user.email.clone(), gid: user.id.clone() }
    }
}

/// Cloneable handle to the current credentials.
#[derive(Clone, Debug, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<Option<Credentials>>>,
}

impl SessionContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached credentials.
    pub fn store(&self, credentials: Credentials) {
        *self.write() = Some(credentials);
    }

    pub fn clear(&self) {
        *self.write() = None;
    }

    /// Copy of the cached credentials, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<Credentials> {
        self.read().clone()
    }

    /// Whether a non-empty access token is cached.
    ///
    /// Only meant for optimistic initial UI state; the session role is the
    /// source of truth.
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.read()
            .as_ref()
            .is_some_and(|c| !c.access_token.is_empty())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<Credentials>> {
        self.inner.read().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<Credentials>> {
        self.inner.write().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
