//! Session State Holder: identity-provider user, derived role, current profile.
//!
//! ARCHITECTURE
//! ============
//! `UserSession` sits between the identity provider, the profile API and the
//! account form:
//!
//! 1. Provider state changes arrive via [`UserSession::run`] (or directly via
//!    [`UserSession::on_provider_state`]). A transition into "signed in"
//!    stores credentials in the [`SessionContext`] and fetches the profile.
//! 2. Every profile the API returns is applied with
//!    [`UserSession::set_profile`], which re-derives the role and fires the
//!    current "profile available" cycle.
//! 3. The form submits edits through [`UserSession::update_profile`]; the
//!    server's answer replaces the stored profile wholesale.
//!
//! ROLE DERIVATION
//! ===============
//! Re-evaluated whenever provider state or profile changes, first match wins:
//! provider uninitialized → `unknown`; no user → `signed-out`; no profile yet
//! → `unregistered`; otherwise the registry entry for `profile.role`, or a
//! synthesized "unrecognized" role when the level is not registered.
//!
//! CONCURRENCY
//! ===========
//! State sits behind a mutex that is never held across an `.await`. Calls are
//! not sequenced against each other: overlapping sign-in/sign-out or fetches
//! race, and whichever response is applied last wins. No call has a timeout.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::api::ProfileApi;
use crate::config::ClientConfig;
use crate::context::{Credentials, SessionContext};
use crate::error::SessionError;
use crate::identity::{IdentityProvider, ProviderState, ProviderUser, SignInPrompt};
use crate::profile::Profile;
use crate::roles::{Role, RoleLevel, RoleRegistry};
use crate::signal::{ProfileSignal, ProfileWaiter};

/// Derive the current role from provider state and profile.
#[must_use]
pub fn derive_role(registry: &RoleRegistry, initialized: bool, signed_in: bool, profile: Option<&Profile>) -> Arc<Role> {
    if !initialized {
        return registry.fixed(RoleLevel::Unknown);
    }
    if !signed_in {
        return registry.fixed(RoleLevel::SignedOut);
    }
    match profile {
        None => registry.fixed(RoleLevel::Unregistered),
        Some(profile) => registry.resolve(profile.role),
    }
}

struct SessionState {
    initialized: bool,
    user: Option<ProviderUser>,
    profile: Option<Profile>,
    role: Arc<Role>,
    signal: ProfileSignal,
}

impl SessionState {
    fn refresh_role(&mut self, registry: &RoleRegistry) {
        let role = derive_role(registry, self.initialized, self.user.is_some(), self.profile.as_ref());
        if let Some(profile) = &self.profile {
            if self.user.is_some() && registry.get(profile.role).is_none() {
                tracing::warn!(level = profile.role, gid = %profile.gid, "profile carries unregistered role level");
            }
        }
        if role != self.role {
            tracing::debug!(from = %self.role, to = %role, "session role changed");
        }
        self.role = role;
    }

    fn clear_user(&mut self) {
        self.user = None;
        self.profile = None;
    }
}

/// Live session for the current browser user.
pub struct UserSession {
    provider: Arc<dyn IdentityProvider>,
    api: Arc<dyn ProfileApi>,
    registry: Arc<RoleRegistry>,
    context: SessionContext,
    scopes: Vec<String>,
    state: Mutex<SessionState>,
}

impl UserSession {
    /// Create a session with the default role registry.
    ///
    /// The session starts in the `unknown` role until it observes provider
    /// state through [`Self::run`] or [`Self::on_provider_state`].
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>, api: Arc<dyn ProfileApi>, config: &ClientConfig) -> Self {
        Self::with_registry(provider, api, config, Arc::new(RoleRegistry::new()))
    }

    #[must_use]
    pub fn with_registry(
        provider: Arc<dyn IdentityProvider>,
        api: Arc<dyn ProfileApi>,
        config: &ClientConfig,
        registry: Arc<RoleRegistry>,
    ) -> Self {
        let role = registry.fixed(RoleLevel::Unknown);
        Self {
            provider,
            api,
            registry,
            context: SessionContext::new(),
            scopes: config.scopes.clone(),
            state: Mutex::new(SessionState {
                initialized: false,
                user: None,
                profile: None,
                role,
                signal: ProfileSignal::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Current role. Always set; see the module docs for precedence.
    #[must_use]
    pub fn role(&self) -> Arc<Role> {
        self.lock().role.clone()
    }

    /// Last profile received from the server, if any.
    #[must_use]
    pub fn profile(&self) -> Option<Profile> {
        self.lock().profile.clone()
    }

    /// Current identity-provider user, if signed in.
    #[must_use]
    pub fn user(&self) -> Option<ProviderUser> {
        self.lock().user.clone()
    }

    /// Whether a non-empty access token is cached.
    ///
    /// Optimistic hint for initial UI state only; use [`Self::role`] for
    /// anything that matters.
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.context.is_signed_in()
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<RoleRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Wait for the next profile to be set.
    ///
    /// Never yields a profile that was already set before this call.
    #[must_use]
    pub fn next_profile(&self) -> ProfileWaiter {
        self.lock().signal.subscribe()
    }

    // =========================================================================
    // PROVIDER STATE
    // =========================================================================

    /// Drive the session from the provider's state stream until it closes.
    pub async fn run(&self) {
        let mut rx = self.provider.subscribe();
        loop {
            let state = rx.borrow_and_update().clone();
            if let Err(e) = self.on_provider_state(state).await {
                tracing::warn!(error = %e, "provider state sync failed");
            }
            if rx.changed().await.is_err() {
                tracing::debug!("identity provider stream closed");
                break;
            }
        }
    }

    /// Apply a provider state and fetch the profile on sign-in.
    ///
    /// # Errors
    ///
    /// Returns the profile fetch error; the role stays `unregistered` then.
    pub async fn on_provider_state(&self, state: ProviderState) -> Result<(), SessionError> {
        if self.apply_provider_state(state) {
            self.fetch_profile().await?;
        }
        Ok(())
    }

    /// Update user, credentials and role. Returns whether a new user signed in.
    fn apply_provider_state(&self, state: ProviderState) -> bool {
        let mut st = self.lock();
        st.initialized = state.is_initialized();

        let signed_in = match state {
            ProviderState::SignedIn(user) => {
                let is_new = st.user.as_ref().map_or(true, |prev| prev.id != user.id);
                if is_new {
                    tracing::info!(gid = %user.id, "identity provider signed in");
                    st.profile = None;
                }
                self.context.store(Credentials::from(&user));
                st.user = Some(user);
                is_new
            }
            ProviderState::SignedOut | ProviderState::Uninitialized => {
                if st.user.is_some() {
                    tracing::info!("identity provider signed out");
                }
                st.clear_user();
                self.context.clear();
                false
            }
        };

        st.refresh_role(&self.registry);
        signed_in
    }

    // =========================================================================
    // SIGN-IN FLOWS
    // =========================================================================

    /// Request consent and exchange the authorization code with the backend.
    ///
    /// A successful `tokenRefresh` response that carries a user is applied as
    /// the canonical profile. A failed profile fetch is logged and does not
    /// stop the exchange.
    ///
    /// # Errors
    ///
    /// Returns an error if consent is refused or the token exchange fails.
    pub async fn sign_in(&self) -> Result<(), SessionError> {
        let code = self.provider.grant_offline_access(&self.scopes).await?;
        if let Err(e) = self.on_provider_state(self.provider.state()).await {
            tracing::warn!(error = %e, "profile fetch after consent failed");
        }

        let credentials = self.context.snapshot();
        let payload = self
            .api
            .refresh_token(code.as_str(), credentials.as_ref())
            .await?;
        tracing::info!(ok = payload.ok, has_user = payload.user.is_some(), "token refresh response");

        if payload.ok {
            if let Some(profile) = payload.user {
                self.set_profile(profile);
            }
        }
        Ok(())
    }

    /// Sign out at the provider, then clear local user, profile and role.
    ///
    /// # Errors
    ///
    /// Returns the provider error; local state is untouched in that case.
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        self.provider.sign_out().await?;

        let mut st = self.lock();
        st.initialized = true;
        st.clear_user();
        self.context.clear();
        st.refresh_role(&self.registry);
        tracing::info!("signed out");
        Ok(())
    }

    /// Sign out, then sign in again with the account chooser.
    ///
    /// The two steps are not atomic: if the second fails the user stays
    /// signed out.
    ///
    /// # Errors
    ///
    /// Returns whichever step failed.
    pub async fn switch_account(&self) -> Result<(), SessionError> {
        self.sign_out().await?;
        self.provider.sign_in(SignInPrompt::SelectAccount).await?;
        self.on_provider_state(self.provider.state()).await
    }

    // =========================================================================
    // PROFILE SYNC
    // =========================================================================

    /// Store `profile` as canonical, re-derive the role and fire waiters.
    pub fn set_profile(&self, profile: Profile) {
        let mut st = self.lock();
        st.profile = Some(profile.clone());
        st.refresh_role(&self.registry);
        let notified = st.signal.resolve(&profile);
        tracing::debug!(gid = %profile.gid, notified, "profile set");
    }

    /// Fetch the caller's profile and apply it.
    ///
    /// # Errors
    ///
    /// Returns the API error; session state is unchanged on failure.
    pub async fn fetch_profile(&self) -> Result<Profile, SessionError> {
        let credentials = self.context.snapshot();
        match self.api.fetch_profile(credentials.as_ref()).await {
            Ok(profile) => {
                tracing::info!(gid = %profile.gid, role = profile.role, "profile fetched");
                self.set_profile(profile.clone());
                Ok(profile)
            }
            Err(e) => {
                tracing::warn!(error = %e, "profile fetch failed");
                Err(e.into())
            }
        }
    }

    /// Submit `profile` and apply the server's answer as canonical.
    ///
    /// The returned record replaces local state even when the server reports
    /// `ok = false`.
    ///
    /// # Errors
    ///
    /// Returns the API error; session state is unchanged on failure.
    pub async fn update_profile(&self, profile: &Profile) -> Result<Profile, SessionError> {
        let credentials = self.context.snapshot();
        let outcome = match self.api.update_profile(profile, credentials.as_ref()).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, gid = %profile.gid, "profile update failed");
                return Err(e.into());
            }
        };

        if outcome.ok {
            tracing::info!(gid = %outcome.profile.gid, "profile updated");
        } else {
            tracing::warn!(gid = %outcome.profile.gid, "profile update not accepted; applying server copy");
        }
        self.set_profile(outcome.profile.clone());
        Ok(outcome.profile)
    }
}
