//! Fakes for the identity provider and profile API.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;

use crate::api::{MutationPayload, ProfileApi, UpdateOutcome};
use crate::config::ClientConfig;
use crate::context::Credentials;
use crate::error::{ApiError, IdentityError};
use crate::identity::{AuthCode, IdentityProvider, ProviderState, ProviderUser, SignInPrompt};
use crate::profile::Profile;
use crate::session::UserSession;

#[must_use]
pub fn ann() -> Profile {
    Profile { gid: "g1".to_owned(), name: Some("Ann".to_owned()), email: "a@x.com".to_owned(), role: 5 }
}

#[must_use]
pub fn provider_user(id: &str) -> ProviderUser {
    ProviderUser { id: id.to_owned(), email: format!("{id}@x.com"), access_token: format!("token-{id}") }
}

// =============================================================================
// FAKE PROVIDER
// =============================================================================

/// Identity provider driven entirely by the test.
pub struct FakeProvider {
    tx: watch::Sender<ProviderState>,
    /// Who becomes signed in after consent or interactive sign-in.
    pub next_user: Mutex<Option<ProviderUser>>,
    pub deny_consent: AtomicBool,
    pub fail_sign_in: AtomicBool,
    pub fail_sign_out: AtomicBool,
    pub calls: Mutex<Vec<String>>,
}

impl FakeProvider {
    #[must_use]
    pub fn new(state: ProviderState) -> Self {
        let (tx, _rx) = watch::channel(state);
        Self {
            tx,
            next_user: Mutex::new(Some(provider_user("g1"))),
            deny_consent: AtomicBool::new(false),
            fail_sign_in: AtomicBool::new(false),
            fail_sign_out: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_state(&self, state: ProviderState) {
        self.tx.send_replace(state);
    }

    pub fn set_next_user(&self, user: Option<ProviderUser>) {
        *self.next_user.lock().unwrap() = user;
    }

    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_owned());
    }

    fn sign_in_next_user(&self) {
        if let Some(user) = self.next_user.lock().unwrap().clone() {
            self.set_state(ProviderState::SignedIn(user));
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    async fn grant_offline_access(&self, scopes: &[String]) -> Result<AuthCode, IdentityError> {
        self.record(&format!("consent:{}", scopes.join(" ")));
        if self.deny_consent.load(Ordering::SeqCst) {
            return Err(IdentityError::Cancelled("popup closed by user".to_owned()));
        }
        self.sign_in_next_user();
        Ok(AuthCode("auth-code".to_owned()))
    }

    async fn sign_in(&self, prompt: SignInPrompt) -> Result<(), IdentityError> {
        self.record(&format!("sign_in:{prompt:?}"));
        if self.fail_sign_in.load(Ordering::SeqCst) {
            return Err(IdentityError::Provider("sign-in failed".to_owned()));
        }
        self.sign_in_next_user();
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        self.record("sign_out");
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(IdentityError::Provider("sign-out failed".to_owned()));
        }
        self.set_state(ProviderState::SignedOut);
        Ok(())
    }

    fn state(&self) -> ProviderState {
        self.tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<ProviderState> {
        self.tx.subscribe()
    }
}

// =============================================================================
// FAKE API
// =============================================================================

/// In-memory profile API that records every call.
pub struct FakeApi {
    /// Returned by `fetch_profile`; `None` makes the fetch fail.
    pub server_profile: Mutex<Option<Profile>>,
    /// When set, returned by `update_profile` instead of echoing the input.
    pub update_response: Mutex<Option<UpdateOutcome>>,
    pub refresh_response: Mutex<MutationPayload>,
    pub fail_updates: AtomicBool,
    pub fail_refresh: AtomicBool,
    pub updates: Mutex<Vec<Profile>>,
    pub refresh_codes: Mutex<Vec<String>>,
    pub seen_credentials: Mutex<Vec<Option<Credentials>>>,
}

impl FakeApi {
    #[must_use]
    pub fn new(server_profile: Option<Profile>) -> Self {
        Self {
            server_profile: Mutex::new(server_profile),
            update_response: Mutex::new(None),
            refresh_response: Mutex::new(MutationPayload { ok: true, user: None }),
            fail_updates: AtomicBool::new(false),
            fail_refresh: AtomicBool::new(false),
            updates: Mutex::new(Vec::new()),
            refresh_codes: Mutex::new(Vec::new()),
            seen_credentials: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn updates(&self) -> Vec<Profile> {
        self.updates.lock().unwrap().clone()
    }

    #[must_use]
    pub fn seen_credentials(&self) -> Vec<Option<Credentials>> {
        self.seen_credentials.lock().unwrap().clone()
    }

    fn see(&self, credentials: Option<&Credentials>) {
        self.seen_credentials.lock().unwrap().push(credentials.cloned());
    }
}

#[async_trait]
impl ProfileApi for FakeApi {
    async fn fetch_profile(&self, credentials: Option<&Credentials>) -> Result<Profile, ApiError> {
        self.see(credentials);
        self.server_profile
            .lock()
            .unwrap()
            .clone()
            .ok_or(ApiError::Status { status: 403, messages: vec!["Malformed auth".to_owned()] })
    }

    async fn update_profile(
        &self,
        profile: &Profile,
        credentials: Option<&Credentials>,
    ) -> Result<UpdateOutcome, ApiError> {
        self.see(credentials);
        self.updates.lock().unwrap().push(profile.clone());
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(ApiError::Request("connection reset".to_owned()));
        }
        if let Some(outcome) = self.update_response.lock().unwrap().clone() {
            return Ok(outcome);
        }
        *self.server_profile.lock().unwrap() = Some(profile.clone());
        Ok(UpdateOutcome { ok: true, profile: profile.clone() })
    }

    async fn refresh_token(
        &self,
        code: &str,
        credentials: Option<&Credentials>,
    ) -> Result<MutationPayload, ApiError> {
        self.see(credentials);
        self.refresh_codes.lock().unwrap().push(code.to_owned());
        if self.fail_refresh.load(Ordering::SeqCst) {
            return Err(ApiError::Graphql(vec!["invalid_grant".to_owned()]));
        }
        Ok(self.refresh_response.lock().unwrap().clone())
    }
}

// =============================================================================
// SESSION BUILDERS
// =============================================================================

pub struct Harness {
    pub provider: Arc<FakeProvider>,
    pub api: Arc<FakeApi>,
    pub session: Arc<UserSession>,
}

/// Session wired to fakes. The provider starts signed out.
#[must_use]
pub fn harness(server_profile: Option<Profile>) -> Harness {
    let provider = Arc::new(FakeProvider::new(ProviderState::SignedOut));
    let api = Arc::new(FakeApi::new(server_profile));
    let session = Arc::new(UserSession::new(provider.clone(), api.clone(), &ClientConfig::default()));
    Harness { provider, api, session }
}
