//! Profile Sync Client: remote fetch/update/token-refresh.
//!
//! SYSTEM CONTEXT
//! ==============
//! `ProfileApi` is the seam the session holder talks to. `GraphqlProfileClient`
//! implements it over HTTP; tests substitute in-memory fakes. Credentials are
//! passed explicitly on every call and rendered into the `authorization`
//! header only when present.

pub mod graphql;
pub mod wire;

use async_trait::async_trait;

use crate::context::Credentials;
use crate::error::ApiError;
use crate::profile::Profile;

pub use graphql::GraphqlProfileClient;
pub use wire::MutationPayload;

/// Result of a profile update: the server's canonical record and its success flag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub ok: bool,
    pub profile: Profile,
}

#[async_trait]
pub trait ProfileApi: Send + Sync {
    /// Fetch the caller's profile.
    async fn fetch_profile(&self, credentials: Option<&Credentials>) -> Result<Profile, ApiError>;

    /// Submit all four profile fields and return the server's post-update record.
    async fn update_profile(
        &self,
        profile: &Profile,
        credentials: Option<&Credentials>,
    ) -> Result<UpdateOutcome, ApiError>;

    /// Exchange an identity-provider authorization code for a backend credential.
    async fn refresh_token(&self, code: &str, credentials: Option<&Credentials>)
    -> Result<MutationPayload, ApiError>;
}
