//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the user store, the token authority used to verify callers, the
//! role registry used to render permission errors, and the front-end
//! bundle location.

use std::path::PathBuf;
use std::sync::Arc;

use account::RoleRegistry;

use crate::services::google::TokenAuthority;
use crate::store::ProfileStore;

/// Shared application state. Clone is required by Axum; every field is
/// cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProfileStore>,
    pub authority: Arc<dyn TokenAuthority>,
    pub registry: Arc<RoleRegistry>,
    pub bundle_dir: PathBuf,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn ProfileStore>, authority: Arc<dyn TokenAuthority>, bundle_dir: PathBuf) -> Self {
        Self { store, authority, registry: Arc::new(RoleRegistry::new()), bundle_dir }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
