//! # account
//!
//! Session and profile synchronization for the account-management page.
//!
//! The crate mediates between three parties: an external identity provider
//! (sign-in state, consent, access credentials), the remote profile API
//! (GraphQL-shaped fetch/update/token-refresh), and the locally edited
//! account form. [`session::UserSession`] owns the live state and derives the
//! caller's [`roles::Role`]; [`form::AccountForm`] renders a draft of the
//! current profile and submits edits back through the session.

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod form;
pub mod identity;
pub mod profile;
pub mod roles;
pub mod session;
pub mod signal;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use form::{AccountForm, FormState};
pub use profile::{Profile, ProfileDraft};
pub use roles::{Role, RoleLevel, RoleRegistry};
pub use session::UserSession;
