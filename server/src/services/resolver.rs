//! Resolvers for the fixed GraphQL operation set.
//!
//! DESIGN
//! ======
//! The endpoint understands exactly the operations in
//! `account::api::wire::Operation`. A request is mapped to one of them by
//! operation name (or root field), its `variables` are decoded into the
//! typed argument struct, and the matching resolver produces the `data`
//! object. Anything else is an error rendered into the `errors` array.
//!
//! ERROR HANDLING
//! ==============
//! Resolvers validate everything before writing, so an error never leaves a
//! partially updated record behind.

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;

use std::sync::Arc;

use account::api::wire::{
    CurrentProfileData, GraphqlRequest, MutationPayload, Operation, ProfileUpdateData, ProfileUpdateVars,
    TokenRefreshData, TokenRefreshVars,
};
use account::roles::{Role, RoleLevel};
use serde::de::DeserializeOwned;

use crate::services::caller::Caller;
use crate::services::google::AuthorityError;
use crate::state::AppState;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error(
        "Caller does not have permission to do requested action. role {required} was needed, but caller has {found}"
    )]
    InsufficientRole { required: Arc<Role>, found: Arc<Role> },
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0}")]
    InvalidValue(String),
    #[error("unknown operation")]
    UnknownOperation,
    #[error("invalid arguments for {operation}: {reason}")]
    Arguments { operation: &'static str, reason: String },
    #[error("No user found with gid {0}")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Authority(#[from] AuthorityError),
}

/// Run `request` for `caller` and return the `data` object.
///
/// # Errors
///
/// Returns a [`ResolveError`] describing the first failed check.
pub async fn execute(state: &AppState, caller: &Caller, request: &GraphqlRequest) -> Result<serde_json::Value, ResolveError> {
    let operation = request.operation().ok_or(ResolveError::UnknownOperation)?;
    tracing::debug!(gid = %caller.gid, operation = operation.name(), "resolving");

    let data = match operation {
        Operation::CurrentProfile => {
            serde_json::to_value(CurrentProfileData { current_profile: Some(caller.record.profile()) })
        }
        Operation::ProfileUpdate => {
            let vars = variables(operation, request)?;
            let payload = profile_update(state, caller, vars).await?;
            serde_json::to_value(ProfileUpdateData { profile_update: payload })
        }
        Operation::TokenRefresh => {
            let vars: TokenRefreshVars = variables(operation, request)?;
            let payload = token_refresh(state, caller, &vars.code).await?;
            serde_json::to_value(TokenRefreshData { token_refresh: payload })
        }
    };
    data.map_err(|e| ResolveError::Arguments { operation: operation.name(), reason: e.to_string() })
}

fn variables<T: DeserializeOwned>(operation: Operation, request: &GraphqlRequest) -> Result<T, ResolveError> {
    let raw = request.variables.clone().unwrap_or(serde_json::Value::Null);
    serde_json::from_value(raw).map_err(|e| ResolveError::Arguments { operation: operation.name(), reason: e.to_string() })
}

/// Fail unless the caller's role is at least `required`.
///
/// # Errors
///
/// Returns [`ResolveError::InsufficientRole`] naming both roles.
pub fn require_role(state: &AppState, caller: &Caller, required: RoleLevel) -> Result<(), ResolveError> {
    if caller.role() < required.value() {
        return Err(ResolveError::InsufficientRole {
            required: state.registry.fixed(required),
            found: state.registry.resolve(caller.role()),
        });
    }
    Ok(())
}

/// Apply `vars` to an existing record.
///
/// Callers edit their own record; admins may edit anyone's and are the only
/// ones allowed to change a role. A new email must belong to the target's
/// identity-provider account. The record is written only if a field
/// changed. An empty name clears it.
///
/// # Errors
///
/// Returns the first failed check; nothing is written in that case.
pub async fn profile_update(
    state: &AppState,
    caller: &Caller,
    vars: ProfileUpdateVars,
) -> Result<MutationPayload, ResolveError> {
    require_role(state, caller, RoleLevel::Unregistered)?;
    let is_admin = caller.role() >= RoleLevel::Admin.value();

    let mut target = state
        .store
        .get(&vars.gid)
        .await?
        .ok_or_else(|| ResolveError::NotFound(vars.gid.clone()))?;

    if caller.gid != target.gid && !is_admin {
        return Err(ResolveError::Forbidden("Only admin can update other peoples profiles"));
    }

    let mut changed = false;

    if let Some(role) = vars.role.filter(|role| *role != target.role) {
        if !is_admin {
            return Err(ResolveError::Forbidden("Only admin can change user roles"));
        }
        target.role = role;
        changed = true;
    }

    if let Some(email) = vars.email.filter(|email| *email != target.email) {
        let owned = match target.token.as_deref() {
            Some(token) => state.authority.account_emails(token).await?,
            None => Vec::new(),
        };
        if !owned.contains(&email) {
            return Err(ResolveError::InvalidValue(format!(
                "Cannot set new email to {email} since it is not registered to users google account."
            )));
        }
        target.email = email;
        changed = true;
    }

    if let Some(name) = vars.name {
        let name = (!name.is_empty()).then_some(name);
        if name != target.name {
            target.name = name;
            changed = true;
        }
    }

    if changed {
        state.store.put(&target).await?;
        tracing::info!(caller = %caller.gid, target = %target.gid, "profile updated");
    }

    Ok(MutationPayload { ok: true, user: Some(target.profile()) })
}

/// Exchange an offline-access code and keep the refresh token.
///
/// `ok` reports whether a refresh token was stored; the provider only
/// issues one the first time consent is granted.
///
/// # Errors
///
/// Returns an error if the exchange or the write fails.
pub async fn token_refresh(state: &AppState, caller: &Caller, code: &str) -> Result<MutationPayload, ResolveError> {
    require_role(state, caller, RoleLevel::Unregistered)?;

    let grant = state.authority.exchange_code(code).await?;
    let mut record = caller.record.clone();
    let ok = match grant.refresh_token.clone() {
        Some(refresh_token) => {
            record.refresh_token = Some(refresh_token);
            state.store.put(&record).await?;
            true
        }
        None => false,
    };
    tracing::info!(gid = %caller.gid, stored = ok, expires_in = ?grant.expires_in, scope = ?grant.scope, "token refresh");

    Ok(MutationPayload { ok, user: Some(record.profile()) })
}
