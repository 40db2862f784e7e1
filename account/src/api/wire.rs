//! GraphQL wire schema shared by the client and the profile backend.
//!
//! DESIGN
//! ======
//! The profile API serves a fixed set of three operations. The documents
//! below are exactly what the client sends; the backend recognizes them by
//! operation name (or by root field when the name is omitted) and reads all
//! arguments from `variables`.

#[cfg(test)]
#[path = "wire_test.rs"]
mod wire_test;

use serde::{Deserialize, Serialize};

use crate::profile::Profile;

pub const CURRENT_PROFILE_QUERY: &str = "query CurrentProfile { currentProfile { gid name email role } }";

pub const PROFILE_UPDATE_MUTATION: &str = "mutation ProfileUpdate($gid: String!, $name: String, $email: String, $role: Int) { \
     profileUpdate(gid: $gid, name: $name, email: $email, role: $role) { ok user { gid name email role } } }";

pub const TOKEN_REFRESH_MUTATION: &str =
    "mutation TokenRefresh($code: String!) { tokenRefresh(code: $code) { ok user { gid name email role } } }";

/// The operations the profile API understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    CurrentProfile,
    ProfileUpdate,
    TokenRefresh,
}

impl Operation {
    pub const ALL: [Self; 3] = [Self::CurrentProfile, Self::ProfileUpdate, Self::TokenRefresh];

    /// GraphQL operation name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::CurrentProfile => "CurrentProfile",
            Self::ProfileUpdate => "ProfileUpdate",
            Self::TokenRefresh => "TokenRefresh",
        }
    }

    /// Root field selected by the operation.
    #[must_use]
    pub fn root_field(self) -> &'static str {
        match self {
            Self::CurrentProfile => "currentProfile",
            Self::ProfileUpdate => "profileUpdate",
            Self::TokenRefresh => "tokenRefresh",
        }
    }

    #[must_use]
    pub fn document(self) -> &'static str {
        match self {
            Self::CurrentProfile => CURRENT_PROFILE_QUERY,
            Self::ProfileUpdate => PROFILE_UPDATE_MUTATION,
            Self::TokenRefresh => TOKEN_REFRESH_MUTATION,
        }
    }

    /// Match an operation by its GraphQL operation name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Find the operation whose root field appears in `document`.
    ///
    /// Field names are matched as whole identifiers, so `currentProfileX`
    /// does not count as `currentProfile`.
    #[must_use]
    pub fn detect(document: &str) -> Option<Self> {
        let mut idents = document
            .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .filter(|s| !s.is_empty());
        idents.find_map(|ident| Self::ALL.into_iter().find(|op| op.root_field() == ident))
    }
}

/// Request body posted to the GraphQL endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
}

impl GraphqlRequest {
    #[must_use]
    pub fn new(operation: Operation, variables: Option<serde_json::Value>) -> Self {
        Self {
            query: operation.document().to_owned(),
            variables,
            operation_name: Some(operation.name().to_owned()),
        }
    }

    /// Resolve which known operation this request targets.
    #[must_use]
    pub fn operation(&self) -> Option<Operation> {
        match self.operation_name.as_deref() {
            Some(name) => Operation::from_name(name),
            None => Operation::detect(&self.query),
        }
    }
}

/// A single GraphQL error entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

/// Response envelope: `{data}` on success, `{errors}` on failure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphqlResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphqlError>,
}

impl<T> GraphqlResponse<T> {
    #[must_use]
    pub fn data(data: T) -> Self {
        Self { data: Some(data), errors: Vec::new() }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self { data: None, errors: vec![GraphqlError { message: message.into() }] }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentProfileData {
    pub current_profile: Option<Profile>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateData {
    pub profile_update: MutationPayload,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRefreshData {
    pub token_refresh: MutationPayload,
}

/// `{ok, user}` payload returned by both mutations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationPayload {
    pub ok: bool,
    #[serde(default)]
    pub user: Option<Profile>,
}

/// Variables for `ProfileUpdate`. Omitted fields are left unchanged and an
/// empty name clears it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdateVars {
    pub gid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<i32>,
}

impl From<&Profile> for ProfileUpdateVars {
    fn from(profile: &Profile) -> Self {
        Self {
            gid: profile.gid.clone(),
            name: Some(profile.name.clone().unwrap_or_default()),
            email: Some(profile.email.clone()),
            role: Some(profile.role),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRefreshVars {
    pub code: String,
}
