//! HTTP implementation of [`ProfileApi`] against the GraphQL endpoint.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures, non-success statuses, GraphQL `errors` payloads and
//! undecodable bodies all surface as [`ApiError`]. Nothing is retried.

#[cfg(test)]
#[path = "graphql_test.rs"]
mod graphql_test;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;

use super::wire::{
    CurrentProfileData, GraphqlRequest, GraphqlResponse, MutationPayload, Operation, ProfileUpdateData,
    ProfileUpdateVars, TokenRefreshData, TokenRefreshVars,
};
use super::{ProfileApi, UpdateOutcome};
use crate::config::ClientConfig;
use crate::context::Credentials;
use crate::error::ApiError;
use crate::profile::Profile;

/// Profile API client speaking JSON-over-HTTP GraphQL.
#[derive(Clone, Debug)]
pub struct GraphqlProfileClient {
    http: reqwest::Client,
    endpoint: String,
}

impl GraphqlProfileClient {
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    #[must_use]
    pub fn with_client(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self { http, endpoint: endpoint.into() }
    }

    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.graphql_url.clone())
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: Operation,
        variables: Option<serde_json::Value>,
        credentials: Option<&Credentials>,
    ) -> Result<T, ApiError> {
        let body = GraphqlRequest::new(operation, variables);
        let mut request = self.http.post(&self.endpoint).json(&body);
        if let Some(credentials) = credentials {
            request = request.header(AUTHORIZATION, credentials.authorization());
        }

        let resp = request
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        let status = resp.status().as_u16();
        let text = resp
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        tracing::debug!(operation = operation.name(), status, "graphql response");
        decode_response(operation, status, &text)
    }
}

#[async_trait]
impl ProfileApi for GraphqlProfileClient {
    async fn fetch_profile(&self, credentials: Option<&Credentials>) -> Result<Profile, ApiError> {
        let data: CurrentProfileData = self
            .execute(Operation::CurrentProfile, None, credentials)
            .await?;
        data.current_profile
            .ok_or(ApiError::MissingData("currentProfile"))
    }

    async fn update_profile(
        &self,
        profile: &Profile,
        credentials: Option<&Credentials>,
    ) -> Result<UpdateOutcome, ApiError> {
        let vars = to_variables(&ProfileUpdateVars::from(profile))?;
        let data: ProfileUpdateData = self
            .execute(Operation::ProfileUpdate, Some(vars), credentials)
            .await?;
        let MutationPayload { ok, user } = data.profile_update;
        let profile = user.ok_or(ApiError::MissingData("profileUpdate.user"))?;
        Ok(UpdateOutcome { ok, profile })
    }

    async fn refresh_token(
        &self,
        code: &str,
        credentials: Option<&Credentials>,
    ) -> Result<MutationPayload, ApiError> {
        let vars = to_variables(&TokenRefreshVars { code: code.to_owned() })?;
        let data: TokenRefreshData = self
            .execute(Operation::TokenRefresh, Some(vars), credentials)
            .await?;
        Ok(data.token_refresh)
    }
}

fn to_variables<T: serde::Serialize>(vars: &T) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(vars).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Turn a raw HTTP status and body into the operation's `data` payload.
fn decode_response<T: DeserializeOwned>(operation: Operation, status: u16, body: &str) -> Result<T, ApiError> {
    if !(200..300).contains(&status) {
        return Err(ApiError::Status { status, messages: error_messages(body) });
    }

    let envelope: GraphqlResponse<T> = serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))?;
    if !envelope.errors.is_empty() {
        return Err(ApiError::Graphql(envelope.errors.into_iter().map(|e| e.message).collect()));
    }
    envelope
        .data
        .ok_or(ApiError::MissingData(operation.root_field()))
}

/// Best-effort extraction of error messages from a failed response body.
fn error_messages(body: &str) -> Vec<String> {
    match serde_json::from_str::<GraphqlResponse<serde_json::Value>>(body) {
        Ok(envelope) if !envelope.errors.is_empty() => envelope.errors.into_iter().map(|e| e.message).collect(),
        _ if body.trim().is_empty() => Vec::new(),
        _ => vec![body.trim().to_owned()],
    }
}
