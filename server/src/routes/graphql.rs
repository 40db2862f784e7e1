//! GraphQL endpoint handlers.
//!
//! SYSTEM CONTEXT
//! ==============
//! `POST /graphql` accepts a JSON `{query, variables, operationName}` body,
//! or a raw document with `Content-Type: application/graphql`.
//! `GET /graphql?query=...` carries the document in the query string.
//! Every request is authenticated before it is resolved.
//!
//! Authentication failures answer with a plain-text status (403 in the
//! common case). Resolver failures answer 400 with `{errors: [{message}]}`;
//! success answers 200 with `{data}`.

#[cfg(test)]
#[path = "graphql_test.rs"]
mod tests;

use account::api::wire::{GraphqlRequest, GraphqlResponse};
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

use crate::services::{caller, resolver};
use crate::state::AppState;

const GRAPHQL_CONTENT_TYPE: &str = "application/graphql";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlQuery {
    query: String,
    #[serde(default)]
    variables: Option<String>,
    #[serde(default)]
    operation_name: Option<String>,
}

/// `GET /graphql`
pub async fn graphql_get(State(state): State<AppState>, headers: HeaderMap, Query(params): Query<GraphqlQuery>) -> Response {
    let variables = match params.variables.as_deref().map(serde_json::from_str).transpose() {
        Ok(variables) => variables,
        Err(e) => return bad_request(&format!("invalid variables: {e}")),
    };
    let request = GraphqlRequest { query: params.query, variables, operation_name: params.operation_name };
    respond(&state, &headers, request).await
}

/// `POST /graphql`
pub async fn graphql_post(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    match parse_body(&headers, &body) {
        Ok(request) => respond(&state, &headers, request).await,
        Err(message) => bad_request(&message),
    }
}

/// Decode a POST body according to its content type.
fn parse_body(headers: &HeaderMap, body: &[u8]) -> Result<GraphqlRequest, String> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if content_type.starts_with(GRAPHQL_CONTENT_TYPE) {
        let query = std::str::from_utf8(body).map_err(|e| format!("invalid document: {e}"))?;
        return Ok(GraphqlRequest { query: query.to_owned(), variables: None, operation_name: None });
    }

    serde_json::from_slice(body).map_err(|e| format!("invalid request body: {e}"))
}

async fn respond(state: &AppState, headers: &HeaderMap, request: GraphqlRequest) -> Response {
    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    let caller = match caller::authenticate(state.store.as_ref(), state.authority.as_ref(), header).await {
        Ok(caller) => caller,
        Err(e) => {
            tracing::warn!(error = %e, "graphql caller rejected");
            return (e.status(), e.to_string()).into_response();
        }
    };

    match resolver::execute(state, &caller, &request).await {
        Ok(data) => Json(GraphqlResponse::data(data)).into_response(),
        Err(e) => {
            tracing::warn!(gid = %caller.gid, query = %request.query, error = %e, "graphql request failed");
            bad_request(&e.to_string())
        }
    }
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(GraphqlResponse::<serde_json::Value>::error(message))).into_response()
}
