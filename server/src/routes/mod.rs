//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the GraphQL endpoint and the front-end bundle under a
//! single Axum router. The single-page app is entered through `/`, `/user`
//! and `/project`, which all serve the bundle's `index.html`; its scripts
//! and assets are served from `/app` and `/assets`.

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

pub mod graphql;

use std::path::Path;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use regex::Regex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let bundle_dir = state.bundle_dir.clone();

    Router::new()
        .route("/graphql", get(graphql::graphql_get).post(graphql::graphql_post))
        .route("/", get(index))
        .route("/user", get(index))
        .route("/project", get(index))
        .route("/healthz", get(healthz))
        .nest_service("/app", ServeDir::new(&bundle_dir))
        .nest_service("/assets", ServeDir::new(bundle_dir.join("assets")))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Point bare `*.bundle.js` script references at `/app`.
///
/// # Errors
///
/// Returns an error if the rewrite pattern fails to compile.
pub fn rewrite_bundle_paths(html: &str) -> Result<String, regex::Error> {
    let re = Regex::new(r#""(\w+\.bundle\.js)""#)?;
    Ok(re.replace_all(html, r#""app/$1""#).into_owned())
}

async fn read_index(bundle_dir: &Path) -> Result<String, String> {
    let html = tokio::fs::read_to_string(bundle_dir.join("index.html"))
        .await
        .map_err(|e| format!("index.html unavailable: {e}"))?;
    rewrite_bundle_paths(&html).map_err(|e| e.to_string())
}

/// `GET /`, `/user`, `/project`
async fn index(State(state): State<AppState>) -> Response {
    match read_index(&state.bundle_dir).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!(error = %e, bundle_dir = %state.bundle_dir.display(), "index render failed");
            (StatusCode::NOT_FOUND, "front-end bundle not found").into_response()
        }
    }
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
