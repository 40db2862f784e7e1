//! Caller authentication for the GraphQL endpoint.
//!
//! ARCHITECTURE
//! ============
//! The `authorization` header carries `"<gid>:<access token>"`. The token
//! is verified with the `TokenAuthority` while the caller's record is
//! loaded; the two run concurrently. A verified caller without a record is
//! registered on the spot as `unregistered`, and a caller presenting a new
//! access token has it stored.

#[cfg(test)]
#[path = "caller_test.rs"]
mod tests;

use axum::http::StatusCode;

use crate::services::google::{AuthorityError, TokenAuthority};
use crate::store::{ProfileStore, StoreError, UserRecord};

/// Authenticated caller of a GraphQL request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub gid: String,
    pub record: UserRecord,
}

impl Caller {
    #[must_use]
    pub fn role(&self) -> i32 {
        self.record.role
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthFailure {
    #[error("Malformed auth: {0}")]
    Malformed(String),
    #[error(transparent)]
    Unverified(#[from] AuthorityError),
    #[error("Token was not issued for the calling user")]
    WrongSubject,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthFailure {
    /// HTTP status the endpoint answers with.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Malformed(_) | Self::Unverified(_) | Self::WrongSubject => StatusCode::FORBIDDEN,
        }
    }
}

/// Split an `authorization` header into `(gid, access_token)` at the first `:`.
///
/// # Errors
///
/// Returns [`AuthFailure::Malformed`] when the header is absent, has no `:`
/// or either side is empty.
pub fn parse_authorization(header: Option<&str>) -> Result<(&str, &str), AuthFailure> {
    let Some(raw) = header else {
        return Err(AuthFailure::Malformed("missing authorization header".to_owned()));
    };
    match raw.split_once(':') {
        Some((gid, token)) if !gid.is_empty() && !token.is_empty() => Ok((gid, token)),
        _ => Err(AuthFailure::Malformed(raw.to_owned())),
    }
}

/// Verify the caller and load (or create) their record.
///
/// # Errors
///
/// See [`AuthFailure`]; every variant except `Store` maps to 403.
pub async fn authenticate(
    store: &dyn ProfileStore,
    authority: &dyn TokenAuthority,
    header: Option<&str>,
) -> Result<Caller, AuthFailure> {
    let (gid, token) = parse_authorization(header)?;

    let (record, info) = tokio::join!(store.get(gid), authority.verify_token(token));
    let info = info?;
    if info.sub != gid {
        return Err(AuthFailure::WrongSubject);
    }
    tracing::debug!(
        %gid,
        scope = %info.scope,
        expiry = info.expiry,
        email_verified = info.email_verified,
        offline = info.offline,
        "token verified"
    );

    let record = match record? {
        None => {
            let record = UserRecord::first_contact(gid, &info.email, token);
            store.put(&record).await?;
            tracing::info!(%gid, email = %record.email, "registered new user");
            record
        }
        Some(mut record) if record.token.as_deref() != Some(token) => {
            record.token = Some(token.to_owned());
            store.put(&record).await?;
            tracing::debug!(%gid, "stored new access token");
            record
        }
        Some(record) => record,
    };

    Ok(Caller { gid: gid.to_owned(), record })
}
