//! Error types for the account crate.

/// Errors from the remote profile API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request could not be sent or its body not read.
    #[error("request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status.
    #[error("server responded {status}: {}", .messages.join("; "))]
    Status { status: u16, messages: Vec<String> },

    /// The response carried a GraphQL `errors` payload.
    #[error("graphql errors: {}", .0.join("; "))]
    Graphql(Vec<String>),

    /// The response had neither `data` nor `errors`.
    #[error("response missing data for {0}")]
    MissingData(&'static str),

    /// The response body could not be decoded.
    #[error("response decode failed: {0}")]
    Decode(String),
}

/// Errors from the identity provider.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The client library has not finished initializing.
    #[error("identity provider not initialized")]
    NotInitialized,

    /// The user closed or denied the consent/sign-in dialog.
    #[error("sign-in cancelled: {0}")]
    Cancelled(String),

    /// Any other provider-side failure.
    #[error("identity provider error: {0}")]
    Provider(String),
}

/// Errors from session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors from the account form.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// Submit was attempted before a profile was available.
    #[error("form has no profile yet")]
    NotReady,

    /// The session's profile changed to another user (or went away) since
    /// the draft was built. The form has been reset.
    #[error("form draft no longer matches the session profile")]
    Stale,

    /// The session went away while the form waited for a profile.
    #[error("session closed before a profile arrived")]
    SessionClosed,

    #[error(transparent)]
    Session(#[from] SessionError),
}
