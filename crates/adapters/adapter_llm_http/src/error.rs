//! LLM adapter error types.

use astral_domain::error::ServiceError;

/// Errors specific to the HTTP LLM adapter.
#[derive(Debug, thiserror::Error)]
pub enum LlmHttpError {
    /// A cloud provider was selected without an API key.
    #[error("no API key configured for {0}")]
    MissingApiKey(&'static str),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    Build(#[source] reqwest::Error),

    /// Transport or body-decoding failure.
    #[error("HTTP request failed")]
    Http(#[source] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response parsed but carried no text.
    #[error("provider returned no content")]
    EmptyReply,
}

impl LlmHttpError {
    /// Convert into a [`ServiceError`] for propagation across the port.
    #[must_use]
    pub fn into_service(self) -> ServiceError {
        match self {
            Self::MissingApiKey(_) => ServiceError::NotConfigured("LLM API key"),
            Self::Http(err) if err.is_timeout() => ServiceError::Timeout,
            Self::Status {
                status: 401 | 403,
                body,
            } => ServiceError::PermissionDenied(body),
            Self::Http(err) => ServiceError::Failure(format!("LLM request failed: {err}")),
            other => ServiceError::Failure(other.to_string()),
        }
    }
}

impl From<LlmHttpError> for ServiceError {
    fn from(err: LlmHttpError) -> Self {
        err.into_service()
    }
}
