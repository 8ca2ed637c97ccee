//! Desktop adapter error types.

use astral_domain::error::ServiceError;

/// Errors specific to the desktop adapter.
#[derive(Debug, thiserror::Error)]
pub enum DesktopError {
    #[error("no application matches {0:?}")]
    UnknownApp(String),

    #[error("failed to start {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The command ran but exited unsuccessfully.
    #[error("{program} exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("{program} did not finish in time")]
    Timeout { program: String },

    #[error("{0}")]
    Unsupported(&'static str),

    #[error("failed to read {path}")]
    Read {
        path: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("unexpected format in {0}")]
    Format(&'static str),
}

impl DesktopError {
    /// Convert into a [`ServiceError`] for propagation across the ports.
    #[must_use]
    pub fn into_service(self) -> ServiceError {
        match self {
            Self::UnknownApp(name) => ServiceError::NotFound(name),
            Self::Spawn { program, source } => match source.kind() {
                std::io::ErrorKind::NotFound => ServiceError::NotFound(program),
                std::io::ErrorKind::PermissionDenied => ServiceError::PermissionDenied(program),
                _ => ServiceError::Failure(format!("failed to start {program}: {source}")),
            },
            Self::Timeout { .. } => ServiceError::Timeout,
            Self::Unsupported(what) => ServiceError::Unsupported(what),
            other => ServiceError::Failure(other.to_string()),
        }
    }
}

impl From<DesktopError> for ServiceError {
    fn from(err: DesktopError) -> Self {
        err.into_service()
    }
}
