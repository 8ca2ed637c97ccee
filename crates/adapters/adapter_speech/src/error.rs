//! Speech adapter error types.

use astral_domain::error::ServiceError;

/// Errors specific to the speech adapter.
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    /// The backend is switched off in configuration.
    #[error("{0} is disabled")]
    Disabled(&'static str),

    #[error("no API key configured for {0}")]
    MissingApiKey(&'static str),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    Build(#[source] reqwest::Error),

    /// Transport or body-decoding failure.
    #[error("HTTP request failed")]
    Http(#[source] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// An external program could not be started.
    #[error("failed to start {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Talking to a running process failed.
    #[error("process I/O failed")]
    Io(#[from] std::io::Error),

    /// An external program exited unsuccessfully.
    #[error("{program} failed: {stderr}")]
    ProcessFailed { program: String, stderr: String },

    /// Synthesised PCM could not be wrapped into WAV.
    #[error("failed to encode WAV")]
    Wav(#[source] hound::Error),

    /// The recorder was closed and will not capture again.
    #[error("recorder is closed")]
    Closed,
}

impl SpeechError {
    /// Convert into a [`ServiceError`] for propagation across the ports.
    #[must_use]
    pub fn into_service(self) -> ServiceError {
        match self {
            Self::Disabled(what) => ServiceError::NotConfigured(what),
            Self::MissingApiKey(_) => ServiceError::NotConfigured("speech API key"),
            Self::Http(err) if err.is_timeout() => ServiceError::Timeout,
            Self::Status {
                status: 401 | 403,
                body,
            } => ServiceError::PermissionDenied(body),
            Self::Spawn { program, source } => match source.kind() {
                std::io::ErrorKind::NotFound => ServiceError::NotFound(program),
                std::io::ErrorKind::PermissionDenied => ServiceError::PermissionDenied(program),
                _ => ServiceError::Failure(format!("failed to start {program}: {source}")),
            },
            Self::Http(err) => ServiceError::Failure(format!("speech request failed: {err}")),
            other => ServiceError::Failure(other.to_string()),
        }
    }
}

impl From<SpeechError> for ServiceError {
    fn from(err: SpeechError) -> Self {
        err.into_service()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn should_map_disabled_backend_to_not_configured() {
        let err: ServiceError = SpeechError::Disabled("whisper").into();
        assert_eq!(err, ServiceError::NotConfigured("whisper"));
    }

    #[test]
    fn should_map_missing_program_to_not_found() {
        let err: ServiceError = SpeechError::Spawn {
            program: "piper".to_string(),
            source: io::Error::from(io::ErrorKind::NotFound),
        }
        .into();
        assert_eq!(err, ServiceError::NotFound("piper".to_string()));
    }

    #[test]
    fn should_map_rejected_key_to_permission_denied() {
        let err: ServiceError = SpeechError::Status {
            status: 401,
            body: "invalid api key".to_string(),
        }
        .into();
        assert!(matches!(err, ServiceError::PermissionDenied(_)));
    }

    #[test]
    fn should_keep_stderr_in_process_failure() {
        let err: ServiceError = SpeechError::ProcessFailed {
            program: "piper".to_string(),
            stderr: "model not found".to_string(),
        }
        .into();
        assert_eq!(
            err,
            ServiceError::Failure("piper failed: model not found".to_string())
        );
    }
}
