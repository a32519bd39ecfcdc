use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Custom error types for the library.
///
/// The first eight variants are the per-request taxonomy that boundary layers
/// render to callers. The remaining variants can only occur while loading
/// templates, reading documents, or building HTTP clients.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("No template is registered for document type '{0}'")]
    UnknownTemplateKind(String),
    #[error("Document content is empty or only whitespace")]
    EmptyContent,
    #[error("Authentication with the AI provider failed: {0}")]
    AuthenticationFailed(String),
    #[error("AI provider is rate limiting requests{}: {message}", format_retry_after(.retry_after))]
    RateLimited {
        retry_after: Option<Duration>,
        message: String,
    },
    #[error("AI provider did not respond within {0:?}")]
    Timeout(Duration),
    #[error("AI provider error: {0}")]
    UpstreamError(String),
    #[error("Model response is not valid JSON: {0}")]
    MalformedJson(String),
    #[error("Model response for '{document_type}' is missing required keys: {}", .missing.join(", "))]
    SchemaMismatch {
        document_type: String,
        missing: Vec<String>,
    },

    #[error("Template '{kind}' is invalid: {reason}")]
    InvalidTemplate { kind: String, reason: String },
    #[error("A template is already registered for document type '{0}'")]
    DuplicateTemplate(String),
    #[error("Unsupported document format: {0}")]
    UnsupportedDocument(String),
    #[error("Failed to extract text from document: {0}")]
    DocumentParse(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
}

fn format_retry_after(retry_after: &Option<Duration>) -> String {
    match retry_after {
        Some(d) => format!(" (retry after {}s)", d.as_secs()),
        None => String::new(),
    }
}

/// A serializable discriminant of `PromptError`, used by boundary layers to
/// render errors distinctly without exposing the error's payload type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    UnknownTemplateKind,
    EmptyContent,
    AuthenticationFailed,
    RateLimited,
    Timeout,
    UpstreamError,
    MalformedJson,
    SchemaMismatch,
    InvalidTemplate,
    DuplicateTemplate,
    UnsupportedDocument,
    DocumentParse,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl PromptError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PromptError::UnknownTemplateKind(_) => ErrorKind::UnknownTemplateKind,
            PromptError::EmptyContent => ErrorKind::EmptyContent,
            PromptError::AuthenticationFailed(_) => ErrorKind::AuthenticationFailed,
            PromptError::RateLimited { .. } => ErrorKind::RateLimited,
            PromptError::Timeout(_) => ErrorKind::Timeout,
            PromptError::UpstreamError(_) => ErrorKind::UpstreamError,
            PromptError::MalformedJson(_) => ErrorKind::MalformedJson,
            PromptError::SchemaMismatch { .. } => ErrorKind::SchemaMismatch,
            PromptError::InvalidTemplate { .. } => ErrorKind::InvalidTemplate,
            PromptError::DuplicateTemplate(_) => ErrorKind::DuplicateTemplate,
            PromptError::UnsupportedDocument(_) => ErrorKind::UnsupportedDocument,
            PromptError::DocumentParse(_) => ErrorKind::DocumentParse,
            PromptError::Io(_) | PromptError::ReqwestClientBuild(_) => ErrorKind::Internal,
        }
    }

    /// Whether a caller may reasonably retry the same request later.
    ///
    /// The library itself never retries.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PromptError::RateLimited { .. } | PromptError::Timeout(_) | PromptError::UpstreamError(_)
        )
    }
}
