use axum::{
    extract::rejection::JsonRejection,
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use metaprompt::{ErrorKind, PromptError};
use serde::Serialize;
use tracing::{error, warn};

/// A custom error type for the server application.
///
/// This enum encapsulates different kinds of errors that can occur within the server,
/// allowing them to be converted into appropriate HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Errors originating from the `metaprompt` library.
    Prompt(PromptError),
    /// A request that could not be understood, e.g. a missing multipart field.
    BadRequest(String),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

/// The error body returned by every endpoint.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error_kind: String,
    pub message: String,
}

impl From<PromptError> for AppError {
    fn from(err: PromptError) -> Self {
        AppError::Prompt(err)
    }
}

/// A body the `Json` extractor could not read: bad syntax, a wrong content
/// type, or missing fields.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

/// The HTTP status for each error kind.
///
/// Problems with the caller's input are 4xx. A provider rejecting our
/// credentials is a server misconfiguration. Unusable model output is a bad
/// gateway.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::UnknownTemplateKind
        | ErrorKind::EmptyContent
        | ErrorKind::UnsupportedDocument
        | ErrorKind::DocumentParse => StatusCode::BAD_REQUEST,
        ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::UpstreamError | ErrorKind::MalformedJson | ErrorKind::SchemaMismatch => {
            StatusCode::BAD_GATEWAY
        }
        ErrorKind::AuthenticationFailed
        | ErrorKind::InvalidTemplate
        | ErrorKind::DuplicateTemplate
        | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut retry_after = None;
        let (status_code, body) = match self {
            AppError::Prompt(err) => {
                let kind = err.kind();
                if let PromptError::RateLimited {
                    retry_after: Some(delay),
                    ..
                } = &err
                {
                    retry_after = Some(delay.as_secs());
                }
                let status = status_for(kind);
                if status.is_server_error() {
                    error!(%kind, "PromptError: {:?}", err);
                } else {
                    warn!(%kind, "Rejected request: {}", err);
                }
                let message = match kind {
                    ErrorKind::AuthenticationFailed => {
                        "Server is not configured correctly: the AI provider rejected its credentials."
                            .to_string()
                    }
                    ErrorKind::Internal => "An internal server error occurred.".to_string(),
                    _ => err.to_string(),
                };
                (
                    status,
                    ErrorBody {
                        error_kind: kind.to_string(),
                        message,
                    },
                )
            }
            AppError::BadRequest(message) => {
                warn!("Bad request: {}", message);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorBody {
                        error_kind: "InvalidRequest".to_string(),
                        message,
                    },
                )
            }
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error_kind: ErrorKind::Internal.to_string(),
                        message: "An internal server error occurred.".to_string(),
                    },
                )
            }
        };

        let mut response = (status_code, Json(body)).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}
