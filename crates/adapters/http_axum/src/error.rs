//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use techserv_domain::error::{CredentialError, NotFoundError, TechServError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    /// One message per offending record of a rejected batch.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    violations: Vec<String>,
}

/// Maps [`TechServError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(TechServError);

impl ApiError {
    /// A path segment or header that should have held an identifier.
    #[must_use]
    pub fn invalid_id(raw: &str) -> Self {
        Self(ValidationError::InvalidIdentifier(raw.to_string()).into())
    }

    /// A workflow action name that does not exist.
    #[must_use]
    pub fn unknown_action(action: &str) -> Self {
        Self(
            NotFoundError {
                entity: "WorkflowAction",
                id: action.to_string(),
            }
            .into(),
        )
    }
}

impl From<TechServError> for ApiError {
    fn from(err: TechServError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

fn status_of(err: &TechServError) -> StatusCode {
    match err {
        TechServError::Validation(_) | TechServError::Credential(CredentialError::Missing { .. }) => {
            StatusCode::BAD_REQUEST
        }
        TechServError::NotFound(_) => StatusCode::NOT_FOUND,
        TechServError::Workflow(_) | TechServError::Batch(_) => StatusCode::CONFLICT,
        TechServError::Sequence(_) | TechServError::Configuration(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        TechServError::Authorization(_) => StatusCode::FORBIDDEN,
        TechServError::Credential(CredentialError::Hashing(_))
        | TechServError::Report(_)
        | TechServError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_of(&self.0);
        let body = match &self.0 {
            TechServError::Batch(batch) => ErrorBody {
                error: self.0.to_string(),
                violations: batch.violations.iter().map(ToString::to_string).collect(),
            },
            err if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!(error = %err, "request failed");
                ErrorBody {
                    error: "internal server error".to_string(),
                    violations: Vec::new(),
                }
            }
            err => {
                tracing::debug!(error = %err, %status, "request rejected");
                ErrorBody {
                    error: err.to_string(),
                    violations: Vec::new(),
                }
            }
        };

        (status, Json(body)).into_response()
    }
}
