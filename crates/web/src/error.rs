use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use tournament::{EngineError, StoreError};
use validator::ValidationErrors;

/// Web layer errors
#[derive(Debug)]
pub enum WebError {
    Engine(EngineError),
    Validation(ValidationErrors),
    BadRequest(String),
    Unauthorized,
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Engine(e) => write!(f, "Engine error: {}", e),
            Self::Validation(e) => write!(f, "Validation error: {}", e),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::Unauthorized => write!(f, "Unauthorized"),
        }
    }
}

impl WebError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Engine(e) if e.is_validation() => StatusCode::BAD_REQUEST,
            Self::Engine(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            Self::Engine(EngineError::PredictionsLocked(_)) => StatusCode::FORBIDDEN,
            Self::Engine(EngineError::WriteConflict(_))
            | Self::Engine(EngineError::Store(StoreError::DuplicateParticipant(_))) => {
                StatusCode::CONFLICT
            }
            Self::Engine(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let body = match &self {
            Self::Engine(e) if status_code == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("Engine error: {:?}", e);
                json!({
                    "error": "An internal error occurred"
                })
            }
            Self::Engine(e) => {
                json!({
                    "error": e.to_string()
                })
            }
            Self::Validation(errors) => {
                let field_errors: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, errors)| {
                        errors.iter().map(move |e| {
                            format!(
                                "{}: {}",
                                field,
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string())
                            )
                        })
                    })
                    .collect();

                json!({
                    "error": "Validation failed",
                    "details": field_errors
                })
            }
            Self::BadRequest(msg) => {
                json!({
                    "error": msg
                })
            }
            Self::Unauthorized => {
                json!({
                    "error": "Unauthorized"
                })
            }
        };

        (status_code, Json(body)).into_response()
    }
}

impl From<EngineError> for WebError {
    fn from(error: EngineError) -> Self {
        Self::Engine(error)
    }
}

impl From<ValidationErrors> for WebError {
    fn from(error: ValidationErrors) -> Self {
        Self::Validation(error)
    }
}
