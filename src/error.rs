use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Error taxonomy shared by every handler. Each variant maps to a stable
/// machine-readable kind in the JSON body, so clients can branch on it
/// without parsing the human-readable message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    SelfAction(String),
    #[error("{0}")]
    DuplicateAction(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Authentication(String),
    #[error("{0}")]
    Authorization(String),
    #[error(transparent)]
    Dependency(#[from] anyhow::Error),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation",
            ApiError::SelfAction(_) => "self_action",
            ApiError::DuplicateAction(_) => "duplicate_action",
            ApiError::NotFound(_) => "not_found",
            ApiError::Authentication(_) => "authentication",
            ApiError::Authorization(_) => "authorization",
            ApiError::Dependency(_) => "dependency",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::SelfAction(_) => StatusCode::BAD_REQUEST,
            ApiError::DuplicateAction(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ApiError::Authorization(_) => StatusCode::FORBIDDEN,
            ApiError::Dependency(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Dependency(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Store/driver detail stays in the logs, never in the response body.
        let message = match &self {
            ApiError::Dependency(e) => {
                error!(error = %e, "dependency failure");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        let body = Json(json!({ "error": self.kind(), "message": message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_taxonomy() {
        assert_eq!(
            ApiError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::SelfAction("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::DuplicateAction("x".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Authentication("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Authorization("x".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::Dependency(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn kinds_are_stable() {
        assert_eq!(ApiError::Validation("x".into()).kind(), "validation");
        assert_eq!(ApiError::DuplicateAction("x".into()).kind(), "duplicate_action");
        assert_eq!(ApiError::Dependency(anyhow::anyhow!("boom")).kind(), "dependency");
    }
}
