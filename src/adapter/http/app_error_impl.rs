use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;
use utoipa::ToSchema;
use validator::ValidationErrors;

use crate::application::app_error::AppError;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `error`.
    pub status: String,
    pub message: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
}

fn validation_details(errors: &ValidationErrors) -> Value {
    let fields: BTreeMap<String, Vec<String>> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let messages = errors
                .iter()
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => e.code.to_string(),
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect();
    json!(fields)
}

fn taken(field: &str) -> Option<Value> {
    Some(json!({ "field": field, "reason": "already_taken" }))
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::InvalidQueryParam { .. } | AppError::JsonRejection(_) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST")
            }
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::InvalidId(_) | AppError::InvalidRole(_) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST")
            }
            AppError::InvalidCredentials
            | AppError::Unauthenticated
            | AppError::InvalidToken
            | AppError::TokenExpired => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::UsernameAlreadyExists => (StatusCode::CONFLICT, "USERNAME_EXISTS"),
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "EMAIL_EXISTS"),
            AppError::DatabaseError(_)
            | AppError::QueryFailed { .. }
            | AppError::PasswordHashError
            | AppError::TokenIssueFailed(_)
            | AppError::CacheError(_)
            | AppError::InvalidHeaderValue(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }

    pub fn to_error_response(&self) -> (StatusCode, ErrorResponse) {
        let (status, code) = self.status_and_code();
        let (message, details) = match self {
            AppError::InvalidQueryParam { field, reason } => (
                "Invalid query parameters".to_string(),
                Some(json!({ "field": field, "reason": reason })),
            ),
            AppError::JsonRejection(rejection) => (
                "Invalid request body".to_string(),
                Some(json!(rejection.body_text())),
            ),
            AppError::ValidationError(errors) => (
                "Validation failed".to_string(),
                Some(validation_details(errors)),
            ),
            AppError::UsernameAlreadyExists => (self.to_string(), taken("username")),
            AppError::EmailAlreadyExists => (self.to_string(), taken("email")),
            _ if status == StatusCode::INTERNAL_SERVER_ERROR => {
                error!("Request failed: {}", self);
                ("Internal server error".to_string(), None)
            }
            _ => (self.to_string(), None),
        };

        let body = ErrorResponse {
            status: "error".to_string(),
            message,
            code: code.to_string(),
            details,
        };
        (status, body)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.to_error_response();
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use validator::Validate;

    use super::*;
    use crate::application::app_error::QueryStage;

    #[derive(Validate)]
    struct Payload {
        #[validate(length(min = 3, message = "too short"))]
        username: String,
    }

    #[rstest]
    #[case(AppError::InvalidId("Invalid UUID: x".into()), StatusCode::BAD_REQUEST, "BAD_REQUEST")]
    #[case(AppError::Unauthenticated, StatusCode::UNAUTHORIZED, "UNAUTHORIZED")]
    #[case(AppError::TokenExpired, StatusCode::UNAUTHORIZED, "UNAUTHORIZED")]
    #[case(AppError::UserNotFound, StatusCode::NOT_FOUND, "NOT_FOUND")]
    #[case(AppError::EmailAlreadyExists, StatusCode::CONFLICT, "EMAIL_EXISTS")]
    #[case(AppError::PasswordHashError, StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")]
    fn test_status_and_code(#[case] error: AppError, #[case] status: StatusCode, #[case] code: &str) {
        let (actual, body) = error.to_error_response();

        assert_eq!(actual, status);
        assert_eq!(body.code, code);
        assert_eq!(body.status, "error");
    }

    #[rstest]
    fn test_query_failure_hides_cause() {
        let error = AppError::QueryFailed {
            stage: QueryStage::Count,
            source: sqlx::Error::PoolTimedOut,
        };

        let (status, body) = error.to_error_response();

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.message, "Internal server error");
        assert!(body.details.is_none());
    }

    #[rstest]
    fn test_invalid_query_param_has_field_details() {
        let error = AppError::InvalidQueryParam {
            field: "page".to_string(),
            reason: "must be an integer".to_string(),
        };

        let (status, body) = error.to_error_response();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "INVALID_REQUEST");
        assert_eq!(body.details.unwrap()["field"], "page");
    }

    #[rstest]
    fn test_validation_errors_are_listed_per_field() {
        let errors = Payload { username: "ab".to_string() }.validate().unwrap_err();

        let (status, body) = AppError::ValidationError(errors).to_error_response();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "VALIDATION_ERROR");
        assert_eq!(body.details.unwrap()["username"][0], "too short");
    }

    #[rstest]
    fn test_conflict_names_the_field() {
        let (_, body) = AppError::UsernameAlreadyExists.to_error_response();

        assert_eq!(body.message, "Username already exists");
        assert_eq!(body.details.unwrap(), json!({ "field": "username", "reason": "already_taken" }));
    }
}
