use std::fmt;

use axum::extract::rejection::JsonRejection;
use axum::http::header::InvalidHeaderValue;
use thiserror::Error;
use validator::ValidationErrors;

/// Which of the two pagination queries failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStage {
    Count,
    Fetch,
}

impl fmt::Display for QueryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryStage::Count => f.write_str("get total count"),
            QueryStage::Fetch => f.write_str("fetch data"),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("failed to {stage}: {source}")]
    QueryFailed {
        stage: QueryStage,
        #[source]
        source: sqlx::Error,
    },

    #[error("{0}")]
    InvalidId(String),

    #[error("Invalid query parameter `{field}`: {reason}")]
    InvalidQueryParam { field: String, reason: String },

    #[error("Validation failed: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("Invalid request body: {0}")]
    JsonRejection(#[from] JsonRejection),

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Failed to issue token: {0}")]
    TokenIssueFailed(String),

    #[error("Failed to hash password")]
    PasswordHashError,

    #[error("User not found")]
    UserNotFound,

    #[error("Username already exists")]
    UsernameAlreadyExists,

    #[error("Email already exists")]
    EmailAlreadyExists,

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] InvalidHeaderValue),
}

pub type AppResult<T> = Result<T, AppError>;
