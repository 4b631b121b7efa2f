use crate::application::app_error::AppResult;
use crate::domain::entities::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    /// Lifetime in seconds.
    pub expires_in: i64,
}

pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user: &User, kind: TokenKind) -> AppResult<IssuedToken>;
    /// Checks signature, expiry and kind; returns the subject user id.
    fn verify(&self, token: &str, kind: TokenKind) -> AppResult<String>;
}
