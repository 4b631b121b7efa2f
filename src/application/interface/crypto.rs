use async_trait::async_trait;

use crate::application::app_error::AppResult;

#[async_trait]
pub trait CredentialsHasher: Send + Sync {
    /// Returns a self-describing hash with its own salt.
    async fn hash_password(&self, password: &str) -> AppResult<String>;
    /// `Ok(false)` on mismatch; an unreadable stored hash is `InvalidCredentials`.
    async fn verify_password(&self, password: &str, hashed: &str) -> AppResult<bool>;
}
