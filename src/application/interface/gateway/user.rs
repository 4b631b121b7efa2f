use crate::{
    application::{
        app_error::AppResult,
        dto::pagination::{PaginatedResponse, QueryParams},
    },
    domain::entities::{id::Id, user::User},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait UserWriter: Send + Sync {
    async fn insert(&self, user: User) -> AppResult<Id<User>>;
    async fn update(&self, user: User) -> AppResult<()>;
    /// Returns `false` when no row matched.
    async fn delete(&self, user_id: &Id<User>) -> AppResult<bool>;
    async fn soft_delete(&self, user_id: &Id<User>, deleted_at: DateTime<Utc>) -> AppResult<bool>;
}

#[async_trait]
pub trait UserReader: Send + Sync {
    async fn find_by_id(&self, user_id: &Id<User>) -> AppResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn find_page(&self, params: &QueryParams) -> AppResult<PaginatedResponse<User>>;
}
