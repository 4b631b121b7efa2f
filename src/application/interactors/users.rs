use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::application::app_error::{AppError, AppResult};
use crate::application::dto::id::IdDTO;
use crate::application::dto::pagination::{PaginatedResponse, QueryParams};
use crate::application::dto::user::{CreateUserDTO, UpdateUserDTO, UserDTO};
use crate::application::interactors::evict_cached_user;
use crate::application::interface::cache::CacheStore;
use crate::application::interface::crypto::CredentialsHasher;
use crate::application::interface::db::DBSession;
use crate::application::interface::gateway::user::{UserReader, UserWriter};
use crate::domain::entities::id::Id;
use crate::domain::entities::user::User;

async fn ensure_unique(
    user_reader: &dyn UserReader,
    username: &str,
    email: &str,
    current: Option<&Id<User>>,
) -> AppResult<()> {
    if let Some(existing) = user_reader.find_by_username(username).await? {
        if current != Some(&existing.id) {
            warn!("Username {} is already taken", username);
            return Err(AppError::UsernameAlreadyExists);
        }
    }
    if let Some(existing) = user_reader.find_by_email(email).await? {
        if current != Some(&existing.id) {
            warn!("Email {} is already taken", email);
            return Err(AppError::EmailAlreadyExists);
        }
    }
    Ok(())
}

async fn find_active(user_reader: &dyn UserReader, user_id: &Id<User>) -> AppResult<User> {
    user_reader
        .find_by_id(user_id)
        .await?
        .filter(|user| !user.is_deleted)
        .ok_or(AppError::UserNotFound)
}

/// Serves both self-registration and admin-side creation; the role comes from the caller.
#[derive(Clone)]
pub struct CreateUserInteractor {
    db_session: Arc<dyn DBSession>,
    user_reader: Arc<dyn UserReader>,
    user_writer: Arc<dyn UserWriter>,
    hasher: Arc<dyn CredentialsHasher>,
}

impl CreateUserInteractor {
    pub fn new(
        db_session: Arc<dyn DBSession>,
        user_reader: Arc<dyn UserReader>,
        user_writer: Arc<dyn UserWriter>,
        hasher: Arc<dyn CredentialsHasher>,
    ) -> Self {
        Self {
            db_session,
            user_reader,
            user_writer,
            hasher,
        }
    }

    pub async fn execute(&self, dto: CreateUserDTO) -> AppResult<UserDTO> {
        ensure_unique(self.user_reader.as_ref(), &dto.username, &dto.email, None).await?;
        let hashed_password = self.hasher.hash_password(&dto.password).await?;
        let user = User::new(dto.username, dto.email, hashed_password, dto.name, dto.role);
        self.user_writer.insert(user.clone()).await?;
        self.db_session.commit().await?;
        info!("User {} created with role {}", user.username, user.role);
        Ok(user.into())
    }
}

#[derive(Clone)]
pub struct GetUserInteractor {
    user_reader: Arc<dyn UserReader>,
}

impl GetUserInteractor {
    pub fn new(user_reader: Arc<dyn UserReader>) -> Self {
        Self { user_reader }
    }

    pub async fn execute(&self, dto: IdDTO) -> AppResult<UserDTO> {
        let user_id: Id<User> = dto.id.try_into()?;
        let user = find_active(self.user_reader.as_ref(), &user_id).await?;
        Ok(user.into())
    }
}

#[derive(Clone)]
pub struct ListUsersInteractor {
    user_reader: Arc<dyn UserReader>,
}

impl ListUsersInteractor {
    pub fn new(user_reader: Arc<dyn UserReader>) -> Self {
        Self { user_reader }
    }

    pub async fn execute(&self, params: QueryParams) -> AppResult<PaginatedResponse<UserDTO>> {
        let page = self.user_reader.find_page(&params).await?;
        Ok(page.map(UserDTO::from))
    }
}

#[derive(Clone)]
pub struct UpdateUserInteractor {
    db_session: Arc<dyn DBSession>,
    user_reader: Arc<dyn UserReader>,
    user_writer: Arc<dyn UserWriter>,
    hasher: Arc<dyn CredentialsHasher>,
    cache: Arc<dyn CacheStore>,
}

impl UpdateUserInteractor {
    pub fn new(
        db_session: Arc<dyn DBSession>,
        user_reader: Arc<dyn UserReader>,
        user_writer: Arc<dyn UserWriter>,
        hasher: Arc<dyn CredentialsHasher>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        Self {
            db_session,
            user_reader,
            user_writer,
            hasher,
            cache,
        }
    }

    pub async fn execute(&self, dto: UpdateUserDTO) -> AppResult<UserDTO> {
        let user_id: Id<User> = dto.id.try_into()?;
        let mut user = find_active(self.user_reader.as_ref(), &user_id).await?;
        ensure_unique(self.user_reader.as_ref(), &dto.username, &dto.email, Some(&user.id)).await?;

        if let Some(password) = dto.password {
            user.password = self.hasher.hash_password(&password).await?;
        }
        user.username = dto.username;
        user.email = dto.email;
        user.name = dto.name;
        user.role = dto.role;
        user.updated_at = Utc::now();

        self.user_writer.update(user.clone()).await?;
        self.db_session.commit().await?;
        evict_cached_user(self.cache.as_ref(), &user.id.to_string()).await;
        info!("User {} updated", user.id);
        Ok(user.into())
    }
}

#[derive(Clone)]
pub struct DeleteUserInteractor {
    db_session: Arc<dyn DBSession>,
    user_writer: Arc<dyn UserWriter>,
    cache: Arc<dyn CacheStore>,
}

impl DeleteUserInteractor {
    pub fn new(
        db_session: Arc<dyn DBSession>,
        user_writer: Arc<dyn UserWriter>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        Self {
            db_session,
            user_writer,
            cache,
        }
    }

    pub async fn execute(&self, dto: IdDTO) -> AppResult<()> {
        let user_id: Id<User> = dto.id.try_into()?;
        if !self.user_writer.delete(&user_id).await? {
            return Err(AppError::UserNotFound);
        }
        self.db_session.commit().await?;
        evict_cached_user(self.cache.as_ref(), &user_id.to_string()).await;
        info!("User {} deleted", user_id);
        Ok(())
    }
}

#[derive(Clone)]
pub struct SoftDeleteUserInteractor {
    db_session: Arc<dyn DBSession>,
    user_writer: Arc<dyn UserWriter>,
    cache: Arc<dyn CacheStore>,
}

impl SoftDeleteUserInteractor {
    pub fn new(
        db_session: Arc<dyn DBSession>,
        user_writer: Arc<dyn UserWriter>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        Self {
            db_session,
            user_writer,
            cache,
        }
    }

    pub async fn execute(&self, dto: IdDTO) -> AppResult<()> {
        let user_id: Id<User> = dto.id.try_into()?;
        if !self.user_writer.soft_delete(&user_id, Utc::now()).await? {
            return Err(AppError::UserNotFound);
        }
        self.db_session.commit().await?;
        evict_cached_user(self.cache.as_ref(), &user_id.to_string()).await;
        info!("User {} soft-deleted", user_id);
        Ok(())
    }
}
