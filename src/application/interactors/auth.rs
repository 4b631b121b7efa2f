use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::application::app_error::{AppError, AppResult};
use crate::application::dto::auth::{LoginDTO, LoginResultDTO, TokenPairDTO};
use crate::application::dto::id::IdDTO;
use crate::application::dto::user::UserDTO;
use crate::application::interactors::evict_cached_user;
use crate::application::interface::cache::{user_cache_key, CacheStore};
use crate::application::interface::crypto::CredentialsHasher;
use crate::application::interface::gateway::user::UserReader;
use crate::application::interface::token::{TokenIssuer, TokenKind};
use crate::domain::entities::id::Id;
use crate::domain::entities::user::User;

fn issue_pair(tokens: &dyn TokenIssuer, user: &User) -> AppResult<TokenPairDTO> {
    let access = tokens.issue(user, TokenKind::Access)?;
    let refresh = tokens.issue(user, TokenKind::Refresh)?;
    Ok(TokenPairDTO {
        access_token: access.token,
        refresh_token: refresh.token,
        token_type: "Bearer".to_string(),
        expires_in: access.expires_in,
        refresh_expires_in: refresh.expires_in,
    })
}

#[derive(Clone)]
pub struct LoginInteractor {
    user_reader: Arc<dyn UserReader>,
    hasher: Arc<dyn CredentialsHasher>,
    tokens: Arc<dyn TokenIssuer>,
}

impl LoginInteractor {
    pub fn new(
        user_reader: Arc<dyn UserReader>,
        hasher: Arc<dyn CredentialsHasher>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            user_reader,
            hasher,
            tokens,
        }
    }

    pub async fn execute(&self, dto: LoginDTO) -> AppResult<LoginResultDTO> {
        let user = self
            .user_reader
            .find_by_username(&dto.username)
            .await?
            .filter(|user| !user.is_deleted)
            .ok_or_else(|| {
                warn!("Login attempt with unknown username: {}", dto.username);
                AppError::InvalidCredentials
            })?;
        let is_valid = self.hasher.verify_password(&dto.password, &user.password).await?;
        if !is_valid {
            warn!("Invalid password for user: {}", user.username);
            return Err(AppError::InvalidCredentials);
        }
        let token = issue_pair(self.tokens.as_ref(), &user)?;
        info!("User {} logged in successfully", user.username);
        Ok(LoginResultDTO {
            user: user.into(),
            token,
        })
    }
}

#[derive(Clone)]
pub struct RefreshTokenInteractor {
    user_reader: Arc<dyn UserReader>,
    tokens: Arc<dyn TokenIssuer>,
}

impl RefreshTokenInteractor {
    pub fn new(user_reader: Arc<dyn UserReader>, tokens: Arc<dyn TokenIssuer>) -> Self {
        Self {
            user_reader,
            tokens,
        }
    }

    pub async fn execute(&self, refresh_token: String) -> AppResult<LoginResultDTO> {
        let subject = self.tokens.verify(&refresh_token, TokenKind::Refresh)?;
        let user_id: Id<User> = subject.try_into().map_err(|_| AppError::InvalidToken)?;
        let user = self
            .user_reader
            .find_by_id(&user_id)
            .await?
            .filter(|user| !user.is_deleted)
            .ok_or(AppError::InvalidToken)?;
        let token = issue_pair(self.tokens.as_ref(), &user)?;
        info!("Tokens refreshed for user {}", user.username);
        Ok(LoginResultDTO {
            user: user.into(),
            token,
        })
    }
}

#[derive(Clone)]
pub struct LogoutInteractor {
    cache: Arc<dyn CacheStore>,
}

impl LogoutInteractor {
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self { cache }
    }

    pub async fn execute(&self, user_id: IdDTO) -> AppResult<()> {
        let user_id: Id<User> = user_id.id.try_into()?;
        evict_cached_user(self.cache.as_ref(), &user_id.to_string()).await;
        info!("User {} logged out", user_id);
        Ok(())
    }
}

/// Resolves an access token to the current user, reading through the user cache.
#[derive(Clone)]
pub struct AuthenticateInteractor {
    user_reader: Arc<dyn UserReader>,
    tokens: Arc<dyn TokenIssuer>,
    cache: Arc<dyn CacheStore>,
    cache_ttl: Duration,
}

impl AuthenticateInteractor {
    pub fn new(
        user_reader: Arc<dyn UserReader>,
        tokens: Arc<dyn TokenIssuer>,
        cache: Arc<dyn CacheStore>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            user_reader,
            tokens,
            cache,
            cache_ttl,
        }
    }

    async fn cached(&self, key: &str) -> Option<UserDTO> {
        match self.cache.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!("Discarding malformed cache entry {}: {}", key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Cache read failed for {}: {}", key, e);
                None
            }
        }
    }

    pub async fn execute(&self, access_token: String) -> AppResult<UserDTO> {
        let subject = self.tokens.verify(&access_token, TokenKind::Access)?;
        let key = user_cache_key(&subject);
        if let Some(user) = self.cached(&key).await {
            debug!("User {} served from cache", subject);
            return Ok(user);
        }

        let user_id: Id<User> = subject.try_into().map_err(|_| AppError::InvalidToken)?;
        let user: UserDTO = self
            .user_reader
            .find_by_id(&user_id)
            .await?
            .filter(|user| !user.is_deleted)
            .ok_or(AppError::InvalidToken)?
            .into();

        match serde_json::to_string(&user) {
            Ok(raw) => {
                if let Err(e) = self.cache.set(&key, raw, self.cache_ttl).await {
                    warn!("Cache write failed for {}: {}", key, e);
                }
            }
            Err(e) => warn!("Failed to serialize user {} for cache: {}", user.id, e),
        }
        Ok(user)
    }
}
