use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use sqlx::{Pool, Postgres};

use crate::adapter::db::gateway::user::UserGateway;
use crate::adapter::db::session::SqlxSession;
use crate::application::app_error::{AppError, AppResult};
use crate::application::interactors::auth::{
    AuthenticateInteractor, LoginInteractor, LogoutInteractor, RefreshTokenInteractor,
};
use crate::application::interactors::users::{
    CreateUserInteractor, DeleteUserInteractor, GetUserInteractor, ListUsersInteractor,
    SoftDeleteUserInteractor, UpdateUserInteractor,
};
use crate::application::interface::cache::CacheStore;
use crate::application::interface::crypto::CredentialsHasher;
use crate::application::interface::token::TokenIssuer;
use crate::infra::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub pool: Pool<Postgres>,
    pub hasher: Arc<dyn CredentialsHasher>,
    pub tokens: Arc<dyn TokenIssuer>,
    pub cache: Arc<dyn CacheStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// One lazy transaction per interactor; gateways built from it share it.
    fn user_gateway(&self) -> (SqlxSession, UserGateway) {
        let session = SqlxSession::new_lazy(self.pool.clone());
        let gateway = UserGateway::new(session.clone());
        (session, gateway)
    }

    fn user_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.config.cache.user_ttl)
    }
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

#[async_trait]
pub trait FromAppState: Sized {
    async fn from_app_state(state: &AppState) -> AppResult<Self>;
}

/// Lets handlers take an interactor as an extractor.
macro_rules! interactor_extractor {
    ($($interactor:ty),+ $(,)?) => {
        $(
            impl<S> FromRequestParts<S> for $interactor
            where
                S: Send + Sync,
                AppState: FromRef<S>,
            {
                type Rejection = AppError;

                async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
                    let app_state = AppState::from_ref(state);
                    <$interactor>::from_app_state(&app_state).await
                }
            }
        )+
    };
}

interactor_extractor!(
    CreateUserInteractor,
    GetUserInteractor,
    ListUsersInteractor,
    UpdateUserInteractor,
    DeleteUserInteractor,
    SoftDeleteUserInteractor,
    LoginInteractor,
    RefreshTokenInteractor,
    LogoutInteractor,
    AuthenticateInteractor,
);

#[async_trait]
impl FromAppState for CreateUserInteractor {
    async fn from_app_state(state: &AppState) -> AppResult<Self> {
        let (session, gateway) = state.user_gateway();
        Ok(CreateUserInteractor::new(
            Arc::new(session),
            Arc::new(gateway.clone()),
            Arc::new(gateway),
            state.hasher.clone(),
        ))
    }
}

#[async_trait]
impl FromAppState for GetUserInteractor {
    async fn from_app_state(state: &AppState) -> AppResult<Self> {
        let (_, gateway) = state.user_gateway();
        Ok(GetUserInteractor::new(Arc::new(gateway)))
    }
}

// The listing transaction is read-only and never committed; dropping it rolls back.
#[async_trait]
impl FromAppState for ListUsersInteractor {
    async fn from_app_state(state: &AppState) -> AppResult<Self> {
        let (_, gateway) = state.user_gateway();
        Ok(ListUsersInteractor::new(Arc::new(gateway)))
    }
}

#[async_trait]
impl FromAppState for UpdateUserInteractor {
    async fn from_app_state(state: &AppState) -> AppResult<Self> {
        let (session, gateway) = state.user_gateway();
        Ok(UpdateUserInteractor::new(
            Arc::new(session),
            Arc::new(gateway.clone()),
            Arc::new(gateway),
            state.hasher.clone(),
            state.cache.clone(),
        ))
    }
}

#[async_trait]
impl FromAppState for DeleteUserInteractor {
    async fn from_app_state(state: &AppState) -> AppResult<Self> {
        let (session, gateway) = state.user_gateway();
        Ok(DeleteUserInteractor::new(
            Arc::new(session),
            Arc::new(gateway),
            state.cache.clone(),
        ))
    }
}

#[async_trait]
impl FromAppState for SoftDeleteUserInteractor {
    async fn from_app_state(state: &AppState) -> AppResult<Self> {
        let (session, gateway) = state.user_gateway();
        Ok(SoftDeleteUserInteractor::new(
            Arc::new(session),
            Arc::new(gateway),
            state.cache.clone(),
        ))
    }
}

#[async_trait]
impl FromAppState for LoginInteractor {
    async fn from_app_state(state: &AppState) -> AppResult<Self> {
        let (_, gateway) = state.user_gateway();
        Ok(LoginInteractor::new(
            Arc::new(gateway),
            state.hasher.clone(),
            state.tokens.clone(),
        ))
    }
}

#[async_trait]
impl FromAppState for RefreshTokenInteractor {
    async fn from_app_state(state: &AppState) -> AppResult<Self> {
        let (_, gateway) = state.user_gateway();
        Ok(RefreshTokenInteractor::new(Arc::new(gateway), state.tokens.clone()))
    }
}

#[async_trait]
impl FromAppState for LogoutInteractor {
    async fn from_app_state(state: &AppState) -> AppResult<Self> {
        Ok(LogoutInteractor::new(state.cache.clone()))
    }
}

#[async_trait]
impl FromAppState for AuthenticateInteractor {
    async fn from_app_state(state: &AppState) -> AppResult<Self> {
        let (_, gateway) = state.user_gateway();
        Ok(AuthenticateInteractor::new(
            Arc::new(gateway),
            state.tokens.clone(),
            state.cache.clone(),
            state.user_cache_ttl(),
        ))
    }
}
