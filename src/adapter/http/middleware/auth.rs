use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use crate::adapter::http::middleware::extractor::AuthUser;
use crate::application::app_error::{AppError, AppResult};
use crate::application::interactors::auth::AuthenticateInteractor;
use crate::infra::config::{AppConfig, CookieConfig};

pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    interactor: AuthenticateInteractor,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let cookies = &config.cookie;
    let token = match access_token(request.headers(), &cookies.access_name) {
        Some(token) => token,
        // The access cookie is gone once it outlives Max-Age; a surviving refresh
        // cookie means the client should refresh rather than log in again.
        None if read_cookie(request.headers(), &cookies.refresh_name).is_some() => {
            debug!("Access token missing, refresh token present");
            return Err(AppError::TokenExpired);
        }
        None => return Err(AppError::Unauthenticated),
    };

    let user = interactor.execute(token).await?;
    request.extensions_mut().insert(AuthUser { user });
    Ok(next.run(request).await)
}

/// Cookie first, then `Authorization: Bearer`.
fn access_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    read_cookie(headers, cookie_name).or_else(|| {
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    })
}

pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix(&prefix))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn build_token_cookie(name: &str, token: &str, max_age: i64, config: &CookieConfig) -> String {
    let secure = if config.secure { "; Secure" } else { "" };
    let http_only = if config.http_only { "; HttpOnly" } else { "" };
    format!(
        "{}={}; Path=/; Max-Age={}; SameSite=Lax{}{}",
        name, token, max_age, secure, http_only
    )
}

pub fn build_expired_cookie(name: &str) -> String {
    format!("{}=; Path=/; Max-Age=0; SameSite=Lax", name)
}
