use std::sync::Arc;

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

use crate::adapter::http::app_error_impl::ErrorResponse;
use crate::adapter::http::middleware::auth::{build_expired_cookie, build_token_cookie, read_cookie};
use crate::adapter::http::middleware::extractor::AuthUser;
use crate::adapter::http::response::{ApiResponse, MessageResponse};
use crate::adapter::http::schema::auth::{LoginRequest, LoginResponse, RegisterRequest};
use crate::adapter::http::schema::user::UserResponse;
use crate::adapter::http::validation::ValidJson;
use crate::application::app_error::{AppError, AppResult};
use crate::application::dto::auth::{LoginDTO, TokenPairDTO};
use crate::application::dto::id::IdDTO;
use crate::application::dto::user::CreateUserDTO;
use crate::application::interactors::auth::{LoginInteractor, LogoutInteractor, RefreshTokenInteractor};
use crate::application::interactors::users::CreateUserInteractor;
use crate::domain::entities::user::UserRole;
use crate::infra::config::AppConfig;

fn token_cookies(token: &TokenPairDTO, config: &AppConfig) -> AppResult<HeaderMap> {
    let cookies = &config.cookie;
    let access = build_token_cookie(&cookies.access_name, &token.access_token, token.expires_in, cookies);
    let refresh = build_token_cookie(
        &cookies.refresh_name,
        &token.refresh_token,
        token.refresh_expires_in,
        cookies,
    );
    let mut headers = HeaderMap::new();
    headers.append(SET_COOKIE, HeaderValue::from_str(&access)?);
    headers.append(SET_COOKIE, HeaderValue::from_str(&refresh)?);
    Ok(headers)
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body(
        content = RegisterRequest,
        example = json!(
            {
                "username": "johndoe",
                "email": "john@example.com",
                "password": "secret123",
                "name": "John Doe"
            }
        )
    ),
    responses(
        (
            status = 201,
            description = "User registered",
            body = ApiResponse<UserResponse>
        ),
        (
            status = 400,
            description = "Invalid request body or validation failure",
            body = ErrorResponse,
            example = json!(
                {
                    "status": "error",
                    "message": "Validation failed",
                    "code": "VALIDATION_ERROR",
                    "details": { "password": ["Password must be at least 6 characters long"] }
                }
            )
        ),
        (
            status = 409,
            description = "Username or email already taken",
            body = ErrorResponse,
            example = json!(
                {
                    "status": "error",
                    "message": "Username already exists",
                    "code": "USERNAME_EXISTS",
                    "details": { "field": "username", "reason": "already_taken" }
                }
            )
        )
    )
)]
pub async fn register(
    interactor: CreateUserInteractor,
    ValidJson(payload): ValidJson<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    let dto = CreateUserDTO {
        username: payload.username,
        email: payload.email.to_string(),
        password: payload.password,
        name: payload.name,
        role: UserRole::User,
    };
    let user = interactor.execute(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("User registered successfully", UserResponse::from(user))),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body(
        content = LoginRequest,
        example = json!({ "username": "johndoe", "password": "secret123" })
    ),
    responses(
        (
            status = 200,
            description = "Login successful, access and refresh cookies are set",
            body = ApiResponse<LoginResponse>
        ),
        (
            status = 401,
            description = "Unknown user, wrong password or deleted account",
            body = ErrorResponse,
            example = json!(
                {
                    "status": "error",
                    "message": "Invalid username or password",
                    "code": "UNAUTHORIZED"
                }
            )
        )
    )
)]
pub async fn login(
    interactor: LoginInteractor,
    State(config): State<Arc<AppConfig>>,
    ValidJson(payload): ValidJson<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let dto = LoginDTO {
        username: payload.username,
        password: payload.password,
    };
    let result = interactor.execute(dto).await?;
    let headers = token_cookies(&result.token, &config)?;
    Ok((
        StatusCode::OK,
        headers,
        Json(ApiResponse::success("Login successful", LoginResponse::from(result))),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    tag = "Auth",
    responses(
        (
            status = 200,
            description = "A new token pair, cookies are replaced",
            body = ApiResponse<LoginResponse>
        ),
        (
            status = 401,
            description = "Missing, expired or invalid refresh token",
            body = ErrorResponse,
            example = json!(
                {
                    "status": "error",
                    "message": "Token has expired",
                    "code": "UNAUTHORIZED"
                }
            )
        )
    )
)]
pub async fn refresh(
    interactor: RefreshTokenInteractor,
    State(config): State<Arc<AppConfig>>,
    request_headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let token = read_cookie(&request_headers, &config.cookie.refresh_name).ok_or(AppError::Unauthenticated)?;
    let result = interactor.execute(token).await?;
    let headers = token_cookies(&result.token, &config)?;
    Ok((
        StatusCode::OK,
        headers,
        Json(ApiResponse::success("Token refreshed successfully", LoginResponse::from(result))),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses(
        (
            status = 200,
            description = "Both cookies are expired",
            body = MessageResponse,
            example = json!({ "status": "success", "message": "Logged out successfully" })
        ),
        (
            status = 401,
            description = "Not authenticated",
            body = ErrorResponse
        )
    ),
    security(("cookieAuth" = []), ("bearerAuth" = []))
)]
pub async fn logout(
    auth_user: AuthUser,
    interactor: LogoutInteractor,
    State(config): State<Arc<AppConfig>>,
) -> AppResult<impl IntoResponse> {
    interactor.execute(IdDTO { id: auth_user.user.id }).await?;
    let mut headers = HeaderMap::new();
    headers.append(SET_COOKIE, HeaderValue::from_str(&build_expired_cookie(&config.cookie.access_name))?);
    headers.append(SET_COOKIE, HeaderValue::from_str(&build_expired_cookie(&config.cookie.refresh_name))?);
    Ok((StatusCode::OK, headers, Json(MessageResponse::new("Logged out successfully"))))
}

#[utoipa::path(
    get,
    path = "/api/me",
    tag = "Auth",
    responses(
        (
            status = 200,
            description = "The authenticated user",
            body = ApiResponse<UserResponse>
        ),
        (
            status = 401,
            description = "Not authenticated",
            body = ErrorResponse,
            example = json!(
                {
                    "status": "error",
                    "message": "Authentication required",
                    "code": "UNAUTHORIZED"
                }
            )
        )
    ),
    security(("cookieAuth" = []), ("bearerAuth" = []))
)]
pub async fn me(auth_user: AuthUser) -> AppResult<impl IntoResponse> {
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success("User fetched successfully", UserResponse::from(auth_user.user))),
    ))
}
