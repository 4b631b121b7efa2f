use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::adapter::http::app_error_impl::ErrorResponse;
use crate::adapter::http::extractors::query::ListQuery;
use crate::adapter::http::response::{ApiResponse, MessageResponse, PageResponse};
use crate::adapter::http::schema::pagination::ListUsersParams;
use crate::adapter::http::schema::user::{CreateUserRequest, UpdateUserRequest, UserResponse};
use crate::adapter::http::validation::ValidJson;
use crate::application::app_error::AppResult;
use crate::application::dto::id::IdDTO;
use crate::application::dto::user::{CreateUserDTO, UpdateUserDTO};
use crate::application::interactors::users::{
    CreateUserInteractor, DeleteUserInteractor, GetUserInteractor, ListUsersInteractor,
    SoftDeleteUserInteractor, UpdateUserInteractor,
};

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    params(ListUsersParams),
    responses(
        (
            status = 200,
            description = "One page of active users",
            body = ApiResponse<PageResponse<UserResponse>>,
            example = json!(
                {
                    "status": "success",
                    "message": "Users fetched successfully",
                    "data": {
                        "data": [
                            {
                                "id": "019c47ec-2160-7e53-bf7e-06db2a1bad85",
                                "username": "johndoe",
                                "email": "john@example.com",
                                "name": "John Doe",
                                "role": "admin",
                                "created_at": "2025-01-01T00:00:00Z",
                                "updated_at": "2025-01-01T00:00:00Z"
                            }
                        ],
                        "total": 1,
                        "page": 1,
                        "pageSize": 10,
                        "totalPages": 1
                    }
                }
            )
        ),
        (
            status = 400,
            description = "Malformed query parameter",
            body = ErrorResponse,
            example = json!(
                {
                    "status": "error",
                    "message": "Invalid query parameters",
                    "code": "INVALID_REQUEST",
                    "details": { "field": "page", "reason": "must be an integer" }
                }
            )
        ),
        (
            status = 401,
            description = "Not authenticated",
            body = ErrorResponse
        )
    ),
    security(("cookieAuth" = []), ("bearerAuth" = []))
)]
pub async fn list_users(
    interactor: ListUsersInteractor,
    ListQuery(params): ListQuery,
) -> AppResult<impl IntoResponse> {
    let page = interactor.execute(params).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            "Users fetched successfully",
            PageResponse::<UserResponse>::from(page),
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/api/user/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User id (UUID)")),
    responses(
        (status = 200, description = "The user", body = ApiResponse<UserResponse>),
        (
            status = 400,
            description = "Malformed id",
            body = ErrorResponse,
            example = json!({ "status": "error", "message": "Invalid UUID: abc", "code": "BAD_REQUEST" })
        ),
        (
            status = 404,
            description = "No such user, or the user is soft-deleted",
            body = ErrorResponse,
            example = json!({ "status": "error", "message": "User not found", "code": "NOT_FOUND" })
        )
    ),
    security(("cookieAuth" = []), ("bearerAuth" = []))
)]
pub async fn get_user(
    interactor: GetUserInteractor,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let user = interactor.execute(IdDTO { id }).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success("User fetched successfully", UserResponse::from(user))),
    ))
}

#[utoipa::path(
    post,
    path = "/api/user/create",
    tag = "Users",
    request_body(
        content = CreateUserRequest,
        example = json!(
            {
                "username": "janedoe",
                "email": "jane@example.com",
                "password": "secret123",
                "name": "Jane Doe",
                "role": "admin"
            }
        )
    ),
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserResponse>),
        (status = 400, description = "Validation failure", body = ErrorResponse),
        (status = 409, description = "Username or email already taken", body = ErrorResponse)
    ),
    security(("cookieAuth" = []), ("bearerAuth" = []))
)]
pub async fn create_user(
    interactor: CreateUserInteractor,
    ValidJson(payload): ValidJson<CreateUserRequest>,
) -> AppResult<impl IntoResponse> {
    let dto = CreateUserDTO {
        username: payload.username,
        email: payload.email.to_string(),
        password: payload.password,
        name: payload.name,
        role: payload.role.parse()?,
    };
    let user = interactor.execute(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("User created successfully", UserResponse::from(user))),
    ))
}

#[utoipa::path(
    put,
    path = "/api/user/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User id (UUID)")),
    request_body(
        content = UpdateUserRequest,
        example = json!(
            {
                "username": "janedoe",
                "email": "jane@example.com",
                "name": "Jane D.",
                "role": "user"
            }
        )
    ),
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserResponse>),
        (status = 400, description = "Validation failure", body = ErrorResponse),
        (status = 404, description = "No such user", body = ErrorResponse),
        (status = 409, description = "Username or email taken by another user", body = ErrorResponse)
    ),
    security(("cookieAuth" = []), ("bearerAuth" = []))
)]
pub async fn update_user(
    interactor: UpdateUserInteractor,
    Path(id): Path<String>,
    ValidJson(payload): ValidJson<UpdateUserRequest>,
) -> AppResult<impl IntoResponse> {
    let dto = UpdateUserDTO {
        id,
        username: payload.username,
        email: payload.email.to_string(),
        name: payload.name,
        role: payload.role.parse()?,
        password: payload.password,
    };
    let user = interactor.execute(dto).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success("User updated successfully", UserResponse::from(user))),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/user/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User id (UUID)")),
    responses(
        (
            status = 200,
            description = "User removed permanently",
            body = MessageResponse,
            example = json!({ "status": "success", "message": "User deleted successfully" })
        ),
        (status = 404, description = "No such user", body = ErrorResponse)
    ),
    security(("cookieAuth" = []), ("bearerAuth" = []))
)]
pub async fn delete_user(
    interactor: DeleteUserInteractor,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    interactor.execute(IdDTO { id }).await?;
    Ok((StatusCode::OK, Json(MessageResponse::new("User deleted successfully"))))
}

#[utoipa::path(
    put,
    path = "/api/user/{id}/soft-delete",
    tag = "Users",
    params(("id" = String, Path, description = "User id (UUID)")),
    responses(
        (
            status = 200,
            description = "User marked as deleted",
            body = MessageResponse,
            example = json!({ "status": "success", "message": "User soft deleted successfully" })
        ),
        (status = 404, description = "No such user, or already soft-deleted", body = ErrorResponse)
    ),
    security(("cookieAuth" = []), ("bearerAuth" = []))
)]
pub async fn soft_delete_user(
    interactor: SoftDeleteUserInteractor,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    interactor.execute(IdDTO { id }).await?;
    Ok((StatusCode::OK, Json(MessageResponse::new("User soft deleted successfully"))))
}
