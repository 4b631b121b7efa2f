use std::collections::HashMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use sqlx::FromRow;
use uuid::Uuid;

use crate::adapter::db::pagination::{
    paginate, BindValue, DateField, FilterField, FilterKind, PaginationConfig, SortOrder,
};
use crate::adapter::db::session::SqlxSession;
use crate::application::app_error::{AppError, AppResult};
use crate::application::dto::pagination::{PaginatedResponse, QueryParams};
use crate::application::interface::gateway::user::{UserReader, UserWriter};
use crate::domain::entities::id::Id;
use crate::domain::entities::user::User;

/// Listing rules for `GET /api/users`.
pub static USER_PAGINATION: LazyLock<PaginationConfig> = LazyLock::new(|| PaginationConfig {
    table: "users",
    base_conditions: vec![("is_deleted", BindValue::Boolean(false))],
    search_fields: vec!["name", "email", "username"],
    filter_fields: HashMap::from([
        ("role", FilterField::text("role")),
        ("name", FilterField::text("name")),
        ("email", FilterField::text("email")),
        ("username", FilterField::text("username")),
        ("created_at", FilterField::typed("created_at", FilterKind::Timestamp)),
        ("updated_at", FilterField::typed("updated_at", FilterKind::Timestamp)),
    ]),
    date_fields: HashMap::from([
        ("created_at", DateField::single("created_at")),
        ("updated_at", DateField::single("updated_at")),
    ]),
    sort_fields: vec!["name", "email", "role", "created_at", "updated_at"],
    default_sort: "created_at",
    default_order: Some(SortOrder::Desc),
    tie_breaker: Some("id"),
    ..PaginationConfig::default()
});

#[derive(Debug, FromRow)]
struct UserRecord {
    id: Uuid,
    username: String,
    email: String,
    password: String,
    name: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
    is_deleted: bool,
}

impl TryFrom<UserRecord> for User {
    type Error = AppError;

    fn try_from(record: UserRecord) -> Result<Self, Self::Error> {
        Ok(User {
            id: Id::new(record.id),
            username: record.username,
            email: record.email,
            password: record.password,
            name: record.name,
            role: record.role.parse()?,
            created_at: record.created_at,
            updated_at: record.updated_at,
            deleted_at: record.deleted_at,
            is_deleted: record.is_deleted,
        })
    }
}

fn into_user(record: Option<UserRecord>) -> AppResult<Option<User>> {
    record.map(User::try_from).transpose()
}

/// Turns a unique-constraint race into the matching conflict error.
fn map_write_error(e: sqlx::Error) -> AppError {
    if let Some(db_error) = e.as_database_error() {
        if db_error.is_unique_violation() {
            match db_error.constraint() {
                Some("users_username_key") => return AppError::UsernameAlreadyExists,
                Some("users_email_key") => return AppError::EmailAlreadyExists,
                _ => {}
            }
        }
    }
    AppError::DatabaseError(e)
}

#[derive(Clone)]
pub struct UserGateway {
    session: SqlxSession,
}

impl UserGateway {
    pub fn new(session: SqlxSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl UserWriter for UserGateway {
    async fn insert(&self, user: User) -> AppResult<Id<User>> {
        self.session
            .with_tx(|tx| {
                async move {
                    let id: Uuid = sqlx::query_scalar(
                        r#"
                            INSERT INTO users
                                (id, username, email, password, name, role, created_at, updated_at)
                            VALUES
                                ($1, $2, $3, $4, $5, $6, $7, $8)
                            RETURNING
                                id
                        "#,
                    )
                    .bind(user.id.value)
                    .bind(&user.username)
                    .bind(&user.email)
                    .bind(&user.password)
                    .bind(&user.name)
                    .bind(user.role.as_str())
                    .bind(user.created_at)
                    .bind(user.updated_at)
                    .fetch_one(tx.as_mut())
                    .await
                    .map_err(map_write_error)?;
                    Ok(Id::new(id))
                }
                .boxed()
            })
            .await
    }

    async fn update(&self, user: User) -> AppResult<()> {
        self.session
            .with_tx(|tx| {
                async move {
                    sqlx::query(
                        r#"
                            UPDATE
                                users
                            SET
                                username = $2, email = $3, password = $4, name = $5, role = $6, updated_at = $7
                            WHERE
                                id = $1
                        "#,
                    )
                    .bind(user.id.value)
                    .bind(&user.username)
                    .bind(&user.email)
                    .bind(&user.password)
                    .bind(&user.name)
                    .bind(user.role.as_str())
                    .bind(user.updated_at)
                    .execute(tx.as_mut())
                    .await
                    .map_err(map_write_error)?;
                    Ok(())
                }
                .boxed()
            })
            .await
    }

    async fn delete(&self, user_id: &Id<User>) -> AppResult<bool> {
        let user_id = user_id.value;
        self.session
            .with_tx(|tx| {
                async move {
                    let result = sqlx::query("DELETE FROM users WHERE id = $1")
                        .bind(user_id)
                        .execute(tx.as_mut())
                        .await?;
                    Ok(result.rows_affected() > 0)
                }
                .boxed()
            })
            .await
    }

    async fn soft_delete(&self, user_id: &Id<User>, deleted_at: DateTime<Utc>) -> AppResult<bool> {
        let user_id = user_id.value;
        self.session
            .with_tx(|tx| {
                async move {
                    let result = sqlx::query(
                        r#"
                            UPDATE
                                users
                            SET
                                is_deleted = true, deleted_at = $2, updated_at = $2
                            WHERE
                                id = $1 AND is_deleted = false
                        "#,
                    )
                    .bind(user_id)
                    .bind(deleted_at)
                    .execute(tx.as_mut())
                    .await?;
                    Ok(result.rows_affected() > 0)
                }
                .boxed()
            })
            .await
    }
}

#[async_trait]
impl UserReader for UserGateway {
    async fn find_by_id(&self, user_id: &Id<User>) -> AppResult<Option<User>> {
        let user_id = user_id.value;
        self.session
            .with_tx(|tx| {
                async move {
                    let record = sqlx::query_as::<_, UserRecord>(
                        r#"
                            SELECT
                                id, username, email, password, name, role,
                                created_at, updated_at, deleted_at, is_deleted
                            FROM
                                users
                            WHERE id = $1
                        "#,
                    )
                    .bind(user_id)
                    .fetch_optional(tx.as_mut())
                    .await?;
                    into_user(record)
                }
                .boxed()
            })
            .await
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let username = username.to_owned();
        self.session
            .with_tx(|tx| {
                async move {
                    let record = sqlx::query_as::<_, UserRecord>(
                        r#"
                            SELECT
                                id, username, email, password, name, role,
                                created_at, updated_at, deleted_at, is_deleted
                            FROM
                                users
                            WHERE username = $1
                        "#,
                    )
                    .bind(&username)
                    .fetch_optional(tx.as_mut())
                    .await?;
                    into_user(record)
                }
                .boxed()
            })
            .await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = email.to_owned();
        self.session
            .with_tx(|tx| {
                async move {
                    let record = sqlx::query_as::<_, UserRecord>(
                        r#"
                            SELECT
                                id, username, email, password, name, role,
                                created_at, updated_at, deleted_at, is_deleted
                            FROM
                                users
                            WHERE email = $1
                        "#,
                    )
                    .bind(&email)
                    .fetch_optional(tx.as_mut())
                    .await?;
                    into_user(record)
                }
                .boxed()
            })
            .await
    }

    async fn find_page(&self, params: &QueryParams) -> AppResult<PaginatedResponse<User>> {
        let params = params.clone();
        let page = self
            .session
            .with_tx(|tx| {
                async move { paginate::<UserRecord>(tx.as_mut(), &params, &USER_PAGINATION).await }
                    .boxed()
            })
            .await?;

        let data = page
            .data
            .into_iter()
            .map(User::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(PaginatedResponse {
            data,
            total: page.total,
            page: page.page,
            page_size: page.page_size,
            total_pages: page.total_pages,
        })
    }
}
