#![cfg(test)]

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::application::dto::user::UserDTO;
use crate::application::interface::cache::user_cache_key;
use crate::application::interface::token::TokenKind;
use crate::domain::entities::user::{User, UserRole};
use crate::infra::state::AppState;

pub fn unique_credentials() -> (String, String) {
    let id = Uuid::now_v7().as_simple().to_string();
    let username = format!("t_{}", &id[16..]);
    let email = format!("{}@test.example", &id[16..]);

    (username, email)
}

pub async fn ensure_users_table(pool: &PgPool) {
    sqlx::raw_sql(include_str!("../../sql/users.sql"))
        .execute(pool)
        .await
        .expect("create users table");
}

pub async fn insert_user(pool: &PgPool, username: &str, role: &str, is_deleted: bool) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        r#"
            INSERT INTO users (id, username, email, password, name, role, is_deleted, deleted_at)
            VALUES ($1, $2, $3, 'not-a-hash', $2, $4, $5, CASE WHEN $5 THEN now() END)
            RETURNING id
        "#,
    )
    .bind(Uuid::now_v7())
    .bind(username)
    .bind(format!("{}@test.example", username))
    .bind(role)
    .bind(is_deleted)
    .fetch_one(pool)
    .await
    .expect("insert user")
}

pub async fn set_created_at(pool: &PgPool, user_id: Uuid, created_at: DateTime<Utc>) {
    sqlx::query("UPDATE users SET created_at = $2, updated_at = $2 WHERE id = $1")
        .bind(user_id)
        .bind(created_at)
        .execute(pool)
        .await
        .expect("set created_at");
}

pub async fn insert_user_with_password(
    pool: &PgPool,
    username: &str,
    email: &str,
    hashed_password: &str,
) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO users (id, username, email, password) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(Uuid::now_v7())
    .bind(username)
    .bind(email)
    .bind(hashed_password)
    .fetch_one(pool)
    .await
    .expect("insert user with password")
}

pub async fn delete_user(pool: &PgPool, user_id: Uuid) {
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await
        .expect("delete user");
}

pub async fn delete_users_with_prefix(pool: &PgPool, prefix: &str) {
    sqlx::query("DELETE FROM users WHERE starts_with(username, $1)")
        .bind(prefix)
        .execute(pool)
        .await
        .expect("delete users by prefix");
}

pub async fn hash_password(state: &AppState, password: &str) -> String {
    state.hasher.hash_password(password).await.expect("hash password")
}

pub fn access_cookie(state: &AppState, token: &str) -> String {
    format!("{}={}", state.config.cookie.access_name, token)
}

/// Issues an access token for a user that only exists in the cache, so the
/// auth middleware resolves it without touching the database.
pub async fn cached_user(state: &AppState) -> (String, UserDTO) {
    let (username, email) = unique_credentials();
    let user = User::new(username, email, "hash".to_string(), "Cached".to_string(), UserRole::Admin);
    let token = state.tokens.issue(&user, TokenKind::Access).expect("issue token").token;
    let dto = UserDTO::from(user);
    state
        .cache
        .set(
            &user_cache_key(&dto.id),
            serde_json::to_string(&dto).expect("serialize user"),
            Duration::from_secs(60),
        )
        .await
        .expect("cache user");
    (token, dto)
}
