use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::user::{User, UserRole};

#[derive(Debug)]
pub struct CreateUserDTO {
    pub username: String,
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: UserRole,
}

#[derive(Debug)]
pub struct UpdateUserDTO {
    pub id: String,
    pub username: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub password: Option<String>,
}

/// Public view of a user. This is also the shape kept in the user cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDTO {
    pub id: String,
    pub username: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserDTO {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            email: user.email,
            name: user.name,
            role: user.role.to_string(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
