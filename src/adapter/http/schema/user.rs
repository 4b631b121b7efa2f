use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_email::Email;
use utoipa::ToSchema;
use validator::Validate;

use crate::adapter::http::schema::validate_role;
use crate::application::dto::user::UserDTO;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"))]
    pub username: String,
    #[schema(value_type = String, format = Email)]
    pub email: Email,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
    #[serde(default)]
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: String,
    #[validate(custom(function = "validate_role"))]
    pub role: String,
}

/// Full replacement of the editable fields; the password is re-hashed only when given.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"))]
    pub username: String,
    #[schema(value_type = String, format = Email)]
    pub email: Email,
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: String,
    #[validate(custom(function = "validate_role"))]
    pub role: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserDTO> for UserResponse {
    fn from(user: UserDTO) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            name: user.name,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn create(role: &str, password: &str) -> CreateUserRequest {
        serde_json::from_value(json!({
            "username": "jane",
            "email": "jane@example.com",
            "password": password,
            "role": role
        }))
        .unwrap()
    }

    #[rstest]
    #[case("admin")]
    #[case("User")]
    fn test_create_accepts_known_roles(#[case] role: &str) {
        let request = create(role, "secret1");

        assert!(request.validate().is_ok());
        assert_eq!(request.name, "");
    }

    #[rstest]
    fn test_create_rejects_unknown_role_and_short_password() {
        let errors = create("root", "123").validate().unwrap_err();
        let fields = errors.field_errors();

        assert!(fields.contains_key("role"));
        assert!(fields.contains_key("password"));
    }

    #[rstest]
    fn test_invalid_email_fails_to_deserialize() {
        let result = serde_json::from_value::<CreateUserRequest>(json!({
            "username": "jane",
            "email": "not-an-email",
            "password": "secret1",
            "role": "user"
        }));

        assert!(result.is_err());
    }

    #[rstest]
    #[case(None, true)]
    #[case(Some("secret1"), true)]
    #[case(Some("short"), false)]
    fn test_update_password_is_optional(#[case] password: Option<&str>, #[case] valid: bool) {
        let request: UpdateUserRequest = serde_json::from_value(json!({
            "username": "jane",
            "email": "jane@example.com",
            "name": "Jane",
            "role": "user",
            "password": password
        }))
        .unwrap();

        assert_eq!(request.validate().is_ok(), valid);
    }
}
