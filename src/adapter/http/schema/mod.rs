pub mod auth;
pub mod pagination;
pub mod user;

use validator::ValidationError;

use crate::domain::entities::user::UserRole;

pub(crate) fn validate_role(role: &str) -> Result<(), ValidationError> {
    role.parse::<UserRole>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("role_unknown").with_message("Role must be `admin` or `user`".into()))
}
