use crate::application::dto::user::UserDTO;

#[derive(Debug)]
pub struct LoginDTO {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct TokenPairDTO {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_expires_in: i64,
}

#[derive(Debug, Clone)]
pub struct LoginResultDTO {
    pub user: UserDTO,
    pub token: TokenPairDTO,
}
