use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::application::app_error::{AppError, AppResult};
use crate::application::interface::token::{IssuedToken, TokenIssuer, TokenKind};
use crate::domain::entities::user::User;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    username: String,
    email: String,
    role: String,
    kind: String,
    iss: String,
    iat: i64,
    exp: i64,
}

fn kind_name(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Access => "access",
        TokenKind::Refresh => "refresh",
    }
}

/// HS256 tokens signed with a shared secret. Access and refresh tokens share
/// the key and are told apart by the `kind` claim.
#[derive(Clone)]
pub struct JwtTokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    access_ttl: i64,
    refresh_ttl: i64,
}

impl JwtTokenIssuer {
    pub fn new(secret: &str, issuer: impl Into<String>, access_ttl: i64, refresh_ttl: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
            access_ttl,
            refresh_ttl,
        }
    }

    fn ttl(&self, kind: TokenKind) -> i64 {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        validation
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(&self, user: &User, kind: TokenKind) -> AppResult<IssuedToken> {
        let now = Utc::now().timestamp();
        let expires_in = self.ttl(kind);
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role.to_string(),
            kind: kind_name(kind).to_string(),
            iss: self.issuer.clone(),
            iat: now,
            exp: now + expires_in,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::TokenIssueFailed(e.to_string()))?;
        Ok(IssuedToken { token, expires_in })
    }

    fn verify(&self, token: &str, kind: TokenKind) -> AppResult<String> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation()).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            }
        })?;
        if data.claims.kind != kind_name(kind) {
            return Err(AppError::InvalidToken);
        }
        Ok(data.claims.sub)
    }
}
