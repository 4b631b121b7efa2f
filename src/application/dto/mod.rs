pub mod auth;
pub mod id;
pub mod pagination;
pub mod user;
