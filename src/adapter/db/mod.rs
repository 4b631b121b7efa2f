pub mod gateway;
pub mod pagination;
pub mod session;
