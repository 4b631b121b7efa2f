pub mod bind;
pub mod builder;
pub mod config;
pub mod paginator;

pub use bind::{BindValue, FilterKind};
pub use config::{DateField, FilterField, PaginationConfig, SortOrder};
pub use paginator::paginate;
