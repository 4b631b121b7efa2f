use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::IntoParams;

/// OpenAPI description of the listing query string. Requests are parsed by
/// `ListQuery`; other `filters[...]` and `dates[...]` keys follow the same pattern.
#[allow(dead_code)]
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersParams {
    /// Values below 1 are treated as 1.
    #[param(minimum = 1, default = 1)]
    pub page: Option<i64>,
    /// Values below 1 fall back to 10, values above 100 are capped.
    #[serde(rename = "pageSize")]
    #[param(minimum = 1, maximum = 100, default = 10)]
    pub page_size: Option<i64>,
    /// Case-insensitive match on name, email and username.
    pub search: Option<String>,
    /// One of name, email, role, created_at, updated_at. Anything else sorts by created_at.
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "sortDesc")]
    pub sort_desc: Option<bool>,
    #[serde(rename = "filters[role]")]
    pub filter_role: Option<String>,
    #[serde(rename = "dates[created_at][start]")]
    pub created_from: Option<DateTime<Utc>>,
    #[serde(rename = "dates[created_at][end]")]
    pub created_to: Option<DateTime<Utc>>,
}
