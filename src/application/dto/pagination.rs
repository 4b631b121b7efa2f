use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// Inclusive bounds for a date filter. Either side may be open.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Caller-supplied listing parameters. Nothing here is trusted: page values are
/// clamped and names are resolved against the resource's allow-lists before use.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    pub page: i64,
    pub page_size: i64,
    pub search: Option<String>,
    pub filters: BTreeMap<String, String>,
    pub sort_by: Option<String>,
    pub sort_desc: Option<bool>,
    pub dates: BTreeMap<String, DateRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl<T> PaginatedResponse<T> {
    pub fn map<U, F>(self, f: F) -> PaginatedResponse<U>
    where
        F: FnMut(T) -> U,
    {
        PaginatedResponse {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}
