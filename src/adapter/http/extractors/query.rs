use std::collections::HashSet;

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use chrono::{DateTime, Utc};

use crate::application::app_error::{AppError, AppResult};
use crate::application::dto::pagination::QueryParams;

/// Listing parameters read from the query string:
/// `page`, `pageSize`, `search`, `sortBy`, `sortDesc`, `filters[name]`,
/// `dates[name][start]` and `dates[name][end]`.
#[derive(Debug, Clone, Default)]
pub struct ListQuery(pub QueryParams);

impl<S> FromRequestParts<S> for ListQuery
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> AppResult<Self> {
        let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri).map_err(|e| {
            AppError::InvalidQueryParam {
                field: "query".to_string(),
                reason: e.body_text(),
            }
        })?;
        Ok(ListQuery(parse_query_pairs(pairs)?))
    }
}

enum DateBound {
    Start,
    End,
}

enum Key<'a> {
    Page,
    PageSize,
    Search,
    SortBy,
    SortDesc,
    Filter(&'a str),
    Date(&'a str, DateBound),
}

fn classify(key: &str) -> Option<Key<'_>> {
    match key {
        "page" => return Some(Key::Page),
        "pageSize" => return Some(Key::PageSize),
        "search" => return Some(Key::Search),
        "sortBy" => return Some(Key::SortBy),
        "sortDesc" => return Some(Key::SortDesc),
        _ => {}
    }
    if let Some(name) = key.strip_prefix("filters[").and_then(|rest| rest.strip_suffix(']')) {
        return (!name.is_empty() && !name.contains(['[', ']'])).then_some(Key::Filter(name));
    }
    let rest = key.strip_prefix("dates[")?;
    let (name, bound) = rest.split_once("][")?;
    if name.is_empty() || name.contains(['[', ']']) {
        return None;
    }
    match bound {
        "start]" => Some(Key::Date(name, DateBound::Start)),
        "end]" => Some(Key::Date(name, DateBound::End)),
        _ => None,
    }
}

fn invalid(field: &str, reason: &str) -> AppError {
    AppError::InvalidQueryParam {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_int(field: &str, value: &str) -> AppResult<i64> {
    value.parse().map_err(|_| invalid(field, "must be an integer"))
}

fn parse_bool(field: &str, value: &str) -> AppResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(invalid(field, "must be a boolean")),
    }
}

fn parse_time(field: &str, value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| invalid(field, "must be an RFC 3339 timestamp"))
}

/// Builds [`QueryParams`] from raw query pairs. The first occurrence of a key
/// wins, empty values count as absent and unknown keys are ignored.
pub fn parse_query_pairs<I>(pairs: I) -> AppResult<QueryParams>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut params = QueryParams::default();
    let mut seen = HashSet::new();

    for (key, value) in pairs {
        let value = value.trim();
        if value.is_empty() || seen.contains(&key) {
            continue;
        }
        let Some(kind) = classify(&key) else {
            continue;
        };
        match kind {
            Key::Page => params.page = parse_int(&key, value)?,
            Key::PageSize => params.page_size = parse_int(&key, value)?,
            Key::Search => params.search = Some(value.to_string()),
            Key::SortBy => params.sort_by = Some(value.to_string()),
            Key::SortDesc => params.sort_desc = Some(parse_bool(&key, value)?),
            Key::Filter(name) => {
                params.filters.insert(name.to_string(), value.to_string());
            }
            Key::Date(name, bound) => {
                let at = parse_time(&key, value)?;
                let range = params.dates.entry(name.to_string()).or_default();
                match bound {
                    DateBound::Start => range.start = Some(at),
                    DateBound::End => range.end = Some(at),
                }
            }
        }
        seen.insert(key);
    }
    Ok(params)
}
