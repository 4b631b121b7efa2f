use std::collections::HashMap;
use std::fmt;

use crate::adapter::db::pagination::bind::{BindValue, FilterKind};
use crate::application::dto::pagination::QueryParams;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => f.write_str("ASC"),
            SortOrder::Desc => f.write_str("DESC"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterField {
    pub column: &'static str,
    pub kind: FilterKind,
}

impl FilterField {
    pub const fn text(column: &'static str) -> Self {
        Self {
            column,
            kind: FilterKind::Text,
        }
    }

    pub const fn typed(column: &'static str, kind: FilterKind) -> Self {
        Self { column, kind }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateField {
    pub start: &'static str,
    pub end: &'static str,
}

impl DateField {
    /// Both bounds compare against the same column.
    pub const fn single(column: &'static str) -> Self {
        Self {
            start: column,
            end: column,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinKind::Inner => f.write_str("INNER"),
            JoinKind::Left => f.write_str("LEFT"),
            JoinKind::Right => f.write_str("RIGHT"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JoinConfig {
    pub kind: JoinKind,
    pub table: &'static str,
    pub alias: Option<&'static str>,
    pub on: &'static str,
}

#[derive(Debug, Clone)]
pub struct SelectField {
    pub expr: &'static str,
    pub alias: Option<&'static str>,
}

/// A one-to-many relation loaded alongside each row as a JSON array column.
#[derive(Debug, Clone)]
pub struct Relation {
    /// Output column name.
    pub name: &'static str,
    pub table: &'static str,
    /// Column of `table` pointing back at the main row.
    pub foreign_key: &'static str,
    /// Column of the main table referenced by `foreign_key`.
    pub local_key: &'static str,
}

/// Per-resource listing rules, written in code. Every identifier is a
/// `&'static str`, so nothing a client sends can become SQL text; client
/// strings are only ever looked up in these allow-lists or bound as values.
#[derive(Debug, Clone, Default)]
pub struct PaginationConfig {
    pub table: &'static str,
    pub table_alias: Option<&'static str>,
    /// Always applied as `column = value`, before anything the client asks for.
    pub base_conditions: Vec<(&'static str, BindValue)>,
    pub search_fields: Vec<&'static str>,
    pub filter_fields: HashMap<&'static str, FilterField>,
    pub date_fields: HashMap<&'static str, DateField>,
    pub sort_fields: Vec<&'static str>,
    pub default_sort: &'static str,
    /// `None` sorts descending.
    pub default_order: Option<SortOrder>,
    /// Appended after the sort column so OFFSET paging stays deterministic on ties.
    pub tie_breaker: Option<&'static str>,
    pub relations: Vec<Relation>,
    pub joins: Vec<JoinConfig>,
    /// Empty selects every column of the main table.
    pub select_fields: Vec<SelectField>,
    pub group_by: Vec<&'static str>,
    /// Joined with `AND`.
    pub having: Vec<&'static str>,
    pub distinct: bool,
}

impl PaginationConfig {
    /// Name used to qualify main-table columns.
    pub fn qualifier(&self) -> &'static str {
        self.table_alias.unwrap_or(self.table)
    }

    /// Resolves the client's sort request against the allow-list.
    pub fn resolve_sort(&self, params: &QueryParams) -> (&'static str, SortOrder) {
        let requested = params
            .sort_by
            .as_deref()
            .map(str::trim)
            .filter(|field| !field.is_empty());
        let column = requested
            .and_then(|field| self.sort_fields.iter().copied().find(|allowed| *allowed == field))
            .unwrap_or(self.default_sort);
        let order = match params.sort_desc {
            Some(true) => SortOrder::Desc,
            Some(false) => SortOrder::Asc,
            None => self.default_order.unwrap_or(SortOrder::Desc),
        };
        (column, order)
    }
}

/// Page number and size after clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    pub fn from_params(params: &QueryParams) -> Self {
        let page = params.page.max(1);
        let page_size = if params.page_size < 1 {
            DEFAULT_PAGE_SIZE
        } else {
            params.page_size.min(MAX_PAGE_SIZE)
        };
        Self { page, page_size }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            return 0;
        }
        (total + self.page_size - 1) / self.page_size
    }
}
