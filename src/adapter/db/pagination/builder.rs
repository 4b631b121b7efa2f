//! Compiles a [`PaginationConfig`] plus untrusted [`QueryParams`] into a pair of
//! parameterized statements: a count over the filtered set and the bounded page fetch.

use tracing::debug;

use crate::adapter::db::pagination::bind::{escape_like, push_bind, BindValue};
use crate::adapter::db::pagination::config::{PageRequest, PaginationConfig};
use crate::application::dto::pagination::QueryParams;

#[derive(Debug, Clone)]
pub struct PageQuery {
    pub count_sql: String,
    pub fetch_sql: String,
    /// Filter binds first, then LIMIT and OFFSET.
    binds: Vec<BindValue>,
    filter_binds: usize,
    pub page: PageRequest,
}

impl PageQuery {
    pub fn build(params: &QueryParams, config: &PaginationConfig) -> Self {
        let page = PageRequest::from_params(params);
        let mut binds = Vec::new();
        let filtered = filtered_select(params, config, &mut binds);
        let filter_binds = binds.len();

        let count_sql = format!("SELECT COUNT(*) FROM ({}) AS filtered", filtered);

        let mut fetch_sql = filtered;
        push_order_by(&mut fetch_sql, params, config);
        let limit = push_bind(&mut binds, BindValue::Integer(page.page_size));
        let offset = push_bind(&mut binds, BindValue::Integer(page.offset()));
        fetch_sql.push_str(&format!(" LIMIT ${} OFFSET ${}", limit, offset));

        Self {
            count_sql,
            fetch_sql,
            binds,
            filter_binds,
            page,
        }
    }

    pub fn count_binds(&self) -> &[BindValue] {
        &self.binds[..self.filter_binds]
    }

    pub fn fetch_binds(&self) -> &[BindValue] {
        &self.binds
    }
}

fn filtered_select(
    params: &QueryParams,
    config: &PaginationConfig,
    binds: &mut Vec<BindValue>,
) -> String {
    let mut sql = String::from("SELECT ");
    if config.distinct {
        sql.push_str("DISTINCT ");
    }
    sql.push_str(&projection(config));
    sql.push_str(" FROM ");
    sql.push_str(config.table);
    if let Some(alias) = config.table_alias {
        sql.push_str(" AS ");
        sql.push_str(alias);
    }

    for join in &config.joins {
        sql.push_str(&format!(" {} JOIN {}", join.kind, join.table));
        if let Some(alias) = join.alias {
            sql.push_str(" AS ");
            sql.push_str(alias);
        }
        sql.push_str(" ON ");
        sql.push_str(join.on);
    }

    let conditions = conditions(params, config, binds);
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    if !config.group_by.is_empty() {
        sql.push_str(" GROUP BY ");
        sql.push_str(&config.group_by.join(", "));
    }
    if !config.having.is_empty() {
        sql.push_str(" HAVING ");
        sql.push_str(&config.having.join(" AND "));
    }
    sql
}

fn projection(config: &PaginationConfig) -> String {
    let qualifier = config.qualifier();
    let mut columns: Vec<String> = if config.select_fields.is_empty() {
        vec![format!("{}.*", qualifier)]
    } else {
        config
            .select_fields
            .iter()
            .map(|field| match field.alias {
                Some(alias) => format!("{} AS {}", field.expr, alias),
                None => field.expr.to_string(),
            })
            .collect()
    };
    for relation in &config.relations {
        columns.push(format!(
            "COALESCE((SELECT jsonb_agg({name}_rel) FROM {table} AS {name}_rel WHERE {name}_rel.{fk} = {qualifier}.{lk}), '[]'::jsonb) AS {name}",
            name = relation.name,
            table = relation.table,
            fk = relation.foreign_key,
            qualifier = qualifier,
            lk = relation.local_key,
        ));
    }
    columns.join(", ")
}

fn conditions(params: &QueryParams, config: &PaginationConfig, binds: &mut Vec<BindValue>) -> Vec<String> {
    let mut conditions = Vec::new();

    for (column, value) in &config.base_conditions {
        let idx = push_bind(binds, value.clone());
        conditions.push(format!("{} = ${}", column, idx));
    }

    let search = params.search.as_deref().map(str::trim).filter(|term| !term.is_empty());
    if let Some(term) = search {
        if !config.search_fields.is_empty() {
            let idx = push_bind(binds, BindValue::Text(format!("%{}%", escape_like(term))));
            let matches: Vec<String> = config
                .search_fields
                .iter()
                .map(|column| format!("{} ILIKE ${}", column, idx))
                .collect();
            conditions.push(format!("({})", matches.join(" OR ")));
        }
    }

    for (name, raw) in &params.filters {
        let Some(field) = config.filter_fields.get(name.as_str()) else {
            debug!("Ignoring filter on non allow-listed field `{}`", name);
            continue;
        };
        let Some(value) = field.kind.parse(raw) else {
            debug!("Ignoring filter `{}`: value does not match {:?}", name, field.kind);
            continue;
        };
        let idx = push_bind(binds, value);
        conditions.push(format!("{} = ${}", field.column, idx));
    }

    for (name, range) in &params.dates {
        let Some(field) = config.date_fields.get(name.as_str()) else {
            debug!("Ignoring date range on non allow-listed field `{}`", name);
            continue;
        };
        if let Some(start) = range.start {
            let idx = push_bind(binds, BindValue::Timestamp(start));
            conditions.push(format!("{} >= ${}", field.start, idx));
        }
        if let Some(end) = range.end {
            let idx = push_bind(binds, BindValue::Timestamp(end));
            conditions.push(format!("{} <= ${}", field.end, idx));
        }
    }

    conditions
}

fn push_order_by(sql: &mut String, params: &QueryParams, config: &PaginationConfig) {
    let (column, order) = config.resolve_sort(params);
    let mut keys = Vec::new();
    if !column.is_empty() {
        keys.push(format!("{} {}", column, order));
    }
    if let Some(tie_breaker) = config.tie_breaker {
        if tie_breaker != column {
            keys.push(format!("{} {}", tie_breaker, order));
        }
    }
    if !keys.is_empty() {
        sql.push_str(" ORDER BY ");
        sql.push_str(&keys.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};

    use super::*;
    use crate::adapter::db::pagination::bind::FilterKind;
    use crate::adapter::db::pagination::config::{
        DateField, FilterField, JoinConfig, JoinKind, Relation, SelectField, SortOrder,
    };
    use crate::application::dto::pagination::DateRange;

    const BASE_SELECT: &str = "SELECT accounts.* FROM accounts WHERE is_deleted = $1";

    #[fixture]
    fn config() -> PaginationConfig {
        PaginationConfig {
            table: "accounts",
            base_conditions: vec![("is_deleted", BindValue::Boolean(false))],
            search_fields: vec!["name", "email"],
            filter_fields: HashMap::from([
                ("role", FilterField::text("role")),
                ("age", FilterField::typed("age", FilterKind::Integer)),
            ]),
            date_fields: HashMap::from([("created_at", DateField::single("created_at"))]),
            sort_fields: vec!["name", "created_at"],
            default_sort: "created_at",
            default_order: None,
            tie_breaker: Some("id"),
            ..PaginationConfig::default()
        }
    }

    fn with_filter(name: &str, value: &str) -> QueryParams {
        let mut params = QueryParams::default();
        params.filters.insert(name.to_string(), value.to_string());
        params
    }

    #[rstest]
    fn test_default_query_shape(config: PaginationConfig) {
        let query = PageQuery::build(&QueryParams::default(), &config);

        assert_eq!(
            query.count_sql,
            format!("SELECT COUNT(*) FROM ({}) AS filtered", BASE_SELECT)
        );
        assert_eq!(
            query.fetch_sql,
            format!("{} ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3", BASE_SELECT)
        );
        assert_eq!(query.count_binds(), &[BindValue::Boolean(false)]);
        assert_eq!(
            query.fetch_binds(),
            &[
                BindValue::Boolean(false),
                BindValue::Integer(10),
                BindValue::Integer(0)
            ]
        );
    }

    #[rstest]
    fn test_limit_and_offset_follow_clamped_page(config: PaginationConfig) {
        let params = QueryParams {
            page: 3,
            page_size: 500,
            ..QueryParams::default()
        };
        let query = PageQuery::build(&params, &config);

        assert_eq!(query.page, PageRequest { page: 3, page_size: 100 });
        assert_eq!(
            &query.fetch_binds()[1..],
            &[BindValue::Integer(100), BindValue::Integer(200)]
        );
    }

    #[rstest]
    fn test_search_is_bound_once_and_escaped(config: PaginationConfig) {
        let params = QueryParams {
            search: Some("  jo_hn ".to_string()),
            ..QueryParams::default()
        };
        let query = PageQuery::build(&params, &config);

        assert!(query
            .count_sql
            .contains("WHERE is_deleted = $1 AND (name ILIKE $2 OR email ILIKE $2)"));
        assert_eq!(query.count_binds()[1], BindValue::Text("%jo\\_hn%".to_string()));
        assert!(!query.fetch_sql.contains("jo_hn"));
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("   "))]
    fn test_empty_search_is_no_search(config: PaginationConfig, #[case] search: Option<&str>) {
        let params = QueryParams {
            search: search.map(String::from),
            ..QueryParams::default()
        };
        let query = PageQuery::build(&params, &config);
        let baseline = PageQuery::build(&QueryParams::default(), &config);

        assert_eq!(query.fetch_sql, baseline.fetch_sql);
        assert_eq!(query.fetch_binds(), baseline.fetch_binds());
    }

    #[rstest]
    fn test_search_without_search_fields_is_ignored(mut config: PaginationConfig) {
        config.search_fields.clear();
        let params = QueryParams {
            search: Some("john".to_string()),
            ..QueryParams::default()
        };
        let query = PageQuery::build(&params, &config);

        assert!(!query.count_sql.contains("ILIKE"));
        assert_eq!(query.count_binds().len(), 1);
    }

    #[rstest]
    fn test_allow_listed_filter_is_bound(config: PaginationConfig) {
        let query = PageQuery::build(&with_filter("role", "admin"), &config);

        assert!(query.count_sql.contains("WHERE is_deleted = $1 AND role = $2"));
        assert_eq!(query.count_binds()[1], BindValue::Text("admin".to_string()));
    }

    #[rstest]
    #[case("password", "x")]
    #[case("role; DROP TABLE accounts", "admin")]
    #[case("age", "not-a-number")]
    fn test_rejected_filter_has_no_effect(
        config: PaginationConfig,
        #[case] name: &str,
        #[case] value: &str,
    ) {
        let query = PageQuery::build(&with_filter(name, value), &config);
        let baseline = PageQuery::build(&QueryParams::default(), &config);

        assert_eq!(query.count_sql, baseline.count_sql);
        assert_eq!(query.fetch_sql, baseline.fetch_sql);
        assert_eq!(query.fetch_binds(), baseline.fetch_binds());
    }

    #[rstest]
    fn test_typed_filter_binds_parsed_value(config: PaginationConfig) {
        let query = PageQuery::build(&with_filter("age", "42"), &config);

        assert!(query.count_sql.contains("age = $2"));
        assert_eq!(query.count_binds()[1], BindValue::Integer(42));
    }

    #[rstest]
    fn test_date_range_with_only_start(config: PaginationConfig) {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut params = QueryParams::default();
        params.dates.insert(
            "created_at".to_string(),
            DateRange {
                start: Some(start),
                end: None,
            },
        );
        let query = PageQuery::build(&params, &config);

        assert!(query.count_sql.contains("created_at >= $2"));
        assert!(!query.count_sql.contains("<="));
        assert_eq!(query.count_binds()[1], BindValue::Timestamp(start));
    }

    #[rstest]
    fn test_date_range_with_both_bounds_and_unknown_field(config: PaginationConfig) {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let mut params = QueryParams::default();
        params.dates.insert(
            "created_at".to_string(),
            DateRange {
                start: Some(start),
                end: Some(end),
            },
        );
        params.dates.insert(
            "deleted_at".to_string(),
            DateRange {
                start: Some(start),
                end: None,
            },
        );
        let query = PageQuery::build(&params, &config);

        assert!(query
            .count_sql
            .ends_with("WHERE is_deleted = $1 AND created_at >= $2 AND created_at <= $3) AS filtered"));
        assert!(!query.count_sql.contains("deleted_at"));
        assert_eq!(query.count_binds().len(), 3);
    }

    #[rstest]
    fn test_conditions_compose_in_order(config: PaginationConfig) {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut params = with_filter("role", "admin");
        params.search = Some("doe".to_string());
        params.dates.insert(
            "created_at".to_string(),
            DateRange {
                start: Some(start),
                end: None,
            },
        );
        let query = PageQuery::build(&params, &config);

        assert!(query.count_sql.contains(
            "WHERE is_deleted = $1 AND (name ILIKE $2 OR email ILIKE $2) AND role = $3 AND created_at >= $4"
        ));
        assert!(query.fetch_sql.ends_with("LIMIT $5 OFFSET $6"));
    }

    #[rstest]
    fn test_sort_request_outside_allow_list_falls_back(config: PaginationConfig) {
        let params = QueryParams {
            sort_by: Some("nonexistent_field".to_string()),
            sort_desc: Some(false),
            ..QueryParams::default()
        };
        let query = PageQuery::build(&params, &config);

        assert!(query.fetch_sql.contains("ORDER BY created_at ASC, id ASC"));
        assert!(!query.fetch_sql.contains("nonexistent_field"));
    }

    #[rstest]
    fn test_count_has_no_order_or_limit(config: PaginationConfig) {
        let params = QueryParams {
            sort_by: Some("name".to_string()),
            page: 2,
            ..QueryParams::default()
        };
        let query = PageQuery::build(&params, &config);

        assert!(!query.count_sql.contains("ORDER BY"));
        assert!(!query.count_sql.contains("LIMIT"));
        assert!(query.fetch_sql.contains("ORDER BY name DESC, id DESC"));
    }

    #[rstest]
    fn test_tie_breaker_not_repeated(mut config: PaginationConfig) {
        config.tie_breaker = Some("created_at");
        let query = PageQuery::build(&QueryParams::default(), &config);

        assert!(query.fetch_sql.contains("ORDER BY created_at DESC LIMIT"));
    }

    #[rstest]
    fn test_custom_projection_joins_grouping() {
        let config = PaginationConfig {
            table: "accounts",
            table_alias: Some("a"),
            base_conditions: vec![("a.is_deleted", BindValue::Boolean(false))],
            joins: vec![JoinConfig {
                kind: JoinKind::Left,
                table: "orders",
                alias: Some("o"),
                on: "o.account_id = a.id",
            }],
            select_fields: vec![
                SelectField {
                    expr: "a.id",
                    alias: None,
                },
                SelectField {
                    expr: "COUNT(o.id)",
                    alias: Some("order_count"),
                },
            ],
            group_by: vec!["a.id"],
            having: vec!["COUNT(o.id) > 0", "SUM(o.total) > 10"],
            distinct: true,
            default_sort: "a.id",
            default_order: Some(SortOrder::Asc),
            ..PaginationConfig::default()
        };
        let query = PageQuery::build(&QueryParams::default(), &config);

        let filtered = "SELECT DISTINCT a.id, COUNT(o.id) AS order_count FROM accounts AS a \
                        LEFT JOIN orders AS o ON o.account_id = a.id \
                        WHERE a.is_deleted = $1 GROUP BY a.id \
                        HAVING COUNT(o.id) > 0 AND SUM(o.total) > 10";
        assert_eq!(query.count_sql, format!("SELECT COUNT(*) FROM ({}) AS filtered", filtered));
        assert_eq!(
            query.fetch_sql,
            format!("{} ORDER BY a.id ASC LIMIT $2 OFFSET $3", filtered)
        );
    }

    #[rstest]
    fn test_relations_are_projected_as_json(mut config: PaginationConfig) {
        config.relations.push(Relation {
            name: "sessions",
            table: "sessions",
            foreign_key: "account_id",
            local_key: "id",
        });
        let query = PageQuery::build(&QueryParams::default(), &config);

        assert!(query.fetch_sql.starts_with(
            "SELECT accounts.*, COALESCE((SELECT jsonb_agg(sessions_rel) FROM sessions AS sessions_rel \
             WHERE sessions_rel.account_id = accounts.id), '[]'::jsonb) AS sessions FROM accounts"
        ));
    }

    #[rstest]
    fn test_distinct_with_relation_uses_comparable_aggregate(mut config: PaginationConfig) {
        config.distinct = true;
        config.relations.push(Relation {
            name: "sessions",
            table: "sessions",
            foreign_key: "account_id",
            local_key: "id",
        });
        let query = PageQuery::build(&QueryParams::default(), &config);

        assert!(query.count_sql.starts_with("SELECT COUNT(*) FROM (SELECT DISTINCT accounts.*, COALESCE("));
        assert!(query.count_sql.contains("jsonb_agg(sessions_rel)"));
        assert!(query.count_sql.contains("'[]'::jsonb) AS sessions"));
        assert!(!query.fetch_sql.contains("::json)"));
    }
}
