use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgConnection};
use tracing::{debug, error};

use crate::adapter::db::pagination::bind::{bind_values, BindValue};
use crate::adapter::db::pagination::builder::PageQuery;
use crate::adapter::db::pagination::config::PaginationConfig;
use crate::application::app_error::{AppError, AppResult, QueryStage};
use crate::application::dto::pagination::{PaginatedResponse, QueryParams};

fn query_failed(stage: QueryStage, source: sqlx::Error) -> AppError {
    error!("Pagination query failed to {}: {}", stage, source);
    AppError::QueryFailed { stage, source }
}

/// Counts the filtered set, then fetches one page of it, on the same connection.
/// Read-only; either both statements succeed or the whole call fails.
pub async fn paginate<T>(
    conn: &mut PgConnection,
    params: &QueryParams,
    config: &PaginationConfig,
) -> AppResult<PaginatedResponse<T>>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let query = PageQuery::build(params, config);
    debug!(sql = %query.fetch_sql, "Paginating {}", config.table);

    let total: i64 = bind_values!(
        sqlx::query_scalar::<_, i64>(&query.count_sql),
        query.count_binds().iter().cloned()
    )
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| query_failed(QueryStage::Count, e))?;

    let data: Vec<T> = bind_values!(
        sqlx::query_as::<_, T>(&query.fetch_sql),
        query.fetch_binds().iter().cloned()
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| query_failed(QueryStage::Fetch, e))?;

    Ok(PaginatedResponse {
        data,
        total,
        page: query.page.page,
        page_size: query.page.page_size,
        total_pages: query.page.total_pages(total),
    })
}
