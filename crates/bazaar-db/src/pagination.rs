//! Generic paginate-by-filter over a single table.

use bazaar_core::{AppError, Page, PageRequest};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use crate::database::db_error;

/// A list filter that can append its conditions to a query.
///
/// Implementations push zero or more ` AND <condition>` fragments with bound
/// values; the query they extend always ends in `WHERE TRUE`.
pub trait ListFilter {
    fn push_conditions(&self, qb: &mut QueryBuilder<'_, Postgres>);
}

/// Count and fetch one page of `table` rows matching `filter`, newest first.
pub async fn paginate<R, F>(
    pool: &PgPool,
    table: &str,
    filter: &F,
    request: PageRequest,
) -> Result<Page<R>, AppError>
where
    R: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    F: ListFilter + Sync,
{
    let mut count = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {table} WHERE TRUE"));
    filter.push_conditions(&mut count);
    let (total,): (i64,) = count
        .build_query_as()
        .fetch_one(pool)
        .await
        .map_err(db_error)?;

    let mut select = QueryBuilder::<Postgres>::new(format!("SELECT * FROM {table} WHERE TRUE"));
    filter.push_conditions(&mut select);
    select
        .push(" ORDER BY created_at DESC, id LIMIT ")
        .push_bind(i64::from(request.limit()))
        .push(" OFFSET ")
        .push_bind(request.offset() as i64);
    let rows = select
        .build_query_as::<R>()
        .fetch_all(pool)
        .await
        .map_err(db_error)?;

    tracing::debug!(table, total, returned = rows.len(), "Paginated query");
    Ok(Page::new(rows, total.max(0) as u64, request))
}

/// `%term%` for ILIKE, with LIKE wildcards in `term` escaped.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.trim().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Push ` AND (col1 ILIKE $n OR col2 ILIKE $n ...)` for a search term.
pub(crate) fn push_search(qb: &mut QueryBuilder<'_, Postgres>, columns: &[&str], term: &str) {
    let pattern = like_pattern(term);
    qb.push(" AND (");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            qb.push(" OR ");
        }
        qb.push(*column).push(" ILIKE ").push_bind(pattern.clone());
    }
    qb.push(")");
}
