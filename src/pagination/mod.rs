//! Bounded page fetches with a uniform envelope.
//!
//! Every listing endpoint returns the same `{data, pagination}` shape. The
//! bounded page fetch and the unbounded count run concurrently against the
//! same predicate; both must resolve before the envelope is assembled. No
//! transaction spans the two reads, so a write landing between them can skew
//! the count against the page by one write; this is accepted. Storage errors
//! propagate to the caller unchanged, with no retry.

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use crate::query::LoanQuery;

/// Page size applied when the client sends none.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Default ordering for loan listings: newest first.
pub const NEWEST_FIRST: &str = "l.created_at DESC";

/// Page selector taken from the query string. Pages are 1-based; values
/// below 1 are clamped up rather than rejected.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageParams {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self { page, limit }
    }

    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_PAGE_LIMIT).max(1)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * i64::from(self.limit())
    }
}

/// Pagination metadata returned alongside every page.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total_documents: i64,
    pub current_page: u32,
    pub total_pages: u32,
}

impl Pagination {
    pub fn new(total_documents: i64, page: u32, limit: u32) -> Self {
        let limit = i64::from(limit.max(1));
        let total_pages = ((total_documents + limit - 1) / limit) as u32;
        Self {
            total_documents,
            current_page: page,
            total_pages,
        }
    }
}

/// One page of results plus its metadata. `data.len()` never exceeds the
/// requested limit.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

/// Execute a predicate with bounded page semantics.
///
/// `select` and `count` are SELECT prefixes ending in `WHERE 1=1`, aliasing
/// the loans table as `l`, over which the predicate clauses are appended.
/// The two reads share the predicate but nothing else.
pub async fn paginate<T>(
    pool: &PgPool,
    select: &str,
    count: &str,
    query: &LoanQuery,
    params: PageParams,
    order_by: &str,
) -> Result<Page<T>, sqlx::Error>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let page = params.page();
    let limit = params.limit();

    let mut select_qb: QueryBuilder<Postgres> = QueryBuilder::new(select);
    query.push_clauses(&mut select_qb);
    select_qb.push(" ORDER BY ");
    select_qb.push(order_by);
    select_qb.push(" LIMIT ");
    select_qb.push_bind(i64::from(limit));
    select_qb.push(" OFFSET ");
    select_qb.push_bind(params.offset());

    let mut count_qb: QueryBuilder<Postgres> = QueryBuilder::new(count);
    query.push_clauses(&mut count_qb);

    let (data, total_documents) = tokio::try_join!(
        select_qb.build_query_as::<T>().fetch_all(pool),
        count_qb.build_query_scalar::<i64>().fetch_one(pool),
    )?;

    Ok(Page {
        data,
        pagination: Pagination::new(total_documents, page, limit),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_params_defaults() {
        let params = PageParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), DEFAULT_PAGE_LIMIT);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_page_params_clamp_to_minimum_one() {
        let params = PageParams::new(Some(0), Some(0));
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 1);
    }

    #[test]
    fn test_offset_is_page_minus_one_times_limit() {
        let params = PageParams::new(Some(3), Some(10));
        assert_eq!(params.offset(), 20);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(Pagination::new(25, 2, 10).total_pages, 3);
        assert_eq!(Pagination::new(20, 1, 10).total_pages, 2);
        assert_eq!(Pagination::new(1, 1, 10).total_pages, 1);
        assert_eq!(Pagination::new(0, 1, 10).total_pages, 0);
    }

    #[test]
    fn test_scenario_envelope() {
        // 25 documents, page 2, limit 10
        let pagination = Pagination::new(25, 2, 10);
        assert_eq!(
            pagination,
            Pagination {
                total_documents: 25,
                current_page: 2,
                total_pages: 3,
            }
        );
    }

    #[test]
    fn test_envelope_serializes_with_contract_keys() {
        let json = serde_json::to_value(Pagination::new(25, 2, 10)).unwrap();
        assert_eq!(json["totalDocuments"], 25);
        assert_eq!(json["currentPage"], 2);
        assert_eq!(json["totalPages"], 3);
    }
}
