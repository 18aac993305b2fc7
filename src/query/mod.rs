//! Predicate construction for loan listings.
//!
//! Translates the optional filter parameters accepted by the listing
//! endpoints into bound SQL clauses on top of a base scope. Filters are
//! independent and conjunctive. Presence is carried by `Option`, so an
//! explicit zero bound produces a real clause; only a missing parameter
//! skips one.
//!
//! All clauses qualify columns with the `l` alias; every SELECT that feeds
//! a predicate aliases the loans table accordingly.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::LoanStatus;

/// Base predicate: which side of the ledger a listing is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoanScope {
    /// Loans created by this lender (the outward side).
    Lender(Uuid),
    /// Loans naming this Aadhaar number as the borrower (the inward side).
    Borrower(String),
}

impl LoanScope {
    fn push_clause(&self, qb: &mut QueryBuilder<Postgres>) {
        match self {
            LoanScope::Lender(id) => {
                qb.push(" AND l.lender_id = ");
                qb.push_bind(*id);
            }
            LoanScope::Borrower(aadhaar) => {
                qb.push(" AND l.aadhaar_number = ");
                qb.push_bind(aadhaar.clone());
            }
        }
    }
}

/// Optional, independent filter criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoanFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<LoanStatus>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
}

impl LoanFilter {
    pub fn push_clauses(&self, qb: &mut QueryBuilder<Postgres>) {
        if let Some(start) = self.start_date {
            qb.push(" AND l.loan_start_date >= ");
            qb.push_bind(start);
        }
        if let Some(end) = self.end_date {
            qb.push(" AND l.loan_end_date <= ");
            qb.push_bind(end);
        }
        if let Some(status) = self.status {
            qb.push(" AND l.status = ");
            qb.push_bind(status);
        }
        if let Some(min) = self.min_amount {
            qb.push(" AND l.amount >= ");
            qb.push_bind(min);
        }
        if let Some(max) = self.max_amount {
            qb.push(" AND l.amount <= ");
            qb.push_bind(max);
        }
    }
}

/// The full predicate for a listing: base scope plus optional filters.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanQuery {
    pub scope: LoanScope,
    pub filter: LoanFilter,
}

impl LoanQuery {
    pub fn new(scope: LoanScope) -> Self {
        Self {
            scope,
            filter: LoanFilter::default(),
        }
    }

    pub fn with_filter(scope: LoanScope, filter: LoanFilter) -> Self {
        Self { scope, filter }
    }

    /// Append every clause of the predicate. Ordering and pagination are the
    /// caller's concern.
    pub fn push_clauses(&self, qb: &mut QueryBuilder<Postgres>) {
        self.scope.push_clause(qb);
        self.filter.push_clauses(qb);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "SELECT l.* FROM loans l WHERE 1=1";

    fn sql_for(query: &LoanQuery) -> String {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(BASE);
        query.push_clauses(&mut qb);
        qb.sql().to_string()
    }

    #[test]
    fn test_bare_scope_adds_no_extra_clauses() {
        let query = LoanQuery::new(LoanScope::Lender(Uuid::nil()));
        assert_eq!(sql_for(&query), format!("{BASE} AND l.lender_id = $1"));
    }

    #[test]
    fn test_borrower_scope_binds_aadhaar() {
        let query = LoanQuery::new(LoanScope::Borrower("123412341234".to_string()));
        assert_eq!(sql_for(&query), format!("{BASE} AND l.aadhaar_number = $1"));
    }

    #[test]
    fn test_all_filters_are_conjunctive() {
        let filter = LoanFilter {
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 31),
            status: Some(LoanStatus::Paid),
            min_amount: Some(Decimal::from(500)),
            max_amount: Some(Decimal::from(5000)),
        };
        let query = LoanQuery::with_filter(LoanScope::Lender(Uuid::nil()), filter);

        let sql = sql_for(&query);
        assert!(sql.contains(" AND l.lender_id = $1"));
        assert!(sql.contains(" AND l.loan_start_date >= $2"));
        assert!(sql.contains(" AND l.loan_end_date <= $3"));
        assert!(sql.contains(" AND l.status = $4"));
        assert!(sql.contains(" AND l.amount >= $5"));
        assert!(sql.contains(" AND l.amount <= $6"));
    }

    #[test]
    fn test_zero_min_amount_is_a_real_clause() {
        let filter = LoanFilter {
            min_amount: Some(Decimal::ZERO),
            ..Default::default()
        };
        let query = LoanQuery::with_filter(LoanScope::Lender(Uuid::nil()), filter);

        assert!(sql_for(&query).contains(" AND l.amount >= $2"));
    }

    #[test]
    fn test_absent_filters_emit_nothing() {
        let query = LoanQuery::with_filter(
            LoanScope::Lender(Uuid::nil()),
            LoanFilter {
                status: Some(LoanStatus::Pending),
                ..Default::default()
            },
        );

        let sql = sql_for(&query);
        assert!(sql.contains(" AND l.status = $2"));
        assert!(!sql.contains("amount"));
        assert!(!sql.contains("loan_start_date"));
        assert!(!sql.contains("loan_end_date"));
    }

    #[test]
    fn test_predicate_is_deterministic() {
        let filter = LoanFilter {
            status: Some(LoanStatus::Pending),
            min_amount: Some(Decimal::from(100)),
            ..Default::default()
        };
        let query = LoanQuery::with_filter(LoanScope::Borrower("999900001111".to_string()), filter);

        assert_eq!(sql_for(&query), sql_for(&query));
    }
}
