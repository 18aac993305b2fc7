//! Loan service layer - business logic for loan records.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    AcceptanceStatus, CreateLoanRequest, Loan, LoanStats, LoanStatus, LoanWithLender,
    UpdateLoanRequest,
};
use crate::pagination::{paginate, Page, PageParams, NEWEST_FIRST};
use crate::query::{LoanFilter, LoanQuery, LoanScope};

const LOAN_SELECT: &str = "SELECT l.* FROM loans l WHERE 1=1";
const LOAN_COUNT: &str = "SELECT COUNT(*) FROM loans l WHERE 1=1";

const LOAN_WITH_LENDER_SELECT: &str = "SELECT l.*, \
     u.user_name AS lender_user_name, u.email AS lender_email, u.mobile_no AS lender_mobile_no \
     FROM loans l JOIN users u ON u.id = l.lender_id WHERE 1=1";
const LOAN_WITH_LENDER_COUNT: &str =
    "SELECT COUNT(*) FROM loans l JOIN users u ON u.id = l.lender_id WHERE 1=1";

/// Loan service for managing the loan lifecycle
pub struct LoanService {
    db_pool: PgPool,
}

impl LoanService {
    /// Create a new loan service instance
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Record a new loan for `lender_id`. The named borrower must already be
    /// a registered user.
    pub async fn create_loan(&self, lender_id: Uuid, req: CreateLoanRequest) -> ApiResult<Loan> {
        let borrower_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE aadhaar_number = $1)",
        )
        .bind(&req.aadhaar_number)
        .fetch_one(&self.db_pool)
        .await?;

        if !borrower_exists {
            return Err(ApiError::NotFound(
                "User with the provided Aadhaar number does not exist".to_string(),
            ));
        }

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (
                lender_id, aadhaar_number, borrower_name, amount, purpose,
                address, loan_start_date, loan_end_date, status,
                borrower_acceptance_status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(lender_id)
        .bind(&req.aadhaar_number)
        .bind(&req.borrower_name)
        .bind(req.amount)
        .bind(&req.purpose)
        .bind(&req.address)
        .bind(req.loan_start_date)
        .bind(req.loan_end_date)
        .bind(LoanStatus::Pending)
        .bind(AcceptanceStatus::Pending)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.db_pool)
        .await?;

        Ok(loan)
    }

    /// Get a loan by ID
    pub async fn get_loan(&self, id: Uuid) -> ApiResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("Loan data not found".to_string()))
    }

    /// List every loan, newest first
    pub async fn list_all(&self) -> ApiResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>("SELECT * FROM loans ORDER BY created_at DESC")
            .fetch_all(&self.db_pool)
            .await?;

        Ok(loans)
    }

    /// Every loan the given user has lent, newest first
    pub async fn loans_for_lender(&self, lender_id: Uuid) -> ApiResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(
            "SELECT * FROM loans WHERE lender_id = $1 ORDER BY created_at DESC",
        )
        .bind(lender_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(loans)
    }

    /// Delete a loan, returning the deleted record
    pub async fn delete_loan(&self, id: Uuid) -> ApiResult<Loan> {
        sqlx::query_as::<_, Loan>("DELETE FROM loans WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("Loan data not found".to_string()))
    }

    /// Replace the editable details of a loan. Edits invalidate any earlier
    /// borrower acknowledgment, so acceptance drops back to pending.
    pub async fn update_details(&self, id: Uuid, req: UpdateLoanRequest) -> ApiResult<Loan> {
        sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans
            SET amount = $1, purpose = $2, address = $3, loan_start_date = $4,
                loan_end_date = $5, borrower_acceptance_status = 'pending',
                updated_at = $6
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(req.amount)
        .bind(&req.purpose)
        .bind(&req.address)
        .bind(req.loan_start_date)
        .bind(req.loan_end_date)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Loan data not found".to_string()))
    }

    /// Move a loan between pending and paid. Re-asserting the current state
    /// is rejected.
    pub async fn set_repayment_status(&self, id: Uuid, status: LoanStatus) -> ApiResult<Loan> {
        let loan = sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("Loan not found".to_string()))?;

        if loan.status == status {
            return Err(ApiError::BadRequest(format!(
                "Loan is already marked as '{}'",
                status.as_str()
            )));
        }

        let updated = sqlx::query_as::<_, Loan>(
            "UPDATE loans SET status = $1, updated_at = $2 WHERE id = $3 RETURNING *",
        )
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(updated)
    }

    /// Record the borrower's acknowledgment of the loan.
    pub async fn set_acceptance_status(
        &self,
        id: Uuid,
        status: AcceptanceStatus,
    ) -> ApiResult<Loan> {
        let loan = sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("Loan not found".to_string()))?;

        if loan.borrower_acceptance_status == status {
            return Err(ApiError::BadRequest(format!(
                "Loan is already marked as '{}'",
                status.as_str()
            )));
        }

        let updated = sqlx::query_as::<_, Loan>(
            "UPDATE loans SET borrower_acceptance_status = $1, updated_at = $2 WHERE id = $3 RETURNING *",
        )
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(updated)
    }

    /// Paginated outward listing for a lender.
    pub async fn loans_by_lender(
        &self,
        lender_id: Uuid,
        filter: LoanFilter,
        params: PageParams,
    ) -> ApiResult<Page<Loan>> {
        let query = LoanQuery::with_filter(LoanScope::Lender(lender_id), filter);

        let page = paginate::<Loan>(
            &self.db_pool,
            LOAN_SELECT,
            LOAN_COUNT,
            &query,
            params,
            NEWEST_FIRST,
        )
        .await?;

        Ok(page)
    }

    /// Paginated inward listing for a borrower identity, with the lender's
    /// contact details resolved onto each loan. The returned total covers
    /// only the rows on this page, not the whole filtered set.
    pub async fn loans_by_borrower(
        &self,
        aadhaar_number: String,
        filter: LoanFilter,
        params: PageParams,
    ) -> ApiResult<(Page<LoanWithLender>, Decimal)> {
        let query = LoanQuery::with_filter(LoanScope::Borrower(aadhaar_number), filter);

        let page = paginate::<LoanWithLender>(
            &self.db_pool,
            LOAN_WITH_LENDER_SELECT,
            LOAN_WITH_LENDER_COUNT,
            &query,
            params,
            NEWEST_FIRST,
        )
        .await?;

        let total_amount = outstanding_page_total(&page.data);

        Ok((page, total_amount))
    }

    /// Headline counts for one user: loans taken under their Aadhaar number
    /// (total / pending / paid) and loans given as a lender. The two sides
    /// are independent reads and run concurrently.
    pub async fn stats(&self, aadhaar_number: &str, lender_id: Uuid) -> ApiResult<LoanStats> {
        let taken = sqlx::query_as::<_, (i64, i64, i64)>(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE status = 'pending'),
                   COUNT(*) FILTER (WHERE status = 'paid')
            FROM loans
            WHERE aadhaar_number = $1
            "#,
        )
        .bind(aadhaar_number)
        .fetch_one(&self.db_pool);

        let given = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM loans WHERE lender_id = $1")
            .bind(lender_id)
            .fetch_one(&self.db_pool);

        let ((taken_count, pending_count, paid_count), given_count) =
            tokio::try_join!(taken, given)?;

        Ok(LoanStats {
            loans_taken_count: taken_count,
            loans_pending_count: pending_count,
            loans_paid_count: paid_count,
            loans_given_count: given_count,
        })
    }
}

/// Sum of amounts still owed among the given loans: repayment pending and
/// borrower-accepted. A pure reduction over an already-fetched page.
pub fn outstanding_page_total(loans: &[LoanWithLender]) -> Decimal {
    loans
        .iter()
        .filter(|l| {
            l.loan.status == LoanStatus::Pending
                && l.loan.borrower_acceptance_status == AcceptanceStatus::Accepted
        })
        .map(|l| l.loan.amount)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveDate};
    use crate::models::LenderContact;

    fn page_entry(amount: i64, status: LoanStatus, acceptance: AcceptanceStatus) -> LoanWithLender {
        LoanWithLender {
            loan: Loan {
                id: Uuid::new_v4(),
                lender_id: Uuid::nil(),
                aadhaar_number: "123412341234".to_string(),
                borrower_name: "Asha".to_string(),
                amount: Decimal::from(amount),
                purpose: None,
                address: None,
                loan_start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                loan_end_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                status,
                borrower_acceptance_status: acceptance,
                created_at: DateTime::<Utc>::MIN_UTC,
                updated_at: DateTime::<Utc>::MIN_UTC,
            },
            lender: LenderContact {
                user_name: "Ravi".to_string(),
                email: "ravi@example.com".to_string(),
                mobile_no: "9000000000".to_string(),
            },
        }
    }

    #[test]
    fn test_total_counts_only_pending_accepted() {
        let page = vec![
            page_entry(100, LoanStatus::Pending, AcceptanceStatus::Accepted),
            page_entry(250, LoanStatus::Pending, AcceptanceStatus::Accepted),
            // Excluded: repaid, or never acknowledged
            page_entry(400, LoanStatus::Paid, AcceptanceStatus::Accepted),
            page_entry(800, LoanStatus::Pending, AcceptanceStatus::Pending),
            page_entry(900, LoanStatus::Pending, AcceptanceStatus::Rejected),
        ];

        assert_eq!(outstanding_page_total(&page), Decimal::from(350));
    }

    #[test]
    fn test_total_of_empty_page_is_zero() {
        assert_eq!(outstanding_page_total(&[]), Decimal::ZERO);
    }
}
