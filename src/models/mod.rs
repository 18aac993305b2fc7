//! Data models and API DTOs for the loan ledger.
//!
//! Wire names are camelCase to match the mobile client's contract; Rust
//! fields stay snake_case.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::pagination::{PageParams, Pagination};
use crate::query::LoanFilter;

/// Repayment state of a loan.
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "loan_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Pending,
    Paid,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Pending => "pending",
            LoanStatus::Paid => "paid",
        }
    }

    /// Parse a client-supplied status value. Anything outside the two known
    /// states is rejected with a 400 by the caller.
    pub fn from_param(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(LoanStatus::Pending),
            "paid" => Some(LoanStatus::Paid),
            _ => None,
        }
    }
}

/// Borrower's acknowledgment of the loan, independent of repayment.
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "acceptance_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AcceptanceStatus {
    Pending,
    Accepted,
    Rejected,
}

impl AcceptanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AcceptanceStatus::Pending => "pending",
            AcceptanceStatus::Accepted => "accepted",
            AcceptanceStatus::Rejected => "rejected",
        }
    }

    pub fn from_param(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(AcceptanceStatus::Pending),
            "accepted" => Some(AcceptanceStatus::Accepted),
            "rejected" => Some(AcceptanceStatus::Rejected),
            _ => None,
        }
    }
}

/// Loan record. `aadhaar_number` names the borrower, who may not be a
/// registered user yet; `lender_id` always references a registered user.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: Uuid,
    pub lender_id: Uuid,
    pub aadhaar_number: String,
    pub borrower_name: String,
    pub amount: Decimal,
    pub purpose: Option<String>,
    pub address: Option<String>,
    pub loan_start_date: NaiveDate,
    pub loan_end_date: NaiveDate,
    pub status: LoanStatus,
    pub borrower_acceptance_status: AcceptanceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Subset of lender profile fields exposed on borrower-facing listings.
#[derive(Debug, Serialize, sqlx::FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LenderContact {
    #[sqlx(rename = "lender_user_name")]
    pub user_name: String,
    #[sqlx(rename = "lender_email")]
    pub email: String,
    #[sqlx(rename = "lender_mobile_no")]
    pub mobile_no: String,
}

/// Loan joined with its lender's contact details.
#[derive(Debug, Serialize, sqlx::FromRow, Clone)]
pub struct LoanWithLender {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub loan: Loan,
    #[sqlx(flatten)]
    pub lender: LenderContact,
}

// ===== Request DTOs =====

/// Request body for creating a loan.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_create_dates"))]
pub struct CreateLoanRequest {
    #[validate(length(equal = 12, message = "aadhaarNumber must be 12 digits"))]
    pub aadhaar_number: String,
    #[validate(length(min = 1, message = "borrowerName must not be empty"))]
    pub borrower_name: String,
    #[validate(custom = "validate_amount_positive")]
    pub amount: Decimal,
    pub purpose: Option<String>,
    pub address: Option<String>,
    pub loan_start_date: NaiveDate,
    pub loan_end_date: NaiveDate,
}

/// Request body for editing loan details. Any edit invalidates the
/// borrower's earlier acknowledgment.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_update_dates"))]
pub struct UpdateLoanRequest {
    #[validate(custom = "validate_amount_positive")]
    pub amount: Decimal,
    pub purpose: Option<String>,
    pub address: Option<String>,
    pub loan_start_date: NaiveDate,
    pub loan_end_date: NaiveDate,
}

/// Body for the two status-transition endpoints. The value is parsed by the
/// handler so out-of-range strings come back as a 400, not a body rejection.
#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    pub status: String,
}

fn validate_amount_positive(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount <= Decimal::ZERO {
        return Err(ValidationError::new("amount must be greater than zero"));
    }
    Ok(())
}

fn validate_create_dates(req: &CreateLoanRequest) -> Result<(), ValidationError> {
    validate_date_order(req.loan_start_date, req.loan_end_date)
}

fn validate_update_dates(req: &UpdateLoanRequest) -> Result<(), ValidationError> {
    validate_date_order(req.loan_start_date, req.loan_end_date)
}

fn validate_date_order(start: NaiveDate, end: NaiveDate) -> Result<(), ValidationError> {
    if start >= end {
        return Err(ValidationError::new(
            "loanStartDate must fall before loanEndDate",
        ));
    }
    Ok(())
}

// ===== Query-string DTOs =====

/// Query string accepted by the lender-facing paginated listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<LoanStatus>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
}

impl LoanListQuery {
    pub fn filter(&self) -> LoanFilter {
        LoanFilter {
            start_date: self.start_date,
            end_date: self.end_date,
            status: self.status,
            min_amount: self.min_amount,
            max_amount: self.max_amount,
        }
    }

    pub fn page_params(&self) -> PageParams {
        PageParams::new(self.page, self.limit)
    }
}

/// Query string accepted by the borrower-facing paginated listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowerLoanQuery {
    pub aadhaar_number: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<LoanStatus>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
}

impl BorrowerLoanQuery {
    pub fn filter(&self) -> LoanFilter {
        LoanFilter {
            start_date: self.start_date,
            end_date: self.end_date,
            status: self.status,
            min_amount: self.min_amount,
            max_amount: self.max_amount,
        }
    }

    pub fn page_params(&self) -> PageParams {
        PageParams::new(self.page, self.limit)
    }
}

/// Query string for the stats endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    pub aadhaar_number: Option<String>,
}

// ===== Response DTOs =====

/// Single-loan envelope.
#[derive(Debug, Serialize)]
pub struct LoanResponse {
    pub message: String,
    pub data: Loan,
}

/// Unpaginated list envelope.
#[derive(Debug, Serialize)]
pub struct LoansResponse {
    pub message: String,
    pub data: Vec<Loan>,
}

/// Paginated lender-facing list envelope.
#[derive(Debug, Serialize)]
pub struct LoanListResponse {
    pub message: String,
    pub data: Vec<Loan>,
    pub pagination: Pagination,
}

/// Paginated borrower-facing list envelope. `total_amount` covers only the
/// rows on this page (see `LoanService::loans_by_borrower`).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowerLoanListResponse {
    pub message: String,
    pub total_amount: Decimal,
    pub data: Vec<LoanWithLender>,
    pub pagination: Pagination,
}

/// Headline counts for one user's inward and outward sides.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoanStats {
    pub loans_taken_count: i64,
    pub loans_pending_count: i64,
    pub loans_paid_count: i64,
    pub loans_given_count: i64,
}

/// Stats envelope.
#[derive(Debug, Serialize)]
pub struct LoanStatsResponse {
    pub message: String,
    pub data: LoanStats,
}
