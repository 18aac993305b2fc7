//! Route definitions for the loan ledger API

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// Loan routes
pub fn loan_routes() -> Router<AppState> {
    Router::new()
        .route("/loan/add-loan", post(handlers::add_loan))
        .route("/loan/all-loans", get(handlers::all_loans))
        .route("/loan/loan-details/:id", get(handlers::loan_details))
        .route("/loan/my-loans", get(handlers::my_loans))
        .route("/loan/delete-loan/:id", delete(handlers::delete_loan))
        .route("/loan/update-loan/:id", put(handlers::update_loan))
        .route(
            "/loan/update-loan-status/:id",
            patch(handlers::update_loan_status),
        )
        .route(
            "/loan/update-loan-acceptance-status/:id",
            patch(handlers::update_loan_acceptance_status),
        )
        .route(
            "/loan/get-loan-by-lender",
            get(handlers::get_loans_by_lender),
        )
        .route(
            "/loan/get-loan-by-aadhar",
            get(handlers::get_loans_by_aadhaar),
        )
        .route("/loan/loan-stats", get(handlers::loan_stats))
}
