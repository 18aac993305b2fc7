//! Loan HTTP handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthenticatedLender;
use crate::models::{
    AcceptanceStatus, BorrowerLoanListResponse, BorrowerLoanQuery, CreateLoanRequest,
    LoanListQuery, LoanListResponse, LoanResponse, LoanStatsResponse, LoanStatus, LoansResponse,
    StatsQuery, StatusChangeRequest, UpdateLoanRequest,
};
use crate::state::AppState;

/// POST /loan/add-loan
pub async fn add_loan(
    State(state): State<AppState>,
    lender: AuthenticatedLender,
    Json(req): Json<CreateLoanRequest>,
) -> ApiResult<(StatusCode, Json<LoanResponse>)> {
    req.validate()?;

    let loan = state.loan_service.create_loan(lender.lender_id, req).await?;

    let notifier = state.notifier.clone();
    let created = loan.clone();
    tokio::spawn(async move { notifier.loan_updated(created).await });

    Ok((
        StatusCode::CREATED,
        Json(LoanResponse {
            message: "Loan created successfully".to_string(),
            data: loan,
        }),
    ))
}

/// GET /loan/all-loans
pub async fn all_loans(State(state): State<AppState>) -> ApiResult<Json<LoansResponse>> {
    let loans = state.loan_service.list_all().await?;

    Ok(Json(LoansResponse {
        message: "Loans data fetched successfully".to_string(),
        data: loans,
    }))
}

/// GET /loan/loan-details/:id
pub async fn loan_details(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<LoanResponse>> {
    let loan = state.loan_service.get_loan(id).await?;

    Ok(Json(LoanResponse {
        message: "Loan data fetched successfully".to_string(),
        data: loan,
    }))
}

/// GET /loan/my-loans - every loan the caller has lent, newest first
pub async fn my_loans(
    State(state): State<AppState>,
    lender: AuthenticatedLender,
) -> ApiResult<Json<LoansResponse>> {
    let loans = state.loan_service.loans_for_lender(lender.lender_id).await?;

    if loans.is_empty() {
        return Err(ApiError::NotFound("No loans found".to_string()));
    }

    Ok(Json(LoansResponse {
        message: "Loans fetched successfully".to_string(),
        data: loans,
    }))
}

/// DELETE /loan/delete-loan/:id
pub async fn delete_loan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<LoanResponse>> {
    let loan = state.loan_service.delete_loan(id).await?;

    Ok(Json(LoanResponse {
        message: "Loan deleted successfully".to_string(),
        data: loan,
    }))
}

/// PUT /loan/update-loan/:id
pub async fn update_loan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateLoanRequest>,
) -> ApiResult<Json<LoanResponse>> {
    req.validate()?;

    let loan = state.loan_service.update_details(id, req).await?;

    let notifier = state.notifier.clone();
    let updated = loan.clone();
    tokio::spawn(async move { notifier.loan_updated(updated).await });

    Ok(Json(LoanResponse {
        message: "Loan updated successfully".to_string(),
        data: loan,
    }))
}

/// PATCH /loan/update-loan-status/:id
pub async fn update_loan_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusChangeRequest>,
) -> ApiResult<Json<LoanResponse>> {
    let status = LoanStatus::from_param(&req.status).ok_or_else(|| {
        ApiError::BadRequest(
            "Invalid status value. Only 'pending' or 'paid' are allowed.".to_string(),
        )
    })?;

    let loan = state.loan_service.set_repayment_status(id, status).await?;

    let notifier = state.notifier.clone();
    let updated = loan.clone();
    tokio::spawn(async move { notifier.loan_updated(updated).await });

    Ok(Json(LoanResponse {
        message: "Loan status updated successfully".to_string(),
        data: loan,
    }))
}

/// PATCH /loan/update-loan-acceptance-status/:id
pub async fn update_loan_acceptance_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusChangeRequest>,
) -> ApiResult<Json<LoanResponse>> {
    let status = AcceptanceStatus::from_param(&req.status).ok_or_else(|| {
        ApiError::BadRequest(
            "Invalid status value. Only 'pending' or 'accepted' or 'rejected' are allowed."
                .to_string(),
        )
    })?;

    let loan = state.loan_service.set_acceptance_status(id, status).await?;

    // The answer goes back to the lender, not the borrower
    let notifier = state.notifier.clone();
    let (lender_id, borrower_name) = (loan.lender_id, loan.borrower_name.clone());
    tokio::spawn(async move {
        notifier
            .acceptance_changed(lender_id, borrower_name, status)
            .await
    });

    Ok(Json(LoanResponse {
        message: "Loan status updated successfully".to_string(),
        data: loan,
    }))
}

/// GET /loan/get-loan-by-lender
pub async fn get_loans_by_lender(
    State(state): State<AppState>,
    lender: AuthenticatedLender,
    Query(query): Query<LoanListQuery>,
) -> ApiResult<Json<LoanListResponse>> {
    let page = state
        .loan_service
        .loans_by_lender(lender.lender_id, query.filter(), query.page_params())
        .await?;

    // An empty filtered page is a 404, not a 200 with an empty array
    if page.data.is_empty() {
        return Err(ApiError::NotFound(
            "No loans found for this lender".to_string(),
        ));
    }

    Ok(Json(LoanListResponse {
        message: "Loans fetched successfully".to_string(),
        data: page.data,
        pagination: page.pagination,
    }))
}

/// GET /loan/get-loan-by-aadhar
pub async fn get_loans_by_aadhaar(
    State(state): State<AppState>,
    Query(query): Query<BorrowerLoanQuery>,
) -> ApiResult<Json<BorrowerLoanListResponse>> {
    let aadhaar_number = query
        .aadhaar_number
        .clone()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Aadhaar number is required".to_string()))?;

    let (page, total_amount) = state
        .loan_service
        .loans_by_borrower(aadhaar_number, query.filter(), query.page_params())
        .await?;

    if page.data.is_empty() {
        return Err(ApiError::NotFound("No loans found".to_string()));
    }

    Ok(Json(BorrowerLoanListResponse {
        message: "Loan data fetched successfully".to_string(),
        total_amount,
        data: page.data,
        pagination: page.pagination,
    }))
}

/// GET /loan/loan-stats
pub async fn loan_stats(
    State(state): State<AppState>,
    lender: AuthenticatedLender,
    Query(query): Query<StatsQuery>,
) -> ApiResult<Json<LoanStatsResponse>> {
    let aadhaar_number = query
        .aadhaar_number
        .clone()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Aadhaar number is required".to_string()))?;

    let stats = state
        .loan_service
        .stats(&aadhaar_number, lender.lender_id)
        .await?;

    Ok(Json(LoanStatsResponse {
        message: "Loan stats fetched successfully".to_string(),
        data: stats,
    }))
}
