//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;

use crate::loan_service::LoanService;
use crate::middleware::JwtSecret;
use crate::services::Notifier;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub loan_service: Arc<LoanService>,
    pub notifier: Arc<Notifier>,
    pub jwt_secret: JwtSecret,
}

impl AppState {
    pub fn new(loan_service: Arc<LoanService>, notifier: Arc<Notifier>, jwt_secret: String) -> Self {
        Self {
            loan_service,
            notifier,
            jwt_secret: JwtSecret(jwt_secret),
        }
    }
}

impl FromRef<AppState> for JwtSecret {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.jwt_secret.clone()
    }
}

impl FromRef<AppState> for Arc<LoanService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.loan_service.clone()
    }
}

impl FromRef<AppState> for Arc<Notifier> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.notifier.clone()
    }
}
