//! Outbound notification dispatch.
//!
//! Loan lifecycle changes are pushed to an optional webhook endpoint that
//! the delivery service (push provider) consumes. Dispatch is
//! fire-and-forget: the primary write is authoritative, and a failed
//! delivery is logged, never surfaced to the client.

use anyhow::{Context, Result};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{AcceptanceStatus, Loan};

/// Notification dispatcher
#[derive(Clone)]
pub struct Notifier {
    client: reqwest::Client,
    webhook_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum NotificationPayload {
    /// A loan naming the borrower was created or changed.
    #[serde(rename_all = "camelCase")]
    LoanUpdated { aadhaar_number: String, loan: Loan },
    /// The borrower answered; addressed to the lender.
    #[serde(rename_all = "camelCase")]
    AcceptanceChanged {
        lender_id: Uuid,
        borrower_name: String,
        status: AcceptanceStatus,
    },
}

impl Notifier {
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url,
        }
    }

    /// Tell the borrower a loan naming them was created or changed.
    pub async fn loan_updated(&self, loan: Loan) {
        let payload = NotificationPayload::LoanUpdated {
            aadhaar_number: loan.aadhaar_number.clone(),
            loan,
        };
        if let Err(e) = self.dispatch(&payload).await {
            tracing::warn!(error = %e, "Loan update notification failed");
        }
    }

    /// Tell the lender the borrower accepted or rejected a loan.
    pub async fn acceptance_changed(
        &self,
        lender_id: Uuid,
        borrower_name: String,
        status: AcceptanceStatus,
    ) {
        let payload = NotificationPayload::AcceptanceChanged {
            lender_id,
            borrower_name,
            status,
        };
        if let Err(e) = self.dispatch(&payload).await {
            tracing::warn!(error = %e, "Acceptance notification failed");
        }
    }

    async fn dispatch(&self, payload: &NotificationPayload) -> Result<()> {
        let url = match &self.webhook_url {
            Some(url) => url,
            None => {
                tracing::debug!("No notification webhook configured, dropping event");
                return Ok(());
            }
        };

        self.client
            .post(url)
            .json(payload)
            .send()
            .await
            .context("Webhook request failed")?
            .error_for_status()
            .context("Webhook returned an error status")?;

        Ok(())
    }
}
