//! HTTP contract tests.
//!
//! The rejection paths (missing parameter, missing token, invalid status
//! value) never touch the database, so they run against a lazily-connected
//! pool and need no infrastructure. Tests exercising real data require
//! `TEST_DATABASE_URL` and are ignored by default.

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use sqlx::PgPool;
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

    use loanledger_server::loan_service::LoanService;
    use loanledger_server::routes;
    use loanledger_server::services::Notifier;
    use loanledger_server::state::AppState;

    const TEST_JWT_SECRET: &str = "test-secret";

    fn test_app(pool: PgPool) -> Router {
        let state = AppState::new(
            Arc::new(LoanService::new(pool)),
            Arc::new(Notifier::new(None)),
            TEST_JWT_SECRET.to_string(),
        );
        Router::new().merge(routes::loan_routes()).with_state(state)
    }

    /// A pool that never connects; fine for handlers that reject first
    fn lazy_pool() -> PgPool {
        sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgresql://localhost/loanledger_unreachable")
            .expect("Failed to build lazy pool")
    }

    async fn connected_pool() -> PgPool {
        let database_url = std::env::var("TEST_DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/loanledger_test".to_string());

        sqlx::postgres::PgPoolOptions::new()
            .max_connections(2)
            .connect(&database_url)
            .await
            .expect("Failed to connect to test database")
    }

    fn bearer_token(lender_id: Uuid) -> String {
        #[derive(serde::Serialize)]
        struct Claims {
            sub: String,
            exp: usize,
        }

        let claims = Claims {
            sub: lender_id.to_string(),
            exp: 4_000_000_000, // far future
        };
        jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
        )
        .expect("Failed to sign test token")
    }

    #[tokio::test]
    async fn missing_aadhaar_number_is_a_400() {
        let app = test_app(lazy_pool());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/loan/get-loan-by-aadhar")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Aadhaar number is required");
    }

    #[tokio::test]
    async fn lender_listing_requires_a_token() {
        let app = test_app(lazy_pool());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/loan/get-loan-by-lender")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let app = test_app(lazy_pool());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/loan/get-loan-by-lender")
                    .header(header::AUTHORIZATION, "Bearer not-a-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn out_of_range_status_value_is_a_400() {
        let app = test_app(lazy_pool());

        let response = app
            .oneshot(
                Request::builder()
                    .method("PATCH")
                    .uri(format!("/loan/update-loan-status/{}", Uuid::new_v4()))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"status":"settled"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn non_numeric_amount_filter_is_rejected() {
        let app = test_app(lazy_pool());

        // minAmount must parse as a number; nothing is coerced to zero
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/loan/get-loan-by-aadhar?aadhaarNumber=123412341234&minAmount=abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    #[ignore] // requires a database
    async fn empty_result_set_maps_to_404() {
        let app = test_app(connected_pool().await);

        // A freshly generated identity has no loans
        let aadhaar = format!("{:012}", Uuid::new_v4().as_u128() % 1_000_000_000_000);

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/loan/get-loan-by-aadhar?aadhaarNumber={}", aadhaar))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    #[ignore] // requires a database
    async fn lender_listing_with_valid_token_and_no_loans_is_404() {
        let app = test_app(connected_pool().await);

        // Token is valid but this lender has no records
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/loan/get-loan-by-lender")
                    .header(
                        header::AUTHORIZATION,
                        format!("Bearer {}", bearer_token(Uuid::new_v4())),
                    )
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
