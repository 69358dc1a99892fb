//! API route definitions
//!
//! - /health - liveness probe
//! - /api/v1/validate - pre-solve validation report
//! - /api/v1/optimize - full blend pipeline

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{self, AppState};

/// Versioned API routes, nested under `/api/v1`
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/validate", post(handlers::validate))
        .route("/optimize", post(handlers::optimize))
        .with_state(state)
}

/// Health endpoint at root level
pub fn health_routes() -> Router {
    Router::new().route("/health", get(handlers::health))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn validate_rejects_get() {
        let app = api_routes(AppState::default());
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/validate")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn health_is_routed() {
        let resp = health_routes()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
