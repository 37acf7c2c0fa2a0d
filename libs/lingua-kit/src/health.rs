//! Liveness and readiness probes.
//!
//! - `/healthz`: plain `ok`, no dependencies
//! - `/health`: JSON with a database round-trip; 503 when the ping fails

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use chrono::{DateTime, Utc};
use lingua_db::Db;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HealthReport {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub database: &'static str,
}

#[must_use]
pub fn router(db: Db) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(|| async { "ok" }))
        .with_state(db)
}

async fn health_check(State(db): State<Db>) -> impl IntoResponse {
    let (status, report) = match db.ping().await {
        Ok(()) => (
            StatusCode::OK,
            HealthReport {
                status: "healthy",
                timestamp: Utc::now(),
                database: "up",
            },
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database ping failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                HealthReport {
                    status: "unhealthy",
                    timestamp: Utc::now(),
                    database: "down",
                },
            )
        }
    };
    (status, Json(report))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use axum::body::Body;
    use http::Request;
    use http_body_util::BodyExt;
    use lingua_db::DbConfig;
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_reports_database_up() {
        let db = Db::connect(&DbConfig::in_memory()).await.unwrap();
        let resp = router(db)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let v: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(v["status"], "healthy");
        assert_eq!(v["database"], "up");
        assert!(v["timestamp"].is_string());
    }

    #[tokio::test]
    async fn health_reports_database_down_after_close() {
        let db = Db::connect(&DbConfig::in_memory()).await.unwrap();
        db.conn().clone().close().await.unwrap();
        let resp = router(db)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn healthz_is_plain_ok() {
        let db = Db::connect(&DbConfig::in_memory()).await.unwrap();
        let resp = router(db)
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"ok");
    }
}
