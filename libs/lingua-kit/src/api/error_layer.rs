//! Turns every error response leaving the router into Problem+JSON.
//!
//! Handlers return `Problem` directly; this layer covers what they cannot:
//! extractor rejections, unknown routes (404), wrong methods (405), timeouts
//! and panics. Problems produced by handlers get their `instance` and
//! `trace_id` filled in here.

use std::any::Any;

use axum::{
    body::{Body, Bytes, to_bytes},
    extract::Request,
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use lingua_errors::{APPLICATION_PROBLEM_JSON, ErrorKind, Problem, finalize};

/// Upper bound on error bodies read back for rewriting.
const MAX_ERROR_BODY: usize = 64 * 1024;

pub async fn error_mapping_middleware(request: Request, next: Next) -> Response {
    let instance = request.uri().path().to_owned();
    let trace_id = extract_trace_id(request.headers());

    let response = next.run(request).await;
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let ct = content_type(&response);
    // Deliberate JSON payloads (e.g. the 503 health report) are left alone.
    if ct.starts_with("application/json") {
        return response;
    }
    let already_problem = ct.starts_with(APPLICATION_PROBLEM_JSON);
    let (parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_ERROR_BODY).await {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read error body");
            Bytes::new()
        }
    };

    let parsed = if already_problem {
        serde_json::from_slice::<Problem>(&bytes).ok()
    } else {
        None
    };
    let problem = parsed.unwrap_or_else(|| {
        tracing::debug!(status = %status, path = %instance, "rewriting plain error response");
        plain_error_to_problem(status, &bytes)
    });

    let mut rewritten = finalize(problem, &instance, trace_id).into_response();
    for (name, value) in &parts.headers {
        if name != header::CONTENT_TYPE && name != header::CONTENT_LENGTH {
            rewritten.headers_mut().append(name.clone(), value.clone());
        }
    }
    rewritten
}

/// Keeps the original status; the body text, when any, becomes the detail.
fn plain_error_to_problem(status: http::StatusCode, body: &[u8]) -> Problem {
    let kind = ErrorKind::from_status(status);
    let text = std::str::from_utf8(body).map(str::trim).unwrap_or_default();
    let detail = if text.is_empty() {
        status.canonical_reason().unwrap_or(kind.title()).to_owned()
    } else {
        text.to_owned()
    };
    Problem::new(
        status,
        status.canonical_reason().unwrap_or(kind.title()),
        detail,
    )
    .with_code(kind.code())
}

fn content_type(response: &Response) -> String {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// `x-trace-id`, `x-request-id` or `traceparent`, else the current span id.
pub fn extract_trace_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-trace-id")
        .or_else(|| headers.get("x-request-id"))
        .or_else(|| headers.get("traceparent"))
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
        .or_else(|| {
            tracing::Span::current()
                .id()
                .map(|id| id.into_u64().to_string())
        })
}

/// `CatchPanicLayer` hook: log the payload, answer with a generic 500.
#[allow(clippy::needless_pass_by_value)]
pub fn panic_to_problem(payload: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let message = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    tracing::error!(panic = %message, "handler panicked");
    ErrorKind::InternalError
        .problem("An unexpected error occurred.")
        .into_response()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use axum::{Router, middleware, routing::get};
    use http::{Request as HttpRequest, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn problem_of(resp: Response) -> Problem {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn app() -> Router {
        Router::new()
            .route("/plain", get(|| async { (StatusCode::CONFLICT, "taken") }))
            .route(
                "/problem",
                get(|| async { lingua_errors::not_found("Culture 'xx' not found.") }),
            )
            .route("/ok", get(|| async { "fine" }))
            .route(
                "/json-503",
                get(|| async {
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        axum::Json(serde_json::json!({ "status": "unhealthy" })),
                    )
                }),
            )
            .layer(middleware::from_fn(error_mapping_middleware))
    }

    #[tokio::test]
    async fn unknown_route_becomes_not_found_problem() {
        let resp = app()
            .oneshot(HttpRequest::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            APPLICATION_PROBLEM_JSON
        );
        let p = problem_of(resp).await;
        assert_eq!(p.code, "NotFound");
        assert_eq!(p.instance, "/nope");
    }

    #[tokio::test]
    async fn plain_text_error_keeps_status_and_text() {
        let resp = app()
            .oneshot(
                HttpRequest::get("/plain")
                    .header("x-request-id", "req-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let p = problem_of(resp).await;
        assert_eq!(p.detail, "taken");
        assert_eq!(p.code, "Conflict");
        assert_eq!(p.trace_id.as_deref(), Some("req-42"));
    }

    #[tokio::test]
    async fn handler_problem_gets_instance() {
        let resp = app()
            .oneshot(HttpRequest::get("/problem").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let p = problem_of(resp).await;
        assert_eq!(p.detail, "Culture 'xx' not found.");
        assert_eq!(p.instance, "/problem");
    }

    #[tokio::test]
    async fn wrong_method_is_a_problem() {
        let resp = app()
            .oneshot(
                HttpRequest::post("/ok")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(resp.headers().get(header::ALLOW).is_some());
        assert_eq!(problem_of(resp).await.code, "MethodNotAllowed");
    }

    #[tokio::test]
    async fn success_passes_through() {
        let resp = app()
            .oneshot(HttpRequest::get("/ok").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn json_error_bodies_pass_through() {
        let resp = app()
            .oneshot(HttpRequest::get("/json-503").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v["status"], "unhealthy");
    }

    #[test]
    fn panic_payloads_are_hidden() {
        let resp = panic_to_problem(Box::new("secret detail".to_owned()));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
