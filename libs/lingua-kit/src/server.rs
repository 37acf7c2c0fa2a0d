//! REST host: collects module routes, mounts host routes, applies the
//! middleware stack and serves the result.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{StatusCode, header},
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
    routing::get,
};
use lingua_db::Db;
use tower_http::{
    catch_panic::CatchPanicLayer,
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::field::Empty;
use utoipa::openapi::OpenApi;

use crate::api::{
    OpenApiRegistry, OpenApiRegistryImpl, error_mapping_middleware, inspect_document,
    panic_to_problem,
};
use crate::auth::{AuthState, auth_middleware};
use crate::config::AppConfig;
use crate::{docs, health};

/// Request bodies above this size are rejected with 413.
pub const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// A module that contributes REST operations. Pure wiring, called once
/// while the router is assembled.
pub trait RestModule: Send + Sync {
    fn name(&self) -> &'static str;

    /// Mount handlers on `router` and describe them in `openapi`.
    ///
    /// # Errors
    /// Wiring failed (e.g. the module's state could not be built).
    fn register_rest(&self, router: Router, openapi: &dyn OpenApiRegistry) -> anyhow::Result<Router>;
}

pub struct RestHost {
    config: Arc<AppConfig>,
    db: Db,
    registry: Arc<OpenApiRegistryImpl>,
}

impl RestHost {
    #[must_use]
    pub fn new(config: Arc<AppConfig>, db: Db) -> Self {
        Self {
            config,
            db,
            registry: Arc::new(OpenApiRegistryImpl::new()),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &OpenApiRegistryImpl {
        &self.registry
    }

    #[must_use]
    pub fn build_openapi(&self) -> OpenApi {
        self.registry
            .build_openapi(&self.config.openapi, &self.config.server)
    }

    /// Module routes plus `/health`, `/healthz`, `/openapi.json`, `/docs*`
    /// (and `/debug/openapi` in development), wrapped in the middleware stack.
    ///
    /// # Errors
    /// A module failed to register its routes.
    pub fn build_router(&self, modules: &[&dyn RestModule]) -> anyhow::Result<Router> {
        let mut router = Router::new();
        for module in modules {
            router = module
                .register_rest(router, self.registry.as_ref())
                .with_context(|| format!("module '{}' failed to register routes", module.name()))?;
            tracing::debug!(module = module.name(), "REST routes registered");
        }
        tracing::info!(
            operations = self.registry.operation_specs.len(),
            "REST operations registered"
        );

        router = router
            .merge(health::router(self.db.clone()))
            .merge(docs::router(&self.config.openapi.title))
            .merge(self.openapi_routes());

        Ok(self.apply_middleware_stack(router))
    }

    fn openapi_routes(&self) -> Router {
        let doc = Arc::new(self.build_openapi());
        let mut router = Router::new().route(
            docs::OPENAPI_PATH,
            get({
                let doc = Arc::clone(&doc);
                move || {
                    let doc = Arc::clone(&doc);
                    async move {
                        ([(header::CACHE_CONTROL, "no-store")], Json(doc.as_ref())).into_response()
                    }
                }
            }),
        );
        if self.config.server.environment.is_development() {
            let report = inspect_document(&doc);
            if !report.findings.is_empty() {
                tracing::warn!(
                    findings = report.findings.len(),
                    "OpenAPI document has consistency findings"
                );
            }
            router = router.route(
                "/debug/openapi",
                get(move || std::future::ready(Json(report.clone()))),
            );
        }
        router
    }

    /// Registration order is innermost first. At runtime a request passes
    /// `SetRequestId` → `PropagateRequestId` → Trace → `ErrorMapping` →
    /// Timeout → `BodyLimit` → Auth → `CatchPanic` → handler, so timeouts,
    /// oversized bodies and auth failures all leave as Problem+JSON.
    fn apply_middleware_stack(&self, mut router: Router) -> Router {
        router = router.layer(CatchPanicLayer::custom(panic_to_problem));

        let auth = Arc::new(AuthState::from_registry(
            self.config.auth.clone(),
            &self.registry,
        ));
        router = router.layer(from_fn_with_state(auth, auth_middleware));

        router = router.layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES));
        router = router.layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES));

        router = router.layer(TimeoutLayer::with_status_code(
            StatusCode::GATEWAY_TIMEOUT,
            Duration::from_secs(self.config.server.timeout_secs),
        ));

        router = router.layer(from_fn(error_mapping_middleware));

        router = apply_trace_layer(router);

        router = router.layer(PropagateRequestIdLayer::x_request_id());
        router.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }
}

fn apply_trace_layer(router: Router) -> Router {
    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(|req: &axum::http::Request<axum::body::Body>| {
                let rid = req
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("n/a");
                tracing::info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri().path(),
                    request_id = %rid,
                    subject = Empty,
                    status = Empty,
                    latency_ms = Empty,
                )
            })
            .on_response(
                |res: &axum::http::Response<axum::body::Body>,
                 latency: Duration,
                 span: &tracing::Span| {
                    span.record("status", res.status().as_u16());
                    span.record("latency_ms", latency.as_millis());
                },
            ),
    )
}

/// Bind `bind_addr` and serve until `shutdown` resolves.
///
/// # Errors
/// Invalid address, bind failure or a fatal server error.
pub async fn serve<F>(router: Router, bind_addr: &str, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr = bind_addr
        .parse()
        .with_context(|| format!("invalid bind address '{bind_addr}'"))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let local = listener.local_addr().unwrap_or(addr);
    tracing::info!(addr = %local, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown.await;
            tracing::info!("HTTP server shutting down gracefully");
        })
        .await
        .context("HTTP server failed")
}
