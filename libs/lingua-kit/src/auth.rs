//! Static bearer-token authentication.
//!
//! Operations registered with `require_auth()` are checked against the
//! tokens in `auth.tokens`. The caller's subject is stored in the request
//! extensions as [`AuthContext`]. Routes unknown to the registry (host
//! routes, the fallback) pass through untouched.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{MatchedPath, Request, State},
    http::{Method, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use lingua_errors::ErrorKind;
use secrecy::ExposeSecret;

use crate::api::OpenApiRegistryImpl;
use crate::config::AuthConfig;

/// Authenticated caller, available to handlers as `Extension<AuthContext>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub subject: String,
}

impl AuthContext {
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            subject: "anonymous".to_owned(),
        }
    }
}

/// Token table plus the set of protected `(method, route pattern)` pairs.
pub struct AuthState {
    config: AuthConfig,
    protected: HashSet<(Method, String)>,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, protected: HashSet<(Method, String)>) -> Self {
        if !config.disabled && config.tokens.is_empty() && !protected.is_empty() {
            tracing::warn!("auth is enabled but no tokens are configured; protected routes will reject every call");
        }
        Self { config, protected }
    }

    /// Protect every operation that was registered with `require_auth()`.
    #[must_use]
    pub fn from_registry(config: AuthConfig, registry: &OpenApiRegistryImpl) -> Self {
        let protected = registry
            .operation_specs
            .iter()
            .filter(|e| e.value().requires_auth)
            .map(|e| (e.value().method.clone(), e.value().path.clone()))
            .collect();
        Self::new(config, protected)
    }

    fn is_protected(&self, method: &Method, route: &str) -> bool {
        self.protected.contains(&(method.clone(), route.to_owned()))
    }

    fn subject_for(&self, presented: &str) -> Option<&str> {
        self.config
            .tokens
            .iter()
            .find(|t| constant_time_eq(t.token.expose_secret().as_bytes(), presented.as_bytes()))
            .map(|t| t.subject.as_str())
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn bearer_token(req: &Request) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim())
        .filter(|t| !t.is_empty())
}

pub async fn auth_middleware(
    State(state): State<Arc<AuthState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned());

    let Some(route) = route.filter(|r| state.is_protected(req.method(), r)) else {
        return next.run(req).await;
    };

    if state.config.disabled {
        req.extensions_mut().insert(AuthContext::anonymous());
        return next.run(req).await;
    }

    let Some(token) = bearer_token(&req) else {
        tracing::debug!(%route, "missing bearer token");
        return ErrorKind::Unauthorized
            .problem("A bearer token is required.")
            .into_response();
    };
    let Some(subject) = state.subject_for(token).map(str::to_owned) else {
        tracing::warn!(%route, "rejected invalid bearer token");
        return ErrorKind::Unauthorized
            .problem("The bearer token is not valid.")
            .into_response();
    };

    tracing::Span::current().record("subject", subject.as_str());
    req.extensions_mut().insert(AuthContext { subject });
    next.run(req).await
}
