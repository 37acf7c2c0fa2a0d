//! Redoc documentation pages rendered over `/openapi.json`.

use axum::{
    Json, Router,
    extract::Query,
    response::{Html, IntoResponse},
    routing::get,
};
use serde::Deserialize;

pub const OPENAPI_PATH: &str = "/openapi.json";
const REDOC_BUNDLE: &str = "https://cdn.redoc.ly/redoc/latest/bundles/redoc.standalone.js";
const DEFAULT_CUSTOM_TITLE: &str = "Custom API Documentation";

#[derive(Debug, Deserialize)]
pub struct CustomDocsQuery {
    pub title: Option<String>,
}

/// `/docs`, `/docs/custom?title=` and `/docs/health`.
#[must_use]
pub fn router(title: &str) -> Router {
    let page = redoc_html(title, OPENAPI_PATH);
    Router::new()
        .route("/docs", get(move || std::future::ready(Html(page.clone()))))
        .route("/docs/custom", get(custom_docs))
        .route("/docs/health", get(docs_health))
}

async fn custom_docs(Query(q): Query<CustomDocsQuery>) -> impl IntoResponse {
    let title = q
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_CUSTOM_TITLE);
    Html(redoc_html(title, OPENAPI_PATH))
}

async fn docs_health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "OK", "documentation": "Available" }))
}

fn theme() -> serde_json::Value {
    serde_json::json!({
        "colors": {
            "primary": { "main": "#3498db" },
            "success": { "main": "#27ae60" },
            "warning": { "main": "#f39c12" },
            "error": { "main": "#e74c3c" }
        },
        "typography": {
            "fontSize": "14px",
            "lineHeight": "1.5em",
            "code": { "fontSize": "13px", "fontFamily": "Courier, monospace" },
            "headings": { "fontFamily": "Montserrat, sans-serif", "fontWeight": "600" }
        },
        "sidebar": { "backgroundColor": "#f8f9fa", "textColor": "#333" }
    })
}

/// Minimal HTML escaping for text and attribute positions.
#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[must_use]
pub fn redoc_html(title: &str, spec_url: &str) -> String {
    let title = escape_html(title);
    let spec_url = escape_html(spec_url);
    let theme = escape_html(&theme().to_string());
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <style>
        body {{ margin: 0; padding: 0; font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; }}
    </style>
</head>
<body>
    <redoc spec-url="{spec_url}" scroll-y-offset="60" native-scrollbars="true" theme="{theme}"></redoc>
    <script src="{REDOC_BUNDLE}"></script>
</body>
</html>
"#
    )
}
