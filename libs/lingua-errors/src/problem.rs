//! The JSON error body every Lingua endpoint answers with.

use http::StatusCode;
use serde::{Deserialize, Serialize};

#[cfg(feature = "utoipa")]
use utoipa::ToSchema;

/// Media type of [`Problem`] responses.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// `StatusCode` on the wire is the bare number.
mod status_number {
    use http::StatusCode;
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(status: &StatusCode, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u16(status.as_u16())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<StatusCode, D::Error> {
        StatusCode::from_u16(u16::deserialize(d)?).map_err(serde::de::Error::custom)
    }
}

/// Error body of a failed Lingua request (RFC 9457 layout).
///
/// `code` names the error kind (`BadRequest`, `NotFound`, ...) so clients
/// branch on it; `detail` is the message shown to translators, e.g.
/// "Culture 'xx-XX' not found.".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[cfg_attr(
    feature = "utoipa",
    schema(title = "Problem", description = "Error body of a failed Lingua request")
)]
#[must_use]
pub struct Problem {
    /// Always `about:blank`; the kind lives in `code`.
    #[serde(rename = "type")]
    pub type_url: String,
    /// Reason phrase of `status`.
    pub title: String,
    #[serde(with = "status_number")]
    #[cfg_attr(feature = "utoipa", schema(value_type = u16))]
    pub status: StatusCode,
    pub detail: String,
    /// Path of the failed request, e.g. `/i18n/cultures`.
    #[serde(default)]
    pub instance: String,
    #[serde(default)]
    pub code: String,
    /// Request id the failure was logged under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// Offending request fields; set on validation failures only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationViolation>>,
}

/// One rejected request field, named as the client sent it (`propertyName`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct ValidationViolation {
    pub field: String,
    pub message: String,
}

impl Problem {
    pub fn new(status: StatusCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            type_url: "about:blank".to_owned(),
            title: title.into(),
            status,
            detail: detail.into(),
            instance: String::new(),
            code: String::new(),
            trace_id: None,
            errors: None,
        }
    }

    pub fn with_instance(mut self, uri: impl Into<String>) -> Self {
        self.instance = uri.into();
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    pub fn with_errors(mut self, errors: Vec<ValidationViolation>) -> Self {
        self.errors = Some(errors);
        self
    }
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for Problem {
    fn into_response(self) -> axum::response::Response {
        let status = self.status;
        (
            status,
            [(axum::http::header::CONTENT_TYPE, APPLICATION_PROBLEM_JSON)],
            axum::Json(self),
        )
            .into_response()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_every_field() {
        let p = Problem::new(StatusCode::BAD_REQUEST, "Bad Request", "Language cannot be empty.")
            .with_code("BadRequest")
            .with_instance("/i18n")
            .with_trace_id("req-1")
            .with_errors(vec![ValidationViolation {
                field: "language".to_owned(),
                message: "Language cannot be empty.".to_owned(),
            }]);

        assert_eq!(p.status, StatusCode::BAD_REQUEST);
        assert_eq!(p.code, "BadRequest");
        assert_eq!(p.instance, "/i18n");
        assert_eq!(p.trace_id.as_deref(), Some("req-1"));
        assert_eq!(p.errors.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn status_serializes_as_number_and_empty_options_are_skipped() {
        let p = Problem::new(StatusCode::NOT_FOUND, "Not Found", "Culture 'xx' not found.");
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["status"], 404);
        assert_eq!(json["type"], "about:blank");
        assert!(json.get("trace_id").is_none());
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn deserializes_minimal_body() {
        let json = r#"{"type":"about:blank","title":"Not Found","status":404,"detail":"gone"}"#;
        let p: Problem = serde_json::from_str(json).unwrap();
        assert_eq!(p.status, StatusCode::NOT_FOUND);
        assert!(p.code.is_empty());
    }

    #[test]
    fn rejects_invalid_status() {
        let json = r#"{"type":"about:blank","title":"x","status":1000,"detail":"x"}"#;
        assert!(serde_json::from_str::<Problem>(json).is_err());
    }
}
