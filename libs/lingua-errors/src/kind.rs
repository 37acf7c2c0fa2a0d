//! Error kinds surfaced at the HTTP boundary.

use http::StatusCode;

use crate::problem::Problem;

/// Classification of a failure, independent of the layer that raised it.
///
/// The string form (see [`ErrorKind::code`]) is written into
/// [`Problem::code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    Conflict,
    ServiceUnavailable,
    InternalError,
}

impl ErrorKind {
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Conflict => StatusCode::CONFLICT,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::BadRequest => "Bad Request",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not Found",
            Self::MethodNotAllowed => "Method Not Allowed",
            Self::Conflict => "Conflict",
            Self::ServiceUnavailable => "Service Unavailable",
            Self::InternalError => "Internal Server Error",
        }
    }

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::BadRequest => "BadRequest",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "NotFound",
            Self::MethodNotAllowed => "MethodNotAllowed",
            Self::Conflict => "Conflict",
            Self::ServiceUnavailable => "ServiceUnavailable",
            Self::InternalError => "InternalError",
        }
    }

    /// Map an arbitrary error status onto a kind. Unknown 4xx fall back to
    /// `BadRequest`, everything else to `InternalError`.
    #[must_use]
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            StatusCode::FORBIDDEN => Self::Forbidden,
            StatusCode::NOT_FOUND => Self::NotFound,
            StatusCode::METHOD_NOT_ALLOWED => Self::MethodNotAllowed,
            StatusCode::CONFLICT => Self::Conflict,
            StatusCode::SERVICE_UNAVAILABLE => Self::ServiceUnavailable,
            s if s.is_client_error() => Self::BadRequest,
            _ => Self::InternalError,
        }
    }

    /// Build a `Problem` of this kind with the given detail.
    pub fn problem(self, detail: impl Into<String>) -> Problem {
        Problem::new(self.status(), self.title(), detail).with_code(self.code())
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

pub fn bad_request(detail: impl Into<String>) -> Problem {
    ErrorKind::BadRequest.problem(detail)
}

pub fn unauthorized(detail: impl Into<String>) -> Problem {
    ErrorKind::Unauthorized.problem(detail)
}

pub fn not_found(detail: impl Into<String>) -> Problem {
    ErrorKind::NotFound.problem(detail)
}

pub fn conflict(detail: impl Into<String>) -> Problem {
    ErrorKind::Conflict.problem(detail)
}

pub fn internal_error(detail: impl Into<String>) -> Problem {
    ErrorKind::InternalError.problem(detail)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn problem_carries_kind_code_and_status() {
        let p = not_found("Culture 'xx-XX' not found.");
        assert_eq!(p.status, StatusCode::NOT_FOUND);
        assert_eq!(p.title, "Not Found");
        assert_eq!(p.code, "NotFound");
        assert_eq!(p.detail, "Culture 'xx-XX' not found.");
    }

    #[test]
    fn from_status_classifies_unknown_codes() {
        assert_eq!(
            ErrorKind::from_status(StatusCode::UNPROCESSABLE_ENTITY),
            ErrorKind::BadRequest
        );
        assert_eq!(
            ErrorKind::from_status(StatusCode::UNSUPPORTED_MEDIA_TYPE),
            ErrorKind::BadRequest
        );
        assert_eq!(
            ErrorKind::from_status(StatusCode::BAD_GATEWAY),
            ErrorKind::InternalError
        );
        assert_eq!(
            ErrorKind::from_status(StatusCode::UNAUTHORIZED),
            ErrorKind::Unauthorized
        );
    }

    #[test]
    fn status_round_trips_through_kind() {
        for kind in [
            ErrorKind::BadRequest,
            ErrorKind::Unauthorized,
            ErrorKind::Forbidden,
            ErrorKind::NotFound,
            ErrorKind::MethodNotAllowed,
            ErrorKind::Conflict,
            ErrorKind::ServiceUnavailable,
            ErrorKind::InternalError,
        ] {
            assert_eq!(ErrorKind::from_status(kind.status()), kind);
        }
    }
}
