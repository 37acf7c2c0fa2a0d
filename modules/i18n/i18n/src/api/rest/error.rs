use lingua_errors::{Problem, ValidationViolation, bad_request, conflict, internal_error, not_found};

use crate::domain::error::DomainError;

/// Map a domain error to a Problem. `instance` may be empty; the error
/// layer fills it with the request path.
pub fn domain_error_to_problem(e: &DomainError, instance: &str) -> Problem {
    let problem = match e {
        DomainError::Validation { field, message } => {
            bad_request(message.clone()).with_errors(vec![ValidationViolation {
                field: field.clone(),
                message: message.clone(),
            }])
        }
        DomainError::CultureNotFound { .. } => not_found(e.to_string()),
        DomainError::Conflict(msg) => conflict(msg.clone()),
        DomainError::Database(err) => {
            tracing::error!(error = %err, "i18n database error");
            internal_error("An internal database error occurred.")
        }
    };
    problem.with_instance(instance)
}

/// Lets handlers use `?` on service calls.
impl From<DomainError> for Problem {
    fn from(e: DomainError) -> Self {
        domain_error_to_problem(&e, "")
    }
}
