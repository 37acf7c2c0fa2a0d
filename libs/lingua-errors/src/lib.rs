//! Error data types shared by Lingua services.
//!
//! - RFC 9457 Problem Details (`Problem`)
//! - Error kinds and their HTTP mapping (`ErrorKind`)
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod kind;
pub mod problem;

pub use kind::{ErrorKind, bad_request, conflict, internal_error, not_found, unauthorized};
pub use problem::{APPLICATION_PROBLEM_JSON, Problem, ValidationViolation};

/// Fill `instance` and `trace_id` on a Problem that does not carry them yet.
pub fn finalize(mut p: Problem, instance: &str, trace_id: Option<String>) -> Problem {
    if p.instance.is_empty() {
        p = p.with_instance(instance);
    }
    if p.trace_id.is_none() {
        p.trace_id = trace_id;
    }
    p
}
