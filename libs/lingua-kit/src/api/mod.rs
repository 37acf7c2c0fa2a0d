//! REST building blocks shared by every module: the operation builder, the
//! `OpenAPI` registry and its transformers, error mapping and response sugar.

pub mod error_layer;
pub mod inspect;
pub mod openapi_registry;
pub mod operation_builder;
pub mod response;
pub mod transformers;

pub use error_layer::{error_mapping_middleware, extract_trace_id, panic_to_problem};
pub use inspect::{DocumentReport, inspect_document};
pub use openapi_registry::{OpenApiRegistry, OpenApiRegistryImpl, ensure_schema};
pub use operation_builder::{
    Missing, OperationBuilder, OperationSpec, ParamLocation, ParamSpec, Present, ResponseSpec,
    state,
};

/// Handler result: success body or a Problem.
pub type ApiResult<T> = Result<T, lingua_errors::Problem>;

/// Re-exports for handler modules.
pub mod prelude {
    pub use super::ApiResult;
    pub use super::response::{JsonBody, created_json, no_content};
    pub use lingua_errors::Problem;

    pub use axum::{Json, http::StatusCode, response::IntoResponse};
}
