//! Type-state builder for REST operations.
//!
//! An operation cannot be registered until it has a handler, at least one
//! response and an explicit auth decision (`require_auth` or `public`). All
//! three are checked by the compiler, not at runtime.
//!
//! ```rust,ignore
//! router = OperationBuilder::get("/i18n/{propertyName}")
//!     .operation_id("i18n.get_by_property")
//!     .summary("Translations of one property")
//!     .tag("i18n")
//!     .path_param("propertyName", "Property name")
//!     .query_param("entityType", true, "Entity type")
//!     .require_auth()
//!     .handler(handlers::get_by_property)
//!     .json_array_response::<TranslationDto>(openapi, StatusCode::OK, "Matches")
//!     .error_400(openapi)
//!     .register(router, openapi);
//! ```

use std::marker::PhantomData;

use axum::{Router, handler::Handler, routing::MethodRouter};
use http::{Method, StatusCode};
use lingua_errors::{APPLICATION_PROBLEM_JSON, Problem};

use crate::api::openapi_registry::{OpenApiRegistry, ensure_schema};

/// Convert axum wildcards (`{*rest}`) to `OpenAPI` placeholders (`{rest}`).
#[must_use]
pub fn axum_to_openapi_path(path: &str) -> String {
    path.replace("{*", "{")
}

pub mod state {
    #[derive(Debug, Clone, Copy)]
    pub struct Missing;

    #[derive(Debug, Clone, Copy)]
    pub struct Present;

    #[derive(Debug, Clone, Copy)]
    pub struct AuthNotSet;

    #[derive(Debug, Clone, Copy)]
    pub struct AuthSet;
}

mod sealed {
    pub trait Sealed {}
    pub trait SealedAuth {}
}

/// Maps the handler state onto the router slot it carries: nothing while
/// missing, a `MethodRouter<S>` once present.
pub trait HandlerSlot<S>: sealed::Sealed {
    type Slot;
}

pub trait AuthState: sealed::SealedAuth {}

pub use state::{AuthNotSet, AuthSet, Missing, Present};

impl sealed::Sealed for Missing {}
impl sealed::Sealed for Present {}
impl sealed::SealedAuth for AuthNotSet {}
impl sealed::SealedAuth for AuthSet {}
impl AuthState for AuthNotSet {}
impl AuthState for AuthSet {}

impl<S> HandlerSlot<S> for Missing {
    type Slot = ();
}
impl<S> HandlerSlot<S> for Present {
    type Slot = MethodRouter<S>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamLocation {
    Path,
    Query,
}

#[derive(Clone, Debug)]
pub struct ParamSpec {
    pub name: String,
    pub location: ParamLocation,
    pub required: bool,
    pub description: Option<String>,
    /// JSON Schema primitive: "string", "integer", "boolean".
    pub param_type: String,
}

#[derive(Clone, Debug)]
pub struct RequestBodySpec {
    pub content_type: &'static str,
    pub description: Option<String>,
    /// Component name under `#/components/schemas`.
    pub schema_name: String,
    pub required: bool,
}

#[derive(Clone, Debug)]
pub struct ResponseSpec {
    pub status: u16,
    /// Empty for responses without a body.
    pub content_type: &'static str,
    pub description: String,
    pub schema_name: Option<String>,
    /// Body is a JSON array of `schema_name`.
    pub array: bool,
}

/// Everything the `OpenAPI` registry and the auth layer need to know about
/// one route.
#[derive(Clone, Debug)]
pub struct OperationSpec {
    pub method: Method,
    pub path: String,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub params: Vec<ParamSpec>,
    pub request_body: Option<RequestBodySpec>,
    pub responses: Vec<ResponseSpec>,
    /// `method:path` with separators flattened; used when no operation id is set.
    pub handler_id: String,
    pub requires_auth: bool,
}

#[must_use]
pub struct OperationBuilder<H = Missing, R = Missing, S = (), A = AuthNotSet>
where
    H: HandlerSlot<S>,
    A: AuthState,
{
    spec: OperationSpec,
    method_router: <H as HandlerSlot<S>>::Slot,
    _has_handler: PhantomData<H>,
    _has_response: PhantomData<R>,
    _state: PhantomData<fn() -> S>,
    _auth: PhantomData<A>,
}

impl<S> OperationBuilder<Missing, Missing, S, AuthNotSet> {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let path = path.into();
        let handler_id = format!(
            "{}:{}",
            method.as_str().to_lowercase(),
            path.replace(['/', '{', '}'], "_")
        );
        Self {
            spec: OperationSpec {
                method,
                path,
                operation_id: None,
                summary: None,
                description: None,
                tags: Vec::new(),
                params: Vec::new(),
                request_body: None,
                responses: Vec::new(),
                handler_id,
                requires_auth: false,
            },
            method_router: (),
            _has_handler: PhantomData,
            _has_response: PhantomData,
            _state: PhantomData,
            _auth: PhantomData,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }
}

impl<H, R, S, A> OperationBuilder<H, R, S, A>
where
    H: HandlerSlot<S>,
    A: AuthState,
{
    pub fn spec(&self) -> &OperationSpec {
        &self.spec
    }

    pub fn operation_id(mut self, id: impl Into<String>) -> Self {
        self.spec.operation_id = Some(id.into());
        self
    }

    pub fn summary(mut self, text: impl Into<String>) -> Self {
        self.spec.summary = Some(text.into());
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.spec.description = Some(text.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.spec.tags.push(tag.into());
        self
    }

    pub fn path_param(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.spec.params.push(ParamSpec {
            name: name.into(),
            location: ParamLocation::Path,
            required: true,
            description: Some(description.into()),
            param_type: "string".to_owned(),
        });
        self
    }

    /// Query parameter of type string.
    pub fn query_param(
        self,
        name: impl Into<String>,
        required: bool,
        description: impl Into<String>,
    ) -> Self {
        self.query_param_typed(name, required, description, "string")
    }

    pub fn query_param_typed(
        mut self,
        name: impl Into<String>,
        required: bool,
        description: impl Into<String>,
        param_type: impl Into<String>,
    ) -> Self {
        self.spec.params.push(ParamSpec {
            name: name.into(),
            location: ParamLocation::Query,
            required,
            description: Some(description.into()),
            param_type: param_type.into(),
        });
        self
    }

    /// Required JSON body; the schema of `T` is registered as a component.
    pub fn json_request<T>(mut self, registry: &dyn OpenApiRegistry, desc: impl Into<String>) -> Self
    where
        T: utoipa::ToSchema + utoipa::PartialSchema + 'static,
    {
        let name = ensure_schema::<T>(registry);
        self.spec.request_body = Some(RequestBodySpec {
            content_type: "application/json",
            description: Some(desc.into()),
            schema_name: name,
            required: true,
        });
        self
    }

    fn transition<H2, R2, A2>(
        self,
        method_router: <H2 as HandlerSlot<S>>::Slot,
    ) -> OperationBuilder<H2, R2, S, A2>
    where
        H2: HandlerSlot<S>,
        A2: AuthState,
    {
        OperationBuilder {
            spec: self.spec,
            method_router,
            _has_handler: PhantomData,
            _has_response: PhantomData,
            _state: PhantomData,
            _auth: PhantomData,
        }
    }
}

impl<H, R, S> OperationBuilder<H, R, S, AuthNotSet>
where
    H: HandlerSlot<S>,
{
    /// Route is only reachable with a valid bearer token (unless auth is
    /// disabled in configuration).
    pub fn require_auth(mut self) -> OperationBuilder<H, R, S, AuthSet> {
        self.spec.requires_auth = true;
        let slot = self.method_router;
        OperationBuilder {
            spec: self.spec,
            method_router: slot,
            _has_handler: PhantomData,
            _has_response: PhantomData,
            _state: PhantomData,
            _auth: PhantomData,
        }
    }

    pub fn public(mut self) -> OperationBuilder<H, R, S, AuthSet> {
        self.spec.requires_auth = false;
        let slot = self.method_router;
        OperationBuilder {
            spec: self.spec,
            method_router: slot,
            _has_handler: PhantomData,
            _has_response: PhantomData,
            _state: PhantomData,
            _auth: PhantomData,
        }
    }
}

impl<R, S, A> OperationBuilder<Missing, R, S, A>
where
    S: Clone + Send + Sync + 'static,
    A: AuthState,
{
    pub fn handler<F, T>(self, h: F) -> OperationBuilder<Present, R, S, A>
    where
        F: Handler<T, S> + Clone + Send + 'static,
        T: 'static,
    {
        let method_router = match self.spec.method {
            Method::POST => axum::routing::post(h),
            Method::PUT => axum::routing::put(h),
            Method::DELETE => axum::routing::delete(h),
            Method::PATCH => axum::routing::patch(h),
            _ => axum::routing::get(h),
        };
        self.transition(method_router)
    }
}

impl<H, R, S, A> OperationBuilder<H, R, S, A>
where
    H: HandlerSlot<S>,
    A: AuthState,
{
    fn push_response(
        mut self,
        status: StatusCode,
        content_type: &'static str,
        description: impl Into<String>,
        schema_name: Option<String>,
        array: bool,
    ) -> OperationBuilder<H, Present, S, A> {
        self.spec.responses.push(ResponseSpec {
            status: status.as_u16(),
            content_type,
            description: description.into(),
            schema_name,
            array,
        });
        let slot = self.method_router;
        OperationBuilder {
            spec: self.spec,
            method_router: slot,
            _has_handler: PhantomData,
            _has_response: PhantomData,
            _state: PhantomData,
            _auth: PhantomData,
        }
    }

    pub fn json_response_with_schema<T>(
        self,
        registry: &dyn OpenApiRegistry,
        status: StatusCode,
        description: impl Into<String>,
    ) -> OperationBuilder<H, Present, S, A>
    where
        T: utoipa::ToSchema + utoipa::PartialSchema + 'static,
    {
        let name = ensure_schema::<T>(registry);
        self.push_response(status, "application/json", description, Some(name), false)
    }

    /// JSON array whose items are `T`.
    pub fn json_array_response<T>(
        self,
        registry: &dyn OpenApiRegistry,
        status: StatusCode,
        description: impl Into<String>,
    ) -> OperationBuilder<H, Present, S, A>
    where
        T: utoipa::ToSchema + utoipa::PartialSchema + 'static,
    {
        let name = ensure_schema::<T>(registry);
        self.push_response(status, "application/json", description, Some(name), true)
    }

    /// Response without a body, e.g. 204.
    pub fn empty_response(
        self,
        status: StatusCode,
        description: impl Into<String>,
    ) -> OperationBuilder<H, Present, S, A> {
        self.push_response(status, "", description, None, false)
    }

    pub fn problem_response(
        self,
        registry: &dyn OpenApiRegistry,
        status: StatusCode,
        description: impl Into<String>,
    ) -> OperationBuilder<H, Present, S, A> {
        let name = ensure_schema::<Problem>(registry);
        self.push_response(status, APPLICATION_PROBLEM_JSON, description, Some(name), false)
    }
}

impl<H, S, A> OperationBuilder<H, Present, S, A>
where
    H: HandlerSlot<S>,
    A: AuthState,
{
    pub fn error_400(self, registry: &dyn OpenApiRegistry) -> Self {
        self.problem_response(registry, StatusCode::BAD_REQUEST, "Bad Request")
    }

    pub fn error_401(self, registry: &dyn OpenApiRegistry) -> Self {
        self.problem_response(registry, StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    pub fn error_404(self, registry: &dyn OpenApiRegistry) -> Self {
        self.problem_response(registry, StatusCode::NOT_FOUND, "Not Found")
    }

    pub fn error_409(self, registry: &dyn OpenApiRegistry) -> Self {
        self.problem_response(registry, StatusCode::CONFLICT, "Conflict")
    }

    pub fn error_500(self, registry: &dyn OpenApiRegistry) -> Self {
        self.problem_response(
            registry,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
        )
    }
}

impl<S> OperationBuilder<Present, Present, S, AuthSet>
where
    S: Clone + Send + Sync + 'static,
{
    /// Record the operation in the registry and mount the handler.
    pub fn register(self, router: Router<S>, openapi: &dyn OpenApiRegistry) -> Router<S> {
        openapi.register_operation(&self.spec);
        router.route(&self.spec.path, self.method_router)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::api::openapi_registry::OpenApiRegistryImpl;
    use axum::Json;

    async fn list() -> Json<Vec<String>> {
        Json(vec![])
    }

    #[derive(utoipa::ToSchema, serde::Serialize)]
    struct Sample {
        id: i32,
    }

    #[test]
    fn register_records_spec_and_schemas() {
        let registry = OpenApiRegistryImpl::new();
        let router: Router = Router::new();

        let _router = OperationBuilder::<Missing, Missing, ()>::get("/samples/{id}")
            .operation_id("samples.get")
            .tag("samples")
            .path_param("id", "Sample id")
            .query_param_typed("page", false, "Page", "integer")
            .require_auth()
            .handler(list)
            .json_response_with_schema::<Sample>(&registry, StatusCode::OK, "Sample")
            .json_array_response::<Sample>(&registry, StatusCode::ACCEPTED, "Samples")
            .error_404(&registry)
            .register(router, &registry);

        let spec = registry
            .operation_specs
            .get("GET:/samples/{id}")
            .map(|e| e.value().clone())
            .unwrap();
        assert!(spec.requires_auth);
        assert_eq!(spec.params.len(), 2);
        assert_eq!(spec.responses[0].schema_name.as_deref(), Some("Sample"));
        assert!(spec.responses[1].array);
        assert_eq!(spec.responses[2].content_type, APPLICATION_PROBLEM_JSON);

        let components = registry.components_registry.load();
        assert!(components.contains_key("Sample"));
        assert!(components.contains_key("Problem"));
    }

    #[test]
    fn handler_id_is_derived_from_method_and_path() {
        let b = OperationBuilder::<Missing, Missing, ()>::delete("/i18n/{name}");
        assert_eq!(b.spec().handler_id, "delete:_i18n__name_");
        assert!(!b.spec().requires_auth);
    }

    #[test]
    fn wildcard_paths_are_converted() {
        assert_eq!(axum_to_openapi_path("/static/{*path}"), "/static/{path}");
        assert_eq!(axum_to_openapi_path("/i18n/{propertyName}"), "/i18n/{propertyName}");
    }
}
