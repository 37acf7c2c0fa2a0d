//! Registry of REST operations and schema components.
//!
//! Route modules register their operations while the router is assembled;
//! the host later turns the collected specs into one `OpenAPI` document and
//! runs the transformers in [`crate::api::transformers`] over it.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use dashmap::DashMap;
use http::Method;
use utoipa::openapi::{
    OpenApi, OpenApiBuilder, Ref, RefOr, Required,
    content::ContentBuilder,
    path::{
        HttpMethod, OperationBuilder as UOperationBuilder, ParameterBuilder, ParameterIn, PathItem,
        PathsBuilder,
    },
    request_body::RequestBodyBuilder,
    response::{ResponseBuilder, ResponsesBuilder},
    schema::{ArrayBuilder, ComponentsBuilder, ObjectBuilder, Schema, SchemaType, Type},
    security::SecurityRequirement,
};

use crate::api::operation_builder::{self, OperationSpec, ParamLocation};
use crate::api::transformers;
use crate::config::{OpenApiConfig, ServerConfig};

type SchemaCollection = Vec<(String, RefOr<Schema>)>;

pub trait OpenApiRegistry: Send + Sync {
    fn register_operation(&self, spec: &OperationSpec);

    /// Insert `schemas` under components and return the `$ref` name of the
    /// root schema.
    fn ensure_schema_raw(&self, name: &str, schemas: SchemaCollection) -> String;
}

/// Register `T` and every schema it references; returns its component name.
pub fn ensure_schema<T: utoipa::ToSchema + utoipa::PartialSchema + 'static>(
    registry: &dyn OpenApiRegistry,
) -> String {
    use utoipa::PartialSchema;

    let root_name = transformers::sanitize_schema_name(&T::name());
    let mut collected: SchemaCollection = vec![(root_name.clone(), <T as PartialSchema>::schema())];
    T::schemas(&mut collected);
    registry.ensure_schema_raw(&root_name, collected)
}

/// Concurrent registry: operations in a `DashMap`, components behind an
/// `ArcSwap` snapshot.
pub struct OpenApiRegistryImpl {
    /// Keyed by `METHOD:path`.
    pub operation_specs: DashMap<String, OperationSpec>,
    pub components_registry: ArcSwap<HashMap<String, RefOr<Schema>>>,
}

impl Default for OpenApiRegistryImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenApiRegistryImpl {
    #[must_use]
    pub fn new() -> Self {
        Self {
            operation_specs: DashMap::new(),
            components_registry: ArcSwap::from_pointee(HashMap::new()),
        }
    }

    /// Specs sorted by path then method, so the document is stable.
    #[must_use]
    pub fn sorted_specs(&self) -> Vec<OperationSpec> {
        let mut specs: Vec<OperationSpec> =
            self.operation_specs.iter().map(|e| e.value().clone()).collect();
        specs.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.method.as_str().cmp(b.method.as_str())));
        specs
    }

    /// Assemble the document and apply the document, operation and schema
    /// transformers.
    #[must_use]
    pub fn build_openapi(&self, info: &OpenApiConfig, server: &ServerConfig) -> OpenApi {
        let specs = self.sorted_specs();
        tracing::info!(operations = specs.len(), "building OpenAPI document");

        // PathsBuilder merges operations that share a path.
        let mut paths = PathsBuilder::new();
        for spec in &specs {
            let method = match spec.method {
                Method::POST => HttpMethod::Post,
                Method::PUT => HttpMethod::Put,
                Method::DELETE => HttpMethod::Delete,
                Method::PATCH => HttpMethod::Patch,
                _ => HttpMethod::Get,
            };
            let operation = build_operation(spec);
            let openapi_path = operation_builder::axum_to_openapi_path(&spec.path);
            paths = paths.path(openapi_path, PathItem::new(method, operation));
        }

        let mut components = ComponentsBuilder::new();
        for (name, schema) in self.components_registry.load().iter() {
            components = components.schema(name.clone(), schema.clone());
        }

        let mut doc = OpenApiBuilder::new()
            .paths(paths.build())
            .components(Some(components.build()))
            .build();

        transformers::transform_document(&mut doc, info, server);
        transformers::transform_operations(&mut doc);
        transformers::transform_schemas(&mut doc);
        doc
    }
}

fn build_operation(spec: &OperationSpec) -> utoipa::openapi::path::Operation {
    let mut op = UOperationBuilder::new()
        .operation_id(spec.operation_id.clone().or_else(|| Some(spec.handler_id.clone())))
        .summary(spec.summary.clone())
        .description(spec.description.clone());

    for tag in &spec.tags {
        op = op.tag(tag.clone());
    }

    for p in &spec.params {
        let (in_, required) = match p.location {
            ParamLocation::Path => (ParameterIn::Path, Required::True),
            ParamLocation::Query if p.required => (ParameterIn::Query, Required::True),
            ParamLocation::Query => (ParameterIn::Query, Required::False),
        };
        let ty = match p.param_type.as_str() {
            "integer" => Type::Integer,
            "number" => Type::Number,
            "boolean" => Type::Boolean,
            _ => Type::String,
        };
        let schema = Schema::Object(ObjectBuilder::new().schema_type(SchemaType::Type(ty)).build());
        op = op.parameter(
            ParameterBuilder::new()
                .name(&p.name)
                .parameter_in(in_)
                .required(required)
                .description(p.description.clone())
                .schema(Some(schema))
                .build(),
        );
    }

    if let Some(rb) = &spec.request_body {
        let content = ContentBuilder::new()
            .schema(Some(RefOr::Ref(Ref::from_schema_name(rb.schema_name.clone()))))
            .build();
        let mut body = RequestBodyBuilder::new()
            .description(rb.description.clone())
            .content(rb.content_type, content);
        if rb.required {
            body = body.required(Some(Required::True));
        }
        op = op.request_body(Some(body.build()));
    }

    let mut responses = ResponsesBuilder::new();
    for r in &spec.responses {
        let mut resp = ResponseBuilder::new().description(&r.description);
        if !r.content_type.is_empty() {
            let schema = match &r.schema_name {
                Some(name) if r.array => RefOr::T(Schema::Array(
                    ArrayBuilder::new()
                        .items(RefOr::Ref(Ref::from_schema_name(name.clone())))
                        .build(),
                )),
                Some(name) => RefOr::Ref(Ref::from_schema_name(name.clone())),
                None => RefOr::T(Schema::Object(ObjectBuilder::new().build())),
            };
            resp = resp.content(r.content_type, ContentBuilder::new().schema(Some(schema)).build());
        }
        responses = responses.response(r.status.to_string(), resp.build());
    }
    op = op.responses(responses.build());

    if spec.requires_auth {
        op = op.security(SecurityRequirement::new("bearerAuth", Vec::<String>::new()));
    }

    op.build()
}

impl OpenApiRegistry for OpenApiRegistryImpl {
    fn register_operation(&self, spec: &OperationSpec) {
        let key = format!("{}:{}", spec.method.as_str(), spec.path);
        if self.operation_specs.insert(key.clone(), spec.clone()).is_some() {
            tracing::warn!(operation_key = %key, "operation registered twice; keeping the latest");
        }
        tracing::debug!(
            handler_id = %spec.handler_id,
            method = %spec.method,
            path = %spec.path,
            "registered API operation"
        );
    }

    fn ensure_schema_raw(&self, root_name: &str, schemas: SchemaCollection) -> String {
        let current = self.components_registry.load();
        let mut reg = (**current).clone();

        for (name, schema) in schemas {
            let name = transformers::sanitize_schema_name(&name);
            if let Some(existing) = reg.get(&name) {
                if serde_json::to_value(existing).ok() == serde_json::to_value(&schema).ok() {
                    continue;
                }
                tracing::warn!(%name, "schema content conflict; overriding with latest");
            }
            reg.insert(name, schema);
        }

        self.components_registry.store(Arc::new(reg));
        root_name.to_owned()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::api::operation_builder::{ParamSpec, RequestBodySpec, ResponseSpec};

    fn spec(method: Method, path: &str) -> OperationSpec {
        let handler_id = format!("{}:{}", method.as_str().to_lowercase(), path);
        OperationSpec {
            method,
            path: path.to_owned(),
            operation_id: None,
            summary: None,
            description: None,
            tags: vec!["t".to_owned()],
            params: vec![],
            request_body: None,
            responses: vec![ResponseSpec {
                status: 200,
                content_type: "application/json",
                description: "ok".to_owned(),
                schema_name: None,
                array: false,
            }],
            handler_id,
            requires_auth: true,
        }
    }

    #[test]
    fn methods_on_one_path_share_a_path_item() {
        let registry = OpenApiRegistryImpl::new();
        registry.register_operation(&spec(Method::GET, "/i18n"));
        let mut post = spec(Method::POST, "/i18n");
        post.request_body = Some(RequestBodySpec {
            content_type: "application/json",
            description: None,
            schema_name: "Body".to_owned(),
            required: true,
        });
        registry.register_operation(&post);

        let doc = registry.build_openapi(&OpenApiConfig::default(), &ServerConfig::default());
        let item = doc.paths.paths.get("/i18n").unwrap();
        assert!(item.get.is_some());
        assert!(item.post.is_some());
        assert!(item.get.as_ref().unwrap().security.is_some());
    }

    #[test]
    fn operation_id_falls_back_to_handler_id() {
        let registry = OpenApiRegistryImpl::new();
        let mut s = spec(Method::GET, "/things/{id}");
        s.params.push(ParamSpec {
            name: "id".to_owned(),
            location: ParamLocation::Path,
            required: true,
            description: None,
            param_type: "integer".to_owned(),
        });
        registry.register_operation(&s);

        let doc = registry.build_openapi(&OpenApiConfig::default(), &ServerConfig::default());
        let op = doc.paths.paths["/things/{id}"].get.clone().unwrap();
        assert_eq!(op.operation_id.as_deref(), Some("get:/things/{id}"));
        assert_eq!(op.parameters.map(|p| p.len()), Some(1));
    }

    #[test]
    fn identical_schemas_are_not_duplicated() {
        #[derive(utoipa::ToSchema)]
        #[allow(dead_code)]
        struct Thing {
            id: i32,
        }

        let registry = OpenApiRegistryImpl::new();
        assert_eq!(ensure_schema::<Thing>(&registry), "Thing");
        assert_eq!(ensure_schema::<Thing>(&registry), "Thing");
        assert_eq!(registry.components_registry.load().len(), 1);
    }
}
