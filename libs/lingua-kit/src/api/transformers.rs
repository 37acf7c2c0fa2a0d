//! Post-processing of the generated `OpenAPI` document.
//!
//! - document: info block, servers, `bearerAuth` scheme, Problem schemas
//! - operations: default 200, 400 for operations taking input, 500 everywhere
//! - schemas: component names sanitized, primitive properties get examples

use lingua_errors::{APPLICATION_PROBLEM_JSON, Problem, ValidationViolation};
use utoipa::openapi::{
    ComponentsBuilder, ContactBuilder, InfoBuilder, OpenApi, Ref, RefOr, ResponseBuilder,
    content::ContentBuilder,
    path::{Operation, ParameterIn},
    schema::{KnownFormat, Object, Schema, SchemaFormat, SchemaType, Type},
    security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    server::ServerBuilder,
};

use crate::config::{OpenApiConfig, ServerConfig};

pub const BEARER_SCHEME: &str = "bearerAuth";
const PROBLEM_SCHEMA: &str = "Problem";

/// Component names may only hold `[A-Za-z0-9._-]`.
#[must_use]
pub fn sanitize_schema_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect()
}

pub fn transform_document(doc: &mut OpenApi, openapi: &OpenApiConfig, server: &ServerConfig) {
    let contact = (openapi.contact_name.is_some() || openapi.contact_email.is_some()).then(|| {
        ContactBuilder::new()
            .name(openapi.contact_name.clone())
            .email(openapi.contact_email.clone())
            .build()
    });
    doc.info = InfoBuilder::new()
        .title(&openapi.title)
        .version(&openapi.version)
        .description(openapi.description.clone())
        .contact(contact)
        .build();

    let mut servers = Vec::new();
    if let Some(url) = &openapi.public_url {
        servers.push(ServerBuilder::new().url(url).description(Some("Public")).build());
    }
    if server.environment.is_development() {
        let local = server.bind_addr.replace("0.0.0.0", "localhost");
        servers.push(
            ServerBuilder::new()
                .url(format!("http://{local}"))
                .description(Some("Development"))
                .build(),
        );
    }
    doc.servers = (!servers.is_empty()).then_some(servers);

    let components = doc
        .components
        .get_or_insert_with(|| ComponentsBuilder::new().build());
    components.add_security_scheme(
        BEARER_SCHEME,
        SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
    );
    components
        .schemas
        .entry(PROBLEM_SCHEMA.to_owned())
        .or_insert_with(<Problem as utoipa::PartialSchema>::schema);
    components
        .schemas
        .entry("ValidationViolation".to_owned())
        .or_insert_with(<ValidationViolation as utoipa::PartialSchema>::schema);
}

pub fn transform_operations(doc: &mut OpenApi) {
    for (path, item) in &mut doc.paths.paths {
        let default_tag = path
            .trim_start_matches('/')
            .split('/')
            .next()
            .filter(|s| !s.is_empty() && !s.starts_with('{'))
            .map(str::to_owned);
        let ops = [
            &mut item.get,
            &mut item.post,
            &mut item.put,
            &mut item.delete,
            &mut item.patch,
        ];
        for op in ops.into_iter().flatten() {
            transform_operation(op, default_tag.as_deref());
        }
    }
}

fn problem_response(description: &str) -> RefOr<utoipa::openapi::Response> {
    RefOr::T(
        ResponseBuilder::new()
            .description(description)
            .content(
                APPLICATION_PROBLEM_JSON,
                ContentBuilder::new()
                    .schema(Some(RefOr::Ref(Ref::from_schema_name(PROBLEM_SCHEMA))))
                    .build(),
            )
            .build(),
    )
}

fn transform_operation(op: &mut Operation, default_tag: Option<&str>) {
    if op.tags.as_ref().is_none_or(Vec::is_empty)
        && let Some(tag) = default_tag
    {
        op.tags = Some(vec![tag.to_owned()]);
    }

    let responses = &mut op.responses.responses;
    if responses.is_empty() {
        responses.insert(
            "200".to_owned(),
            RefOr::T(ResponseBuilder::new().description("Success").build()),
        );
    }

    let takes_query = op
        .parameters
        .as_ref()
        .is_some_and(|ps| ps.iter().any(|p| p.parameter_in == ParameterIn::Query));
    if (op.request_body.is_some() || takes_query) && !responses.contains_key("400") {
        responses.insert("400".to_owned(), problem_response("Bad Request"));
    }
    if !responses.contains_key("500") {
        responses.insert("500".to_owned(), problem_response("Internal Server Error"));
    }
}

pub fn transform_schemas(doc: &mut OpenApi) {
    let Some(components) = doc.components.as_mut() else {
        return;
    };
    for schema in components.schemas.values_mut() {
        if let RefOr::T(Schema::Object(obj)) = schema {
            for prop in obj.properties.values_mut() {
                if let RefOr::T(Schema::Object(p)) = prop {
                    add_example(p);
                }
            }
        }
    }
}

fn primary_type(schema_type: &SchemaType) -> Option<Type> {
    match schema_type {
        SchemaType::Type(t) => Some(t.clone()),
        SchemaType::Array(ts) => ts.iter().find(|t| **t != Type::Null).cloned(),
        SchemaType::AnyValue => None,
    }
}

fn add_example(obj: &mut Object) {
    if !obj.examples.is_empty() {
        return;
    }
    let is_date_time = matches!(
        obj.format,
        Some(SchemaFormat::KnownFormat(KnownFormat::DateTime))
    );
    let example = match primary_type(&obj.schema_type) {
        Some(Type::String) if is_date_time => serde_json::json!("2024-01-01T00:00:00Z"),
        Some(Type::String) => serde_json::json!("string"),
        Some(Type::Integer) => serde_json::json!(0),
        Some(Type::Number) => serde_json::json!(0.0),
        Some(Type::Boolean) => serde_json::json!(true),
        _ => return,
    };
    obj.examples.push(example);
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::Environment;
    use utoipa::openapi::{
        OpenApiBuilder, PathItem, PathsBuilder,
        path::{HttpMethod, OperationBuilder, ParameterBuilder},
    };

    #[derive(utoipa::ToSchema)]
    #[allow(dead_code)]
    struct Sample {
        name: String,
        count: i32,
        enabled: bool,
    }

    fn doc_with(op: Operation) -> OpenApi {
        OpenApiBuilder::new()
            .paths(PathsBuilder::new().path("/i18n", PathItem::new(HttpMethod::Get, op)))
            .build()
    }

    #[test]
    fn names_are_sanitized() {
        assert_eq!(sanitize_schema_name("#/Page<TranslationDto>"), "PageTranslationDto");
        assert_eq!(sanitize_schema_name("i18n.Dto_1-a"), "i18n.Dto_1-a");
    }

    #[test]
    fn document_gets_info_servers_and_security() {
        let mut doc = doc_with(OperationBuilder::new().build());
        let server = ServerConfig {
            bind_addr: "0.0.0.0:8080".to_owned(),
            environment: Environment::Development,
            timeout_secs: 30,
        };
        let openapi = OpenApiConfig {
            public_url: Some("https://lingua.example.com".to_owned()),
            contact_email: Some("i18n@example.com".to_owned()),
            ..OpenApiConfig::default()
        };

        transform_document(&mut doc, &openapi, &server);

        assert_eq!(doc.info.title, "Lingua API");
        assert!(doc.info.contact.is_some());
        let servers = doc.servers.unwrap();
        assert_eq!(servers.len(), 2);
        assert_eq!(servers[1].url, "http://localhost:8080");
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key(BEARER_SCHEME));
        assert!(components.schemas.contains_key("Problem"));
    }

    #[test]
    fn production_has_no_development_server() {
        let mut doc = doc_with(OperationBuilder::new().build());
        transform_document(&mut doc, &OpenApiConfig::default(), &ServerConfig::default());
        assert!(doc.servers.is_none());
    }

    #[test]
    fn operations_get_default_responses_and_tag() {
        let op = OperationBuilder::new()
            .parameter(
                ParameterBuilder::new()
                    .name("language")
                    .parameter_in(ParameterIn::Query)
                    .build(),
            )
            .build();
        let mut doc = doc_with(op);

        transform_operations(&mut doc);

        let op = doc.paths.paths["/i18n"].get.clone().unwrap();
        let responses = op.responses.responses;
        assert!(responses.contains_key("200"));
        assert!(responses.contains_key("400"));
        assert!(responses.contains_key("500"));
        assert_eq!(op.tags, Some(vec!["i18n".to_owned()]));
    }

    #[test]
    fn operations_without_input_get_no_400() {
        let mut doc = doc_with(OperationBuilder::new().build());
        transform_operations(&mut doc);
        let responses = doc.paths.paths["/i18n"].get.clone().unwrap().responses.responses;
        assert!(!responses.contains_key("400"));
        assert!(responses.contains_key("500"));
    }

    #[test]
    fn primitive_properties_get_examples() {
        let mut doc = OpenApiBuilder::new()
            .components(Some(
                ComponentsBuilder::new()
                    .schema("Sample", <Sample as utoipa::PartialSchema>::schema())
                    .build(),
            ))
            .build();

        transform_schemas(&mut doc);

        let components = doc.components.unwrap();
        let RefOr::T(Schema::Object(obj)) = &components.schemas["Sample"] else {
            panic!("expected object schema");
        };
        let example_of = |name: &str| match &obj.properties[name] {
            RefOr::T(Schema::Object(p)) => p.examples.first().cloned(),
            _ => None,
        };
        assert_eq!(example_of("name"), Some(serde_json::json!("string")));
        assert_eq!(example_of("count"), Some(serde_json::json!(0)));
        assert_eq!(example_of("enabled"), Some(serde_json::json!(true)));
    }
}
