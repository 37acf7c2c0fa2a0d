use std::sync::Arc;

use axum::http::StatusCode;
use axum::{Extension, Router};
use lingua_kit::api::{Missing, OpenApiRegistry, OperationBuilder};

use crate::api::rest::{dto, handlers};
use crate::domain::service::Service;

type Op = OperationBuilder<Missing, Missing, ()>;

const TAG: &str = "Localization";

pub fn register_routes(
    router: Router,
    openapi: &dyn OpenApiRegistry,
    service: Arc<Service>,
) -> Router {
    let router = query_routes(router, openapi);
    let router = command_routes(router, openapi);
    culture_routes(router, openapi).layer(Extension(service))
}

fn query_routes(mut router: Router, openapi: &dyn OpenApiRegistry) -> Router {
    router = Op::get("/i18n")
        .operation_id("i18n.get_localization")
        .summary("List translations of a culture")
        .description("Paged translations of one culture, ordered by id")
        .tag(TAG)
        .query_param("language", true, "Culture code, e.g. en-US")
        .query_param_typed("page", false, "1-based page number (default 1)", "integer")
        .query_param_typed("pageSize", false, "Rows per page (default 10)", "integer")
        .require_auth()
        .handler(handlers::get_localization)
        .json_response_with_schema::<dto::PagedTranslationsDto>(
            openapi,
            StatusCode::OK,
            "Page of translations",
        )
        .error_400(openapi)
        .error_401(openapi)
        .error_404(openapi)
        .error_500(openapi)
        .register(router, openapi);

    router = Op::get("/i18n/{propertyName}")
        .operation_id("i18n.get_by_property")
        .summary("Translations of one property")
        .description(
            "Every culture's value of a property for an entity type. A property named \
             `cultures` cannot be read here: `GET /i18n/cultures` lists cultures instead",
        )
        .tag(TAG)
        .path_param("propertyName", "Translated property, e.g. Title")
        .query_param("entityType", true, "Entity type, e.g. Product")
        .require_auth()
        .handler(handlers::get_by_property)
        .json_array_response::<dto::TranslationDto>(openapi, StatusCode::OK, "Translations")
        .error_401(openapi)
        .error_500(openapi)
        .register(router, openapi);

    router
}

fn command_routes(mut router: Router, openapi: &dyn OpenApiRegistry) -> Router {
    router = Op::post("/i18n")
        .operation_id("i18n.add_translation")
        .summary("Add a translation")
        .tag(TAG)
        .require_auth()
        .json_request::<dto::AddTranslationRequest>(openapi, "Translation to add")
        .handler(handlers::add_translation)
        .json_response_with_schema::<dto::TranslationDto>(
            openapi,
            StatusCode::OK,
            "Translation added",
        )
        .error_400(openapi)
        .error_401(openapi)
        .error_404(openapi)
        .error_500(openapi)
        .register(router, openapi);

    router = Op::put("/i18n")
        .operation_id("i18n.update_translation")
        .summary("Insert or replace a translation")
        .description(
            "Replaces the value of the first translation matching property, entity type \
             and culture, or inserts one",
        )
        .tag(TAG)
        .require_auth()
        .json_request::<dto::UpdateTranslationRequest>(openapi, "Translation value")
        .handler(handlers::update_translation)
        .json_response_with_schema::<dto::TranslationDto>(
            openapi,
            StatusCode::OK,
            "Resulting translation",
        )
        .error_400(openapi)
        .error_401(openapi)
        .error_404(openapi)
        .error_500(openapi)
        .register(router, openapi);

    router = Op::delete("/i18n")
        .operation_id("i18n.delete_translation")
        .summary("Delete a translation")
        .description("Deleting a translation that does not exist succeeds")
        .tag(TAG)
        .query_param("language", true, "Culture code")
        .query_param("propertyName", true, "Translated property")
        .query_param("entityType", true, "Entity type")
        .require_auth()
        .handler(handlers::delete_translation)
        .empty_response(StatusCode::NO_CONTENT, "Deleted")
        .error_400(openapi)
        .error_401(openapi)
        .error_500(openapi)
        .register(router, openapi);

    router
}

fn culture_routes(mut router: Router, openapi: &dyn OpenApiRegistry) -> Router {
    router = Op::get("/i18n/cultures")
        .operation_id("i18n.list_cultures")
        .summary("List cultures")
        .description(
            "All cultures ordered by code, with their translation counts. Takes precedence \
             over `GET /i18n/{propertyName}` for the literal path segment `cultures`",
        )
        .tag(TAG)
        .require_auth()
        .handler(handlers::list_cultures)
        .json_array_response::<dto::CultureWithStatsDto>(openapi, StatusCode::OK, "Cultures")
        .error_401(openapi)
        .error_500(openapi)
        .register(router, openapi);

    router = Op::post("/i18n/cultures")
        .operation_id("i18n.create_culture")
        .summary("Create a culture")
        .tag(TAG)
        .require_auth()
        .json_request::<dto::CreateCultureRequest>(openapi, "Culture to create")
        .handler(handlers::create_culture)
        .json_response_with_schema::<dto::CultureDto>(
            openapi,
            StatusCode::CREATED,
            "Culture created",
        )
        .error_400(openapi)
        .error_401(openapi)
        .error_409(openapi)
        .error_500(openapi)
        .register(router, openapi);

    router
}
