use std::sync::Arc;

use axum::extract::{Extension, OriginalUri, Path, Query};
use lingua_kit::api::prelude::*;

use super::dto::{
    AddTranslationRequest, CreateCultureRequest, CultureDto, CultureWithStatsDto,
    DeleteTranslationQuery, LocalizationQuery, PagedTranslationsDto, PropertyQuery,
    TranslationDto, UpdateTranslationRequest,
};
use crate::domain::service::Service;

pub async fn get_localization(
    Extension(svc): Extension<Arc<Service>>,
    Query(q): Query<LocalizationQuery>,
) -> ApiResult<JsonBody<PagedTranslationsDto>> {
    let page = svc.get_localization(&q.language, q.page, q.page_size).await?;
    Ok(Json(page.into()))
}

pub async fn get_by_property(
    Extension(svc): Extension<Arc<Service>>,
    Path(property_name): Path<String>,
    Query(q): Query<PropertyQuery>,
) -> ApiResult<JsonBody<Vec<TranslationDto>>> {
    let rows = svc.get_by_property(&property_name, &q.entity_type).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

pub async fn add_translation(
    Extension(svc): Extension<Arc<Service>>,
    Json(req): Json<AddTranslationRequest>,
) -> ApiResult<JsonBody<TranslationDto>> {
    let saved = svc.add_translation(req.into()).await?;
    Ok(Json(saved.into()))
}

pub async fn update_translation(
    Extension(svc): Extension<Arc<Service>>,
    Json(req): Json<UpdateTranslationRequest>,
) -> ApiResult<JsonBody<TranslationDto>> {
    let saved = svc.update_translation(req.into()).await?;
    Ok(Json(saved.into()))
}

pub async fn delete_translation(
    Extension(svc): Extension<Arc<Service>>,
    Query(q): Query<DeleteTranslationQuery>,
) -> ApiResult<impl IntoResponse> {
    svc.delete_translation(q.into()).await?;
    Ok(no_content())
}

pub async fn list_cultures(
    Extension(svc): Extension<Arc<Service>>,
) -> ApiResult<JsonBody<Vec<CultureWithStatsDto>>> {
    let cultures = svc.list_cultures().await?;
    Ok(Json(cultures.into_iter().map(Into::into).collect()))
}

pub async fn create_culture(
    Extension(svc): Extension<Arc<Service>>,
    OriginalUri(uri): OriginalUri,
    Json(req): Json<CreateCultureRequest>,
) -> ApiResult<impl IntoResponse> {
    let culture = svc.create_culture(req.into()).await?;
    let id = culture.id.to_string();
    Ok(created_json(CultureDto::from(culture), &uri, &id))
}
