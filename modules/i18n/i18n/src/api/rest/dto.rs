//! REST DTOs of the i18n module. JSON field names are camelCase.

use i18n_sdk::{
    AddTranslation, Culture, CultureWithStats, DeleteTranslation, NewCulture, Page, Translation,
    UpdateTranslation,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TranslationDto {
    pub id: i32,
    pub entity_type: String,
    pub entity_id: i32,
    pub culture_id: i32,
    /// Culture code, e.g. "en-US".
    pub culture_code: String,
    pub property_name: String,
    pub value: String,
}

impl From<Translation> for TranslationDto {
    fn from(t: Translation) -> Self {
        Self {
            id: t.id,
            entity_type: t.entity_type,
            entity_id: t.entity_id,
            culture_id: t.culture_id,
            culture_code: t.culture_code,
            property_name: t.property_name,
            value: t.value,
        }
    }
}

/// One page of translations.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PagedTranslationsDto {
    /// 1-based.
    pub page_number: u64,
    pub page_size: u64,
    pub results: Vec<TranslationDto>,
    pub total_number_of_pages: u64,
    pub total_number_of_records: u64,
}

impl From<Page<Translation>> for PagedTranslationsDto {
    fn from(page: Page<Translation>) -> Self {
        let page = page.map(TranslationDto::from);
        Self {
            page_number: page.page_number,
            page_size: page.page_size,
            results: page.results,
            total_number_of_pages: page.total_number_of_pages,
            total_number_of_records: page.total_number_of_records,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CultureDto {
    pub id: i32,
    pub code: String,
    pub name: String,
}

impl From<Culture> for CultureDto {
    fn from(c: Culture) -> Self {
        Self {
            id: c.id,
            code: c.code,
            name: c.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CultureWithStatsDto {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub translation_count: u64,
}

impl From<CultureWithStats> for CultureWithStatsDto {
    fn from(c: CultureWithStats) -> Self {
        Self {
            id: c.culture.id,
            code: c.culture.code,
            name: c.culture.name,
            translation_count: c.translation_count,
        }
    }
}

// Missing text fields deserialize as empty so that they are reported by the
// domain validation (400) rather than by the JSON extractor.

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AddTranslationRequest {
    pub entity_id: i32,
    pub property_name: String,
    pub entity_type: String,
    /// Culture code.
    pub language: String,
    pub value: String,
}

impl From<AddTranslationRequest> for AddTranslation {
    fn from(r: AddTranslationRequest) -> Self {
        Self {
            entity_id: r.entity_id,
            property_name: r.property_name,
            entity_type: r.entity_type,
            language: r.language,
            value: r.value,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateTranslationRequest {
    /// Used only when the translation does not exist yet.
    pub entity_id: Option<i32>,
    pub property_name: String,
    pub entity_type: String,
    pub language: String,
    pub value: String,
}

impl From<UpdateTranslationRequest> for UpdateTranslation {
    fn from(r: UpdateTranslationRequest) -> Self {
        Self {
            entity_id: r.entity_id,
            property_name: r.property_name,
            entity_type: r.entity_type,
            language: r.language,
            value: r.value,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateCultureRequest {
    /// 2 to 10 characters, e.g. "de-CH".
    pub code: String,
    /// 2 to 100 characters.
    pub name: String,
}

impl From<CreateCultureRequest> for NewCulture {
    fn from(r: CreateCultureRequest) -> Self {
        Self {
            code: r.code,
            name: r.name,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalizationQuery {
    pub language: String,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyQuery {
    pub entity_type: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeleteTranslationQuery {
    pub language: String,
    pub property_name: String,
    pub entity_type: String,
}

impl From<DeleteTranslationQuery> for DeleteTranslation {
    fn from(q: DeleteTranslationQuery) -> Self {
        Self {
            language: q.language,
            property_name: q.property_name,
            entity_type: q.entity_type,
        }
    }
}
