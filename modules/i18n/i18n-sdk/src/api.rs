//! `I18nApi` trait definition.

use async_trait::async_trait;

use crate::errors::I18nError;
use crate::models::{
    AddTranslation, Culture, CultureWithStats, DeleteTranslation, NewCulture, Page, Translation,
    UpdateTranslation,
};

/// In-process API of the i18n module. The module ships a local
/// implementation backed by its domain service.
#[async_trait]
pub trait I18nApi: Send + Sync {
    async fn add_translation(&self, cmd: AddTranslation) -> Result<Translation, I18nError>;

    /// Insert or replace the value for (property, entity type, culture).
    async fn update_translation(&self, cmd: UpdateTranslation) -> Result<Translation, I18nError>;

    /// Removing a translation that does not exist succeeds.
    async fn delete_translation(&self, cmd: DeleteTranslation) -> Result<(), I18nError>;

    /// Translations of one culture, by id. `page` is 1-based; `None` picks the
    /// module defaults.
    async fn get_localization(
        &self,
        language: &str,
        page: Option<u64>,
        page_size: Option<u64>,
    ) -> Result<Page<Translation>, I18nError>;

    async fn get_by_property(
        &self,
        property_name: &str,
        entity_type: &str,
    ) -> Result<Vec<Translation>, I18nError>;

    async fn list_cultures(&self) -> Result<Vec<CultureWithStats>, I18nError>;

    async fn create_culture(&self, culture: NewCulture) -> Result<Culture, I18nError>;
}
