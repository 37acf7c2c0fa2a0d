use std::sync::Arc;

use async_trait::async_trait;
use i18n_sdk::{
    AddTranslation, Culture, CultureWithStats, DeleteTranslation, I18nApi, I18nError, NewCulture,
    Page, Translation, UpdateTranslation,
};

use crate::domain::service::Service;

/// `I18nApi` backed by the in-process domain service.
pub struct LocalClient {
    service: Arc<Service>,
}

impl LocalClient {
    #[must_use]
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl I18nApi for LocalClient {
    async fn add_translation(&self, cmd: AddTranslation) -> Result<Translation, I18nError> {
        self.service.add_translation(cmd).await.map_err(Into::into)
    }

    async fn update_translation(&self, cmd: UpdateTranslation) -> Result<Translation, I18nError> {
        self.service.update_translation(cmd).await.map_err(Into::into)
    }

    async fn delete_translation(&self, cmd: DeleteTranslation) -> Result<(), I18nError> {
        self.service.delete_translation(cmd).await.map_err(Into::into)
    }

    async fn get_localization(
        &self,
        language: &str,
        page: Option<u64>,
        page_size: Option<u64>,
    ) -> Result<Page<Translation>, I18nError> {
        self.service
            .get_localization(language, page, page_size)
            .await
            .map_err(Into::into)
    }

    async fn get_by_property(
        &self,
        property_name: &str,
        entity_type: &str,
    ) -> Result<Vec<Translation>, I18nError> {
        self.service
            .get_by_property(property_name, entity_type)
            .await
            .map_err(Into::into)
    }

    async fn list_cultures(&self) -> Result<Vec<CultureWithStats>, I18nError> {
        self.service.list_cultures().await.map_err(Into::into)
    }

    async fn create_culture(&self, culture: NewCulture) -> Result<Culture, I18nError> {
        self.service.create_culture(culture).await.map_err(Into::into)
    }
}
