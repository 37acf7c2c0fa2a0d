//! Command and query handlers of the i18n module.
//!
//! Each call works on its own [`UnitOfWork`]; mutations are persisted as they
//! are issued. Culture lookups are by exact, case-sensitive code.

use i18n_sdk::{
    AddTranslation, Culture, CultureWithStats, DeleteTranslation, NewCulture, Page, Translation,
    UpdateTranslation,
};
use lingua_db::{Db, DbError, Repository, TxConfig, UnitOfWork};
use sea_orm::{
    ActiveValue::{NotSet, Set},
    ColumnTrait, IntoActiveModel, QueryFilter, QueryOrder, SqlErr,
};
use tracing::{debug, info};

use super::error::DomainError;
use super::validation;
use crate::config::I18nConfig;
use crate::infra::storage::entity::{culture, entity_translation};
use crate::infra::storage::mapper::to_translation;

pub struct Service {
    db: Db,
    config: I18nConfig,
}

impl Service {
    #[must_use]
    pub fn new(db: Db, config: I18nConfig) -> Self {
        Self { db, config }
    }

    #[must_use]
    pub fn config(&self) -> &I18nConfig {
        &self.config
    }

    /// # Errors
    /// Validation, unknown culture, storage failure.
    pub async fn add_translation(&self, cmd: AddTranslation) -> Result<Translation, DomainError> {
        validation::translation_key(&cmd.property_name, &cmd.entity_type, &cmd.language)?;

        let uow = self.db.unit_of_work();
        let culture = find_culture(&uow, &cmd.language).await?;
        let saved = Repository::<entity_translation::Entity>::new(&uow)
            .add(new_translation(
                cmd.entity_type,
                cmd.entity_id,
                culture.id,
                cmd.property_name,
                cmd.value,
            ))
            .await?;

        debug!(id = saved.id, culture = %culture.code, rows = uow.save_changes(), "translation added");
        Ok(to_translation(saved, culture.code))
    }

    /// Insert or replace the value for (property, entity type, culture) in
    /// one transaction. An existing row keeps its `entity_id`.
    ///
    /// # Errors
    /// Validation, unknown culture, storage failure.
    pub async fn update_translation(
        &self,
        cmd: UpdateTranslation,
    ) -> Result<Translation, DomainError> {
        validation::translation_key(&cmd.property_name, &cmd.entity_type, &cmd.language)?;

        let uow = self.db.unit_of_work();
        let tx = uow.begin_transaction(TxConfig::default()).await?;
        let culture = find_culture(&uow, &cmd.language).await?;
        let repo = Repository::<entity_translation::Entity>::new(&uow);

        let existing =
            find_translation(&uow, &cmd.property_name, &cmd.entity_type, culture.id).await?;
        let saved = if let Some(row) = existing {
            let mut model = row.into_active_model();
            model.value = Set(cmd.value);
            repo.update(model).await?
        } else {
            repo.add(new_translation(
                cmd.entity_type,
                cmd.entity_id.unwrap_or(0),
                culture.id,
                cmd.property_name,
                cmd.value,
            ))
            .await?
        };
        tx.commit().await?;

        debug!(id = saved.id, culture = %culture.code, rows = uow.save_changes(), "translation upserted");
        Ok(to_translation(saved, culture.code))
    }

    /// Removing something that is not there, including an unknown culture,
    /// succeeds.
    ///
    /// # Errors
    /// Validation, storage failure.
    pub async fn delete_translation(&self, cmd: DeleteTranslation) -> Result<(), DomainError> {
        validation::translation_key(&cmd.property_name, &cmd.entity_type, &cmd.language)?;

        let uow = self.db.unit_of_work();
        let culture = match find_culture(&uow, &cmd.language).await {
            Ok(c) => c,
            Err(DomainError::CultureNotFound { .. }) => return Ok(()),
            Err(e) => return Err(e),
        };
        let Some(row) =
            find_translation(&uow, &cmd.property_name, &cmd.entity_type, culture.id).await?
        else {
            debug!(property = %cmd.property_name, "nothing to delete");
            return Ok(());
        };

        let id = row.id;
        Repository::<entity_translation::Entity>::new(&uow)
            .delete(row.into_active_model())
            .await?;
        debug!(id, rows = uow.save_changes(), "translation deleted");
        Ok(())
    }

    /// Translations of one culture ordered by id. Defaults: page 1 and the
    /// configured page size.
    ///
    /// # Errors
    /// Validation (language, page bounds), unknown culture, storage failure.
    pub async fn get_localization(
        &self,
        language: &str,
        page: Option<u64>,
        page_size: Option<u64>,
    ) -> Result<Page<Translation>, DomainError> {
        validation::language(language)?;
        let page = page.unwrap_or(1);
        let page_size = page_size.unwrap_or(self.config.default_page_size);
        validation::paging(page, page_size, self.config.max_page_size)?;

        let uow = self.db.unit_of_work();
        let culture = find_culture(&uow, language).await?;
        let repo = Repository::<entity_translation::Entity>::new(&uow);
        let query = repo
            .query()
            .filter(entity_translation::Column::CultureId.eq(culture.id))
            .order_by_asc(entity_translation::Column::Id);
        let rows = repo.page(query, page, page_size).await?;

        Ok(Page {
            page_number: rows.page_number,
            page_size: rows.page_size,
            total_number_of_pages: rows.total_number_of_pages,
            total_number_of_records: rows.total_number_of_records,
            results: rows
                .results
                .into_iter()
                .map(|row| to_translation(row, culture.code.clone()))
                .collect(),
        })
    }

    /// All cultures' translations of one property of one entity type.
    /// Blank arguments match nothing, since stored keys are never blank.
    ///
    /// # Errors
    /// Storage failure.
    pub async fn get_by_property(
        &self,
        property_name: &str,
        entity_type: &str,
    ) -> Result<Vec<Translation>, DomainError> {
        let uow = self.db.unit_of_work();
        let repo = Repository::<entity_translation::Entity>::new(&uow);
        let query = repo
            .query()
            .filter(entity_translation::Column::PropertyName.eq(property_name))
            .filter(entity_translation::Column::EntityType.eq(entity_type))
            .order_by_asc(entity_translation::Column::Id)
            .find_also_related(culture::Entity);
        let rows = repo.list_with_related(query).await?;

        Ok(rows
            .into_iter()
            // The database collation may be case-insensitive.
            .filter(|(t, _)| t.property_name == property_name && t.entity_type == entity_type)
            .map(|(t, c)| to_translation(t, c.map(|c| c.code).unwrap_or_default()))
            .collect())
    }

    /// Every culture, ordered by code, with its number of translations.
    ///
    /// # Errors
    /// Storage failure.
    pub async fn list_cultures(&self) -> Result<Vec<CultureWithStats>, DomainError> {
        let uow = self.db.unit_of_work();
        let cultures = Repository::<culture::Entity>::new(&uow);
        let translations = Repository::<entity_translation::Entity>::new(&uow);

        let rows = cultures
            .to_list(cultures.query().order_by_asc(culture::Column::Code))
            .await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let translation_count = translations
                .count(
                    translations
                        .query()
                        .filter(entity_translation::Column::CultureId.eq(row.id)),
                )
                .await?;
            out.push(CultureWithStats {
                culture: row.into(),
                translation_count,
            });
        }
        Ok(out)
    }

    /// # Errors
    /// Code or name length out of bounds, duplicate code, storage failure.
    pub async fn create_culture(&self, new: NewCulture) -> Result<Culture, DomainError> {
        let (code, name) = checked_culture(&new)?;

        let uow = self.db.unit_of_work();
        if try_find_culture(&uow, code).await?.is_some() {
            return Err(duplicate(code));
        }
        let saved = Repository::<culture::Entity>::new(&uow)
            .add(new_culture(code, name))
            .await
            .map_err(|e| {
                if unique_violation(&e) {
                    duplicate(code)
                } else {
                    e.into()
                }
            })?;

        info!(id = saved.id, code = %saved.code, "culture created");
        Ok(saved.into())
    }

    /// Insert every culture whose code is missing. Returns how many were
    /// inserted, so repeated runs report 0.
    ///
    /// # Errors
    /// Invalid seed entry, storage failure.
    pub async fn seed_cultures(&self, seeds: &[NewCulture]) -> Result<u64, DomainError> {
        if seeds.is_empty() {
            return Ok(0);
        }
        let uow = self.db.unit_of_work();
        let tx = uow.begin_transaction(TxConfig::default()).await?;
        let repo = Repository::<culture::Entity>::new(&uow);
        for seed in seeds {
            let (code, name) = checked_culture(seed)?;
            if try_find_culture(&uow, code).await?.is_none() {
                repo.add(new_culture(code, name)).await?;
                debug!(code, "culture seeded");
            }
        }
        tx.commit().await?;

        let inserted = uow.save_changes();
        info!(inserted, configured = seeds.len(), "culture seeding finished");
        Ok(inserted)
    }
}

fn new_translation(
    entity_type: String,
    entity_id: i32,
    culture_id: i32,
    property_name: String,
    value: String,
) -> entity_translation::ActiveModel {
    entity_translation::ActiveModel {
        id: NotSet,
        entity_type: Set(entity_type),
        entity_id: Set(entity_id),
        culture_id: Set(culture_id),
        property_name: Set(property_name),
        value: Set(value),
    }
}

fn new_culture(code: &str, name: &str) -> culture::ActiveModel {
    culture::ActiveModel {
        id: NotSet,
        code: Set(code.to_owned()),
        name: Set(name.to_owned()),
    }
}

/// Trimmed code and name, length-checked.
fn checked_culture(new: &NewCulture) -> Result<(&str, &str), DomainError> {
    let code = new.code.trim();
    let name = new.name.trim();
    validation::length("code", "Culture code", code, validation::CULTURE_CODE_LEN)?;
    validation::length("name", "Culture name", name, validation::CULTURE_NAME_LEN)?;
    Ok((code, name))
}

fn duplicate(code: &str) -> DomainError {
    DomainError::Conflict(format!("Culture '{code}' already exists."))
}

fn unique_violation(e: &DbError) -> bool {
    matches!(
        e,
        DbError::Sea(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
    )
}

async fn try_find_culture(
    uow: &UnitOfWork,
    code: &str,
) -> Result<Option<culture::Model>, DomainError> {
    let repo = Repository::<culture::Entity>::new(uow);
    let candidates = repo
        .to_list(repo.query().filter(culture::Column::Code.eq(code)))
        .await?;
    Ok(candidates.into_iter().find(|c| c.code == code))
}

async fn find_culture(uow: &UnitOfWork, code: &str) -> Result<culture::Model, DomainError> {
    try_find_culture(uow, code)
        .await?
        .ok_or_else(|| DomainError::culture_not_found(code))
}

/// First row (by id) for the key, exact match on the text columns.
async fn find_translation(
    uow: &UnitOfWork,
    property_name: &str,
    entity_type: &str,
    culture_id: i32,
) -> Result<Option<entity_translation::Model>, DomainError> {
    let repo = Repository::<entity_translation::Entity>::new(uow);
    let rows = repo
        .to_list(
            repo.query()
                .filter(entity_translation::Column::PropertyName.eq(property_name))
                .filter(entity_translation::Column::EntityType.eq(entity_type))
                .filter(entity_translation::Column::CultureId.eq(culture_id))
                .order_by_asc(entity_translation::Column::Id),
        )
        .await?;
    Ok(rows
        .into_iter()
        .find(|t| t.property_name == property_name && t.entity_type == entity_type))
}
