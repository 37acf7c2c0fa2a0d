//! Module declaration for the i18n module.

use std::sync::Arc;

use anyhow::Context;
use arc_swap::ArcSwapOption;
use axum::Router;
use i18n_sdk::I18nApi;
use lingua_db::{Db, MigrationReport, run_migrations};
use lingua_kit::{AppConfig, OpenApiRegistry, RestModule};
use tracing::{debug, info};

use crate::config::I18nConfig;
use crate::domain::service::Service;
use crate::infra::storage::Migrator;
use crate::local_client::LocalClient;

/// Key of the module's section under `modules` in the application config.
pub const MODULE_NAME: &str = "i18n";

/// i18n module: cultures and per-entity property translations.
///
/// Lifecycle: [`I18nModule::migrate`] (optional, once per database), then
/// [`I18nModule::init`], then registration on the REST host.
#[derive(Default)]
pub struct I18nModule {
    service: ArcSwapOption<Service>,
}

impl I18nModule {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the module's pending schema migrations.
    ///
    /// # Errors
    /// A migration failed.
    pub async fn migrate(db: &Db) -> anyhow::Result<MigrationReport> {
        run_migrations::<Migrator>(db)
            .await
            .context("i18n migrations failed")
    }

    /// Read `modules.i18n`, build the service and insert missing seed
    /// cultures.
    ///
    /// # Errors
    /// Invalid module config, or seeding failed (e.g. tables are missing).
    pub async fn init(&self, app: &AppConfig, db: Db) -> anyhow::Result<()> {
        info!("Initializing i18n module");

        let cfg: I18nConfig = app.module_config(MODULE_NAME)?;
        cfg.validate().map_err(anyhow::Error::msg)?;
        debug!(
            default_page_size = cfg.default_page_size,
            max_page_size = cfg.max_page_size,
            seed_cultures = cfg.seed_cultures.len(),
            "Loaded i18n config"
        );

        let service = Arc::new(Service::new(db, cfg));
        let seeded = service
            .seed_cultures(&service.config().seed_cultures)
            .await
            .context("seeding cultures failed")?;
        if seeded > 0 {
            info!(seeded, "seed cultures inserted");
        }

        self.service.store(Some(service));
        info!("i18n module initialized");
        Ok(())
    }

    /// # Errors
    /// `init` has not completed.
    pub fn service(&self) -> anyhow::Result<Arc<Service>> {
        self.service
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("i18n service not initialized"))
    }

    /// In-process client for other components.
    ///
    /// # Errors
    /// `init` has not completed.
    pub fn client(&self) -> anyhow::Result<Arc<dyn I18nApi>> {
        Ok(Arc::new(LocalClient::new(self.service()?)))
    }
}

impl RestModule for I18nModule {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn register_rest(&self, router: Router, openapi: &dyn OpenApiRegistry) -> anyhow::Result<Router> {
        let service = self.service()?;
        Ok(crate::api::rest::routes::register_routes(
            router, openapi, service,
        ))
    }
}
