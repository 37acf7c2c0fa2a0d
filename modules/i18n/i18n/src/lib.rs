//! i18n module
//!
//! Translations of entity properties keyed by culture, exposed over REST and
//! in-process through [`I18nApi`]. The public contract lives in `i18n-sdk`
//! and is re-exported here.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub use i18n_sdk::{
    AddTranslation, Culture, CultureWithStats, DeleteTranslation, I18nApi, I18nError, NewCulture,
    Page, Translation, UpdateTranslation,
};

pub mod module;
pub use module::{I18nModule, MODULE_NAME};

pub mod local_client;
pub use local_client::LocalClient;

#[doc(hidden)]
pub mod api;
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
