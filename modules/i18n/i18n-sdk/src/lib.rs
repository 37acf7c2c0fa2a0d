//! i18n SDK
//!
//! Public contract of the i18n module:
//! - `I18nApi` trait for in-process consumers
//! - models (`Culture`, `CultureWithStats`, `Translation`, `Page`) and
//!   commands (`AddTranslation`, `UpdateTranslation`, `DeleteTranslation`,
//!   `NewCulture`)
//! - `I18nError`

#![forbid(unsafe_code)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod errors;
pub mod models;

pub use api::I18nApi;
pub use errors::I18nError;
pub use models::{
    AddTranslation, Culture, CultureWithStats, DeleteTranslation, NewCulture, Page, Translation,
    UpdateTranslation,
};
