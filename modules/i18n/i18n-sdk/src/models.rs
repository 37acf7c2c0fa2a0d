//! Transport-agnostic models of the i18n module.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Culture {
    pub id: i32,
    /// e.g. "en-US"
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CultureWithStats {
    pub culture: Culture,
    pub translation_count: u64,
}

/// One translated property value of one entity in one culture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub id: i32,
    pub entity_type: String,
    pub entity_id: i32,
    pub culture_id: i32,
    pub culture_code: String,
    pub property_name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub page_number: u64,
    pub page_size: u64,
    pub results: Vec<T>,
    pub total_number_of_pages: u64,
    pub total_number_of_records: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            page_number: self.page_number,
            page_size: self.page_size,
            results: self.results.into_iter().map(f).collect(),
            total_number_of_pages: self.total_number_of_pages,
            total_number_of_records: self.total_number_of_records,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddTranslation {
    pub entity_id: i32,
    pub property_name: String,
    pub entity_type: String,
    /// Culture code.
    pub language: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTranslation {
    /// Only used when no translation exists yet; 0 when absent.
    pub entity_id: Option<i32>,
    pub property_name: String,
    pub entity_type: String,
    pub language: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTranslation {
    pub language: String,
    pub property_name: String,
    pub entity_type: String,
}

/// Culture to create, also the shape of `modules.i18n.seed_cultures` entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewCulture {
    pub code: String,
    pub name: String,
}
