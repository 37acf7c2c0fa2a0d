//! Error type exposed to consumers of the i18n module.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum I18nError {
    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("Culture '{language}' not found.")]
    CultureNotFound { language: String },

    #[error("{0}")]
    Conflict(String),

    #[error("Internal error")]
    Internal,
}

impl I18nError {
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn culture_not_found(language: impl Into<String>) -> Self {
        Self::CultureNotFound {
            language: language.into(),
        }
    }
}
