use i18n_sdk::I18nError;
use lingua_db::DbError;

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("Culture '{language}' not found.")]
    CultureNotFound { language: String },

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl DomainError {
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

impl From<DomainError> for I18nError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation { field, message } => Self::validation(field, message),
            DomainError::CultureNotFound { language } => Self::culture_not_found(language),
            DomainError::Conflict(msg) => Self::Conflict(msg),
            DomainError::Database(err) => {
                tracing::error!(error = %err, "i18n storage failure");
                Self::Internal
            }
        }
    }
}
