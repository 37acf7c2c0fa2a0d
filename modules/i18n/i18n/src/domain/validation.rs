//! Input checks shared by the command and query handlers.

use super::error::DomainError;

pub(crate) const CULTURE_CODE_LEN: (usize, usize) = (2, 10);
pub(crate) const CULTURE_NAME_LEN: (usize, usize) = (2, 100);

fn require(field: &str, value: &str, message: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(field, message));
    }
    Ok(())
}

pub(crate) fn property_name(value: &str) -> Result<(), DomainError> {
    require("propertyName", value, "Property name cannot be empty.")
}

pub(crate) fn entity_type(value: &str) -> Result<(), DomainError> {
    require("entityType", value, "Entity type cannot be empty.")
}

pub(crate) fn language(value: &str) -> Result<(), DomainError> {
    require("language", value, "Language cannot be empty.")
}

/// Property name, entity type, language; first failure wins.
pub(crate) fn translation_key(
    property: &str,
    entity: &str,
    lang: &str,
) -> Result<(), DomainError> {
    property_name(property)?;
    entity_type(entity)?;
    language(lang)
}

pub(crate) fn paging(page: u64, page_size: u64, max_page_size: u64) -> Result<(), DomainError> {
    if page == 0 {
        return Err(DomainError::validation("page", "Page must be at least 1."));
    }
    if page_size == 0 || page_size > max_page_size {
        return Err(DomainError::validation(
            "pageSize",
            format!("Page size must be between 1 and {max_page_size}."),
        ));
    }
    Ok(())
}

pub(crate) fn length(
    field: &str,
    label: &str,
    value: &str,
    (min, max): (usize, usize),
) -> Result<(), DomainError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(DomainError::validation(
            field,
            format!("{label} must be between {min} and {max} characters."),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn message(r: Result<(), DomainError>) -> String {
        r.unwrap_err().to_string()
    }

    #[test]
    fn checks_run_in_order() {
        assert_eq!(message(translation_key(" ", "", "")), "Property name cannot be empty.");
        assert_eq!(message(translation_key("Title", "\t", "")), "Entity type cannot be empty.");
        assert_eq!(message(translation_key("Title", "Product", " ")), "Language cannot be empty.");
        assert!(translation_key("Title", "Product", "en-US").is_ok());
    }

    #[test]
    fn paging_bounds() {
        assert!(paging(1, 10, 100).is_ok());
        assert!(paging(1, 100, 100).is_ok());
        assert_eq!(message(paging(0, 10, 100)), "Page must be at least 1.");
        assert_eq!(message(paging(1, 0, 100)), "Page size must be between 1 and 100.");
        assert!(paging(1, 101, 100).is_err());
    }

    #[test]
    fn length_counts_characters() {
        assert!(length("code", "Culture code", "en", CULTURE_CODE_LEN).is_ok());
        assert!(length("code", "Culture code", "e", CULTURE_CODE_LEN).is_err());
        assert!(length("code", "Culture code", "zh-Hant-TWX", CULTURE_CODE_LEN).is_err());
        assert!(length("name", "Culture name", "Ελληνικά", CULTURE_NAME_LEN).is_ok());
    }
}
