use i18n_sdk::NewCulture;
use serde::{Deserialize, Serialize};

/// `modules.i18n` section of the application config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct I18nConfig {
    /// Page size used when a request does not name one.
    pub default_page_size: u64,
    /// Largest accepted page size.
    pub max_page_size: u64,
    /// Cultures inserted at startup when their code is missing.
    pub seed_cultures: Vec<NewCulture>,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 100,
            seed_cultures: Vec::new(),
        }
    }
}

impl I18nConfig {
    /// # Errors
    /// Page bounds that cannot serve any request.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_page_size == 0 {
            return Err("modules.i18n.max_page_size must be at least 1".to_owned());
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(format!(
                "modules.i18n.default_page_size must be between 1 and {}",
                self.max_page_size
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = I18nConfig::default();
        assert_eq!(cfg.default_page_size, 10);
        assert_eq!(cfg.max_page_size, 100);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn parses_seed_cultures_and_rejects_unknown_keys() {
        let cfg: I18nConfig = serde_json::from_value(serde_json::json!({
            "seed_cultures": [{ "code": "en-US", "name": "English (United States)" }]
        }))
        .unwrap();
        assert_eq!(cfg.seed_cultures[0].code, "en-US");
        assert_eq!(cfg.default_page_size, 10);

        let bad = serde_json::from_value::<I18nConfig>(serde_json::json!({ "page": 1 }));
        assert!(bad.is_err());
    }

    #[test]
    fn default_page_size_must_fit_max() {
        let cfg = I18nConfig {
            default_page_size: 50,
            max_page_size: 20,
            seed_cultures: vec![],
        };
        assert!(cfg.validate().is_err());
    }
}
