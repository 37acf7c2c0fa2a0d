//! Row to model conversions.

use i18n_sdk::{Culture, Translation};

use super::entity::{culture, entity_translation};

impl From<culture::Model> for Culture {
    fn from(m: culture::Model) -> Self {
        Self {
            id: m.id,
            code: m.code,
            name: m.name,
        }
    }
}

/// Combine a translation row with the code of its culture.
pub fn to_translation(row: entity_translation::Model, culture_code: String) -> Translation {
    Translation {
        id: row.id,
        entity_type: row.entity_type,
        entity_id: row.entity_id,
        culture_id: row.culture_id,
        culture_code,
        property_name: row.property_name,
        value: row.value,
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn translation_carries_culture_code() {
        let row = entity_translation::Model {
            id: 3,
            entity_type: "Product".to_owned(),
            entity_id: 42,
            culture_id: 1,
            property_name: "Title".to_owned(),
            value: "Bonjour".to_owned(),
        };
        let t = to_translation(row, "fr-FR".to_owned());
        assert_eq!(t.culture_code, "fr-FR");
        assert_eq!(t.entity_id, 42);
        assert_eq!(t.value, "Bonjour");
    }
}
