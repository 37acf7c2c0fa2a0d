pub mod culture;
pub mod entity_translation;
