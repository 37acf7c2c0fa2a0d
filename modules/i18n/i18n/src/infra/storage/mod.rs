//! `SeaORM` persistence: entities, row mappers and schema migrations.

pub mod entity;
pub mod mapper;
pub mod migrations;

pub use migrations::Migrator;
