use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Cultures::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Cultures::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Cultures::Code).string_len(10).not_null())
                    .col(ColumnDef::new(Cultures::Name).string_len(100).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_cultures_code")
                    .table(Cultures::Table)
                    .col(Cultures::Code)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EntityTranslations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EntityTranslations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EntityTranslations::EntityType).string_len(100).not_null())
                    .col(ColumnDef::new(EntityTranslations::EntityId).integer().not_null())
                    .col(ColumnDef::new(EntityTranslations::CultureId).integer().not_null())
                    .col(ColumnDef::new(EntityTranslations::PropertyName).string_len(100).not_null())
                    .col(ColumnDef::new(EntityTranslations::Value).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_entity_translations_culture")
                            .from(EntityTranslations::Table, EntityTranslations::CultureId)
                            .to(Cultures::Table, Cultures::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Lookup path of update/delete; deliberately not unique.
        manager
            .create_index(
                Index::create()
                    .name("ix_entity_translations_lookup")
                    .table(EntityTranslations::Table)
                    .col(EntityTranslations::PropertyName)
                    .col(EntityTranslations::EntityType)
                    .col(EntityTranslations::CultureId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EntityTranslations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Cultures::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Cultures {
    Table,
    Id,
    Code,
    Name,
}

#[derive(DeriveIden)]
enum EntityTranslations {
    Table,
    Id,
    EntityType,
    EntityId,
    CultureId,
    PropertyName,
    Value,
}
