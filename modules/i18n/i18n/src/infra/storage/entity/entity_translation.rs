use lingua_db::AggregateRoot;
use sea_orm::entity::prelude::*;

/// One translated property of one entity in one culture. `entity_id` is not
/// a foreign key: entities live outside this module.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "entity_translations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub entity_type: String,
    pub entity_id: i32,
    pub culture_id: i32,
    pub property_name: String,
    #[sea_orm(column_type = "Text")]
    pub value: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::culture::Entity",
        from = "Column::CultureId",
        to = "super::culture::Column::Id",
        on_delete = "Cascade"
    )]
    Culture,
}

impl Related<super::culture::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Culture.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl AggregateRoot for Entity {}
