use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, Hash, DeriveEntityModel)]
#[sea_orm(table_name = "modules")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::event_module::Entity")]
    EventModule,
}

impl Related<super::event_module::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EventModule.def()
    }
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        super::event_module::Relation::Event.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::event_module::Relation::Module.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
