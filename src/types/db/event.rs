use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub description: String,
    pub responsible_id: i32,
    pub place_id: i32,
    pub date: Date,
    pub start_time: Time,
    pub end_time: Time,
    pub creator_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::ResponsibleId",
        to = "super::employee::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Responsible,
    #[sea_orm(
        belongs_to = "super::place::Entity",
        from = "Column::PlaceId",
        to = "super::place::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Place,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatorId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Creator,
    #[sea_orm(has_many = "super::event_module::Entity")]
    EventModule,
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Responsible.def()
    }
}

impl Related<super::place::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Place.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::event_module::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EventModule.def()
    }
}

impl Related<super::module::Entity> for Entity {
    fn to() -> RelationDef {
        super::event_module::Relation::Module.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::event_module::Relation::Event.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
