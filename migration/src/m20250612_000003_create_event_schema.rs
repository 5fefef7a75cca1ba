use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Events::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Events::Title).string().not_null())
                    .col(ColumnDef::new(Events::Description).text().not_null())
                    .col(ColumnDef::new(Events::ResponsibleId).integer().not_null())
                    .col(ColumnDef::new(Events::PlaceId).integer().not_null())
                    .col(ColumnDef::new(Events::Date).date().not_null())
                    .col(ColumnDef::new(Events::StartTime).time().not_null())
                    .col(ColumnDef::new(Events::EndTime).time().not_null())
                    .col(ColumnDef::new(Events::CreatorId).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_events_responsible_id")
                            .from(Events::Table, Events::ResponsibleId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_events_place_id")
                            .from(Events::Table, Events::PlaceId)
                            .to(Places::Table, Places::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_events_creator_id")
                            .from(Events::Table, Events::CreatorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // The overlap check always filters on (place_id, date)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_events_place_date")
                    .table(Events::Table)
                    .col(Events::PlaceId)
                    .col(Events::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EventModules::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EventModules::EventId).integer().not_null())
                    .col(ColumnDef::new(EventModules::ModuleId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(EventModules::EventId)
                            .col(EventModules::ModuleId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_modules_event_id")
                            .from(EventModules::Table, EventModules::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_modules_module_id")
                            .from(EventModules::Table, EventModules::ModuleId)
                            .to(Modules::Table, Modules::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EventModules::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
    Title,
    Description,
    ResponsibleId,
    PlaceId,
    Date,
    StartTime,
    EndTime,
    CreatorId,
}

#[derive(DeriveIden)]
enum EventModules {
    Table,
    EventId,
    ModuleId,
}

#[derive(DeriveIden)]
enum Employees {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Places {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Modules {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
