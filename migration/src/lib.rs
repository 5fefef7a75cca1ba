pub use sea_orm_migration::prelude::*;

mod m20250612_000001_create_directory_schema;
mod m20250612_000002_create_account_schema;
mod m20250612_000003_create_event_schema;
mod m20250612_000004_create_message_schema;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250612_000001_create_directory_schema::Migration),
            Box::new(m20250612_000002_create_account_schema::Migration),
            Box::new(m20250612_000003_create_event_schema::Migration),
            Box::new(m20250612_000004_create_message_schema::Migration),
        ]
    }
}
