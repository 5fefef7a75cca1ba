use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};

use crate::errors::InternalError;
use crate::stores::eq_ci;
use crate::types::db::{department, employee, event};

/// DepartmentStore manages the department reference data
pub struct DepartmentStore {
    db: DatabaseConnection,
}

impl DepartmentStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<department::Model>, InternalError> {
        department::Entity::find()
            .order_by_asc(department::Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("list_departments", e))
    }

    /// All departments whose name matches `name` case-insensitively.
    /// The resolver decides what zero, one or many matches mean.
    pub async fn find_by_name_ci(&self, name: &str) -> Result<Vec<department::Model>, InternalError> {
        department::Entity::find()
            .filter(eq_ci(department::Column::Name, name))
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("find_department_by_name", e))
    }

    pub async fn create(&self, name: &str) -> Result<department::Model, InternalError> {
        let now = Utc::now().timestamp();
        let row = department::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            name: Set(name.trim().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        row.insert(&self.db)
            .await
            .map_err(|e| InternalError::database("create_department", e))
    }

    /// Deleting a department cascades to its employees, which is only legal
    /// when none of those employees is still responsible for an event.
    pub async fn delete(&self, id: i32) -> Result<(), InternalError> {
        let referencing_events = event::Entity::find()
            .join(JoinType::InnerJoin, event::Relation::Responsible.def())
            .filter(employee::Column::DepartmentId.eq(id))
            .count(&self.db)
            .await
            .map_err(|e| InternalError::database("count_department_events", e))?;

        if referencing_events > 0 {
            return Err(InternalError::ProtectedReference {
                entity: "department",
                id: id.to_string(),
                count: referencing_events,
            });
        }

        let result = department::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| InternalError::database("delete_department", e))?;

        if result.rows_affected == 0 {
            return Err(InternalError::entity_not_found("department", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    #[tokio::test]
    async fn test_find_by_name_ci_ignores_case() {
        let db = setup_test_db().await;
        let store = DepartmentStore::new(db);

        store.create("Recursos Humanos").await.unwrap();

        let matches = store.find_by_name_ci("recursos humanos").await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "Recursos Humanos");

        let matches = store.find_by_name_ci("RECURSOS HUMANOS").await.unwrap();
        assert_eq!(matches.len(), 1);
    }

    #[tokio::test]
    async fn test_find_by_name_ci_trims_input() {
        let db = setup_test_db().await;
        let store = DepartmentStore::new(db);

        store.create("IT").await.unwrap();

        let matches = store.find_by_name_ci("  it  ").await.unwrap();
        assert_eq!(matches.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_department_reports_not_found() {
        let db = setup_test_db().await;
        let store = DepartmentStore::new(db);

        let result = store.delete(999).await;
        assert!(matches!(
            result,
            Err(InternalError::EntityNotFound { entity: "department", .. })
        ));
    }
}
