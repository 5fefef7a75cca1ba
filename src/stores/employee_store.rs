use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::errors::InternalError;
use crate::stores::{contains_ci, eq_ci};
use crate::types::db::{department, employee, event};

/// Field values of an employee submission after validation
#[derive(Debug, Clone)]
pub struct EmployeeData {
    pub first_name: String,
    pub last_name: String,
    pub department_id: i32,
    pub phone: String,
    pub email: String,
    pub notes: Option<String>,
}

/// EmployeeStore manages the employee directory
pub struct EmployeeStore {
    db: DatabaseConnection,
}

impl EmployeeStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// List employees with their department, optionally filtered by a
    /// substring over first/last name and by department name.
    pub async fn list(
        &self,
        search: Option<&str>,
        department_name: Option<&str>,
    ) -> Result<Vec<(employee::Model, Option<department::Model>)>, InternalError> {
        let mut query = employee::Entity::find()
            .find_also_related(department::Entity)
            .order_by_asc(employee::Column::FirstName)
            .order_by_asc(employee::Column::LastName);

        if let Some(term) = search {
            query = query.filter(
                Condition::any()
                    .add(contains_ci(employee::Column::FirstName, term))
                    .add(contains_ci(employee::Column::LastName, term)),
            );
        }

        if let Some(term) = department_name {
            query = query.filter(contains_ci(
                (department::Entity, department::Column::Name),
                term,
            ));
        }

        query
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("list_employees", e))
    }

    pub async fn get(
        &self,
        id: i32,
    ) -> Result<Option<(employee::Model, Option<department::Model>)>, InternalError> {
        employee::Entity::find_by_id(id)
            .find_also_related(department::Entity)
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("get_employee", e))
    }

    /// All employees matching (first name, last name) case-insensitively.
    pub async fn find_by_full_name_ci(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> Result<Vec<employee::Model>, InternalError> {
        employee::Entity::find()
            .filter(eq_ci(employee::Column::FirstName, first_name))
            .filter(eq_ci(employee::Column::LastName, last_name))
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("find_employee_by_full_name", e))
    }

    /// Count of other employees carrying the same (first, last) pair,
    /// ignoring case. `exclude` removes the row being edited from the check.
    pub async fn count_same_name(
        &self,
        first_name: &str,
        last_name: &str,
        exclude: Option<i32>,
    ) -> Result<u64, InternalError> {
        let mut query = employee::Entity::find()
            .filter(eq_ci(employee::Column::FirstName, first_name))
            .filter(eq_ci(employee::Column::LastName, last_name));

        if let Some(id) = exclude {
            query = query.filter(employee::Column::Id.ne(id));
        }

        query
            .count(&self.db)
            .await
            .map_err(|e| InternalError::database("count_same_name_employees", e))
    }

    pub async fn insert(&self, data: EmployeeData) -> Result<employee::Model, InternalError> {
        let now = Utc::now().timestamp();
        let row = employee::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            first_name: Set(data.first_name),
            last_name: Set(data.last_name),
            department_id: Set(data.department_id),
            phone: Set(data.phone),
            email: Set(data.email),
            notes: Set(data.notes),
            created_at: Set(now),
            updated_at: Set(now),
        };

        row.insert(&self.db)
            .await
            .map_err(|e| InternalError::database("insert_employee", e))
    }

    pub async fn update(&self, id: i32, data: EmployeeData) -> Result<employee::Model, InternalError> {
        let existing = employee::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("get_employee", e))?
            .ok_or_else(|| InternalError::entity_not_found("employee", id))?;

        let mut row: employee::ActiveModel = existing.into();
        row.first_name = Set(data.first_name);
        row.last_name = Set(data.last_name);
        row.department_id = Set(data.department_id);
        row.phone = Set(data.phone);
        row.email = Set(data.email);
        row.notes = Set(data.notes);
        row.updated_at = Set(Utc::now().timestamp());

        row.update(&self.db)
            .await
            .map_err(|e| InternalError::database("update_employee", e))
    }

    /// Deletion is blocked while the employee is responsible for any event.
    pub async fn delete(&self, id: i32) -> Result<(), InternalError> {
        let referencing_events = event::Entity::find()
            .filter(event::Column::ResponsibleId.eq(id))
            .count(&self.db)
            .await
            .map_err(|e| InternalError::database("count_employee_events", e))?;

        if referencing_events > 0 {
            return Err(InternalError::ProtectedReference {
                entity: "employee",
                id: id.to_string(),
                count: referencing_events,
            });
        }

        let result = employee::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| InternalError::database("delete_employee", e))?;

        if result.rows_affected == 0 {
            return Err(InternalError::entity_not_found("employee", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::DepartmentStore;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup_test_db() -> (DatabaseConnection, EmployeeStore, i32) {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        let department = DepartmentStore::new(db.clone())
            .create("IT")
            .await
            .expect("Failed to create department");

        (db.clone(), EmployeeStore::new(db), department.id)
    }

    fn sample(department_id: i32, first: &str, last: &str) -> EmployeeData {
        EmployeeData {
            first_name: first.to_string(),
            last_name: last.to_string(),
            department_id,
            phone: "123456789".to_string(),
            email: format!("{}.{}@example.com", first.to_lowercase(), last.to_lowercase()),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_full_name_lookup_is_case_insensitive() {
        let (_db, store, dept) = setup_test_db().await;

        store.insert(sample(dept, "Juan", "Perez")).await.unwrap();

        let matches = store.find_by_full_name_ci("juan", "PEREZ").await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].first_name, "Juan");
    }

    #[tokio::test]
    async fn test_count_same_name_excludes_the_row_under_edit() {
        let (_db, store, dept) = setup_test_db().await;

        let juan = store.insert(sample(dept, "Juan", "Perez")).await.unwrap();

        assert_eq!(store.count_same_name("Juan", "Perez", None).await.unwrap(), 1);
        assert_eq!(
            store
                .count_same_name("juan", "perez", Some(juan.id))
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_list_filters_by_name_substring() {
        let (_db, store, dept) = setup_test_db().await;

        store.insert(sample(dept, "Ana", "Gomez")).await.unwrap();
        store.insert(sample(dept, "Juan", "Perez")).await.unwrap();

        let rows = store.list(Some("gom"), None).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0.first_name, "Ana");

        let rows = store.list(None, Some("it")).await.unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_list_orders_by_first_then_last_name() {
        let (_db, store, dept) = setup_test_db().await;

        store.insert(sample(dept, "Juan", "Perez")).await.unwrap();
        store.insert(sample(dept, "Ana", "Gomez")).await.unwrap();

        let rows = store.list(None, None).await.unwrap();
        let names: Vec<_> = rows.iter().map(|(e, _)| e.first_name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Juan"]);
    }

    #[tokio::test]
    async fn test_delete_missing_employee_reports_not_found() {
        let (_db, store, _dept) = setup_test_db().await;

        let result = store.delete(42).await;
        assert!(matches!(
            result,
            Err(InternalError::EntityNotFound { entity: "employee", .. })
        ));
    }
}
