use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::errors::InternalError;
use crate::stores::eq_ci;
use crate::types::db::module;

/// ModuleStore manages the module tags attached to events
pub struct ModuleStore {
    db: DatabaseConnection,
}

impl ModuleStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<module::Model>, InternalError> {
        module::Entity::find()
            .order_by_asc(module::Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("list_modules", e))
    }

    pub async fn find_by_name_ci(&self, name: &str) -> Result<Vec<module::Model>, InternalError> {
        module::Entity::find()
            .filter(eq_ci(module::Column::Name, name))
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("find_module_by_name", e))
    }

    pub async fn create(&self, name: &str) -> Result<module::Model, InternalError> {
        let row = module::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            name: Set(name.trim().to_string()),
        };

        row.insert(&self.db)
            .await
            .map_err(|e| InternalError::database("create_module", e))
    }

    /// Module rows can always be removed; the join rows to events cascade.
    pub async fn delete(&self, id: i32) -> Result<(), InternalError> {
        let result = module::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| InternalError::database("delete_module", e))?;

        if result.rows_affected == 0 {
            return Err(InternalError::entity_not_found("module", id));
        }

        Ok(())
    }
}
