use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::errors::InternalError;
use crate::stores::eq_ci;
use crate::types::db::{event, place};

/// PlaceStore manages the rooms/locations events are scheduled in
pub struct PlaceStore {
    db: DatabaseConnection,
}

impl PlaceStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<place::Model>, InternalError> {
        place::Entity::find()
            .order_by_asc(place::Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("list_places", e))
    }

    /// All places whose name matches `name` case-insensitively. The schema
    /// does not force place names unique, so this can genuinely return more
    /// than one row; the resolver reports that as an ambiguity.
    pub async fn find_by_name_ci(&self, name: &str) -> Result<Vec<place::Model>, InternalError> {
        place::Entity::find()
            .filter(eq_ci(place::Column::Name, name))
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("find_place_by_name", e))
    }

    pub async fn create(&self, name: &str) -> Result<place::Model, InternalError> {
        let row = place::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            name: Set(name.trim().to_string()),
        };

        row.insert(&self.db)
            .await
            .map_err(|e| InternalError::database("create_place", e))
    }

    /// Deletion is blocked while any event is scheduled at the place.
    pub async fn delete(&self, id: i32) -> Result<(), InternalError> {
        let referencing_events = event::Entity::find()
            .filter(event::Column::PlaceId.eq(id))
            .count(&self.db)
            .await
            .map_err(|e| InternalError::database("count_place_events", e))?;

        if referencing_events > 0 {
            return Err(InternalError::ProtectedReference {
                entity: "place",
                id: id.to_string(),
                count: referencing_events,
            });
        }

        let result = place::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| InternalError::database("delete_place", e))?;

        if result.rows_affected == 0 {
            return Err(InternalError::entity_not_found("place", id));
        }

        Ok(())
    }
}
