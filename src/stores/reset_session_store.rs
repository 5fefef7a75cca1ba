use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

use crate::errors::InternalError;
use crate::types::db::reset_session;

/// ResetSessionStore persists the server-side password-recovery sessions.
/// Tokens are stored hashed; expiry is checked by the service on every step.
pub struct ResetSessionStore {
    db: DatabaseConnection,
}

impl ResetSessionStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a session for the user, discarding any session they already
    /// had in flight. Only one recovery attempt is live per account.
    pub async fn create(
        &self,
        token_hash: String,
        user_id: &str,
        state: &str,
        expires_at: i64,
    ) -> Result<reset_session::Model, InternalError> {
        reset_session::Entity::delete_many()
            .filter(reset_session::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(|e| InternalError::database("clear_reset_sessions", e))?;

        let row = reset_session::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            token_hash: Set(token_hash),
            user_id: Set(user_id.to_string()),
            state: Set(state.to_string()),
            expires_at: Set(expires_at),
            created_at: Set(Utc::now().timestamp()),
        };

        row.insert(&self.db)
            .await
            .map_err(|e| InternalError::database("create_reset_session", e))
    }

    pub async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<reset_session::Model>, InternalError> {
        reset_session::Entity::find()
            .filter(reset_session::Column::TokenHash.eq(token_hash))
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find_reset_session", e))
    }

    pub async fn set_state(&self, id: i32, state: &str) -> Result<(), InternalError> {
        let session = reset_session::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("get_reset_session", e))?
            .ok_or_else(|| InternalError::entity_not_found("reset_session", id))?;

        let mut row: reset_session::ActiveModel = session.into();
        row.state = Set(state.to_string());

        row.update(&self.db)
            .await
            .map_err(|e| InternalError::database("update_reset_session", e))?;

        Ok(())
    }

    pub async fn delete(&self, id: i32) -> Result<(), InternalError> {
        reset_session::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| InternalError::database("delete_reset_session", e))?;

        Ok(())
    }
}
