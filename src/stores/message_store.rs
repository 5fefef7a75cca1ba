use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::errors::InternalError;
use crate::types::db::message;

/// MessageStore persists the internal messages between users
pub struct MessageStore {
    db: DatabaseConnection,
}

impl MessageStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn send(
        &self,
        sender_id: &str,
        recipient_id: &str,
        subject: &str,
        body: &str,
    ) -> Result<message::Model, InternalError> {
        let row = message::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            sender_id: Set(sender_id.to_string()),
            recipient_id: Set(recipient_id.to_string()),
            subject: Set(subject.to_string()),
            body: Set(body.to_string()),
            sent_at: Set(Utc::now().timestamp()),
            is_read: Set(false),
        };

        row.insert(&self.db)
            .await
            .map_err(|e| InternalError::database("send_message", e))
    }

    /// A user's received messages, newest first.
    pub async fn inbox(&self, user_id: &str) -> Result<Vec<message::Model>, InternalError> {
        message::Entity::find()
            .filter(message::Column::RecipientId.eq(user_id))
            .order_by_desc(message::Column::SentAt)
            .order_by_desc(message::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("list_inbox", e))
    }

    pub async fn get(&self, id: i32) -> Result<Option<message::Model>, InternalError> {
        message::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("get_message", e))
    }

    pub async fn mark_read(&self, id: i32) -> Result<message::Model, InternalError> {
        let message = self
            .get(id)
            .await?
            .ok_or_else(|| InternalError::entity_not_found("message", id))?;

        let mut row: message::ActiveModel = message.into();
        row.is_read = Set(true);

        row.update(&self.db)
            .await
            .map_err(|e| InternalError::database("mark_message_read", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::user_store::NewUser;
    use crate::stores::UserStore;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup() -> (MessageStore, String, String) {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        let users = UserStore::new(db.clone(), "test-pepper".to_string());
        let alice = users
            .create_with_profile(NewUser {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                phone: "600000001".to_string(),
                department: "IT".to_string(),
                password: "alicepass".to_string(),
                security_answer_1: "rex".to_string(),
                security_answer_2: "maria".to_string(),
            })
            .await
            .unwrap();
        let bob = users
            .create_with_profile(NewUser {
                username: "bob".to_string(),
                email: "bob@example.com".to_string(),
                phone: "600000002".to_string(),
                department: "IT".to_string(),
                password: "bobpass".to_string(),
                security_answer_1: "toby".to_string(),
                security_answer_2: "carmen".to_string(),
            })
            .await
            .unwrap();

        (MessageStore::new(db), alice.id, bob.id)
    }

    #[tokio::test]
    async fn test_inbox_only_contains_received_messages() {
        let (store, alice, bob) = setup().await;

        store.send(&alice, &bob, "hola", "primer mensaje").await.unwrap();
        store.send(&bob, &alice, "re: hola", "respuesta").await.unwrap();

        let inbox = store.inbox(&bob).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].subject, "hola");
        assert!(!inbox[0].is_read);
    }

    #[tokio::test]
    async fn test_mark_read_flips_the_flag() {
        let (store, alice, bob) = setup().await;

        let sent = store.send(&alice, &bob, "hola", "cuerpo").await.unwrap();
        let updated = store.mark_read(sent.id).await.unwrap();

        assert!(updated.is_read);
    }
}
