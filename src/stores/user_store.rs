use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, TransactionTrait,
};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::stores::eq_ci;
use crate::types::db::{profile, user};

/// Field values of a sign-up submission after validation
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub password: String,
    pub security_answer_1: String,
    pub security_answer_2: String,
}

/// Account detail changes (profile changes go through `update_profile`)
#[derive(Debug, Clone)]
pub struct AccountUpdate {
    pub email: String,
    pub phone: String,
    pub department: String,
}

/// UserStore manages user accounts, their credentials and profiles
pub struct UserStore {
    db: DatabaseConnection,
    password_pepper: String,
}

impl UserStore {
    /// # Arguments
    /// * `db` - The database connection
    /// * `password_pepper` - Secret mixed into every password hash
    pub fn new(db: DatabaseConnection, password_pepper: String) -> Self {
        Self { db, password_pepper }
    }

    /// Create a user together with its empty profile row.
    ///
    /// Creating a user always creates its profile in the same transaction;
    /// there is no code path that leaves a user without one.
    pub async fn create_with_profile(&self, data: NewUser) -> Result<user::Model, InternalError> {
        let user_id = Uuid::new_v4().to_string();
        let password_hash = self.hash_password(&data.password)?;
        let now = Utc::now().timestamp();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| InternalError::database("begin_create_user", e))?;

        let row = user::ActiveModel {
            id: Set(user_id.clone()),
            username: Set(data.username),
            email: Set(data.email),
            phone: Set(data.phone),
            department: Set(data.department),
            password_hash: Set(password_hash),
            security_answer_1: Set(data.security_answer_1),
            security_answer_2: Set(data.security_answer_2),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = row
            .insert(&txn)
            .await
            .map_err(|e| InternalError::database("insert_user", e))?;

        let profile_row = profile::ActiveModel {
            user_id: Set(user_id),
            avatar_path: Set(None),
            bio: Set(None),
        };

        profile_row
            .insert(&txn)
            .await
            .map_err(|e| InternalError::database("insert_profile", e))?;

        txn.commit()
            .await
            .map_err(|e| InternalError::database("commit_create_user", e))?;

        Ok(created)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<user::Model>, InternalError> {
        user::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find_user_by_id", e))
    }

    /// Exact-match username lookup (usernames are stored unique).
    pub async fn find_by_username(&self, username: &str) -> Result<Option<user::Model>, InternalError> {
        user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find_user_by_username", e))
    }

    /// Case-insensitive username lookup for free-text references
    /// (e.g. a message recipient field).
    pub async fn find_by_username_ci(&self, username: &str) -> Result<Vec<user::Model>, InternalError> {
        user::Entity::find()
            .filter(eq_ci(user::Column::Username, username))
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("find_user_by_username_ci", e))
    }

    pub async fn username_in_use(&self, username: &str) -> Result<bool, InternalError> {
        let count = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .count(&self.db)
            .await
            .map_err(|e| InternalError::database("count_username", e))?;
        Ok(count > 0)
    }

    /// Whether another user already claims `email`. `exclude` removes the
    /// account being edited from the check.
    pub async fn email_in_use(
        &self,
        email: &str,
        exclude: Option<&str>,
    ) -> Result<bool, InternalError> {
        let mut query = user::Entity::find().filter(user::Column::Email.eq(email));

        if let Some(id) = exclude {
            query = query.filter(user::Column::Id.ne(id));
        }

        let count = query
            .count(&self.db)
            .await
            .map_err(|e| InternalError::database("count_email", e))?;
        Ok(count > 0)
    }

    /// Verify username/password. `Ok(None)` covers both an unknown username
    /// and a wrong password; the caller cannot tell the two apart.
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<user::Model>, InternalError> {
        let Some(user) = self.find_by_username(username).await? else {
            return Ok(None);
        };

        let Ok(parsed_hash) = PasswordHash::new(&user.password_hash) else {
            return Ok(None);
        };

        if self
            .argon2()?
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_err()
        {
            return Ok(None);
        }

        Ok(Some(user))
    }

    pub async fn set_password(&self, user_id: &str, password: &str) -> Result<(), InternalError> {
        let user = self
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| InternalError::entity_not_found("user", user_id))?;

        let password_hash = self.hash_password(password)?;

        let mut row: user::ActiveModel = user.into();
        row.password_hash = Set(password_hash);
        row.updated_at = Set(Utc::now().timestamp());

        row.update(&self.db)
            .await
            .map_err(|e| InternalError::database("set_password", e))?;

        Ok(())
    }

    pub async fn update_account(
        &self,
        user_id: &str,
        data: AccountUpdate,
    ) -> Result<user::Model, InternalError> {
        let user = self
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| InternalError::entity_not_found("user", user_id))?;

        let mut row: user::ActiveModel = user.into();
        row.email = Set(data.email);
        row.phone = Set(data.phone);
        row.department = Set(data.department);
        row.updated_at = Set(Utc::now().timestamp());

        row.update(&self.db)
            .await
            .map_err(|e| InternalError::database("update_account", e))
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<Option<profile::Model>, InternalError> {
        profile::Entity::find_by_id(user_id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("get_profile", e))
    }

    pub async fn update_profile(
        &self,
        user_id: &str,
        avatar_path: Option<String>,
        bio: Option<String>,
    ) -> Result<profile::Model, InternalError> {
        let profile = self
            .get_profile(user_id)
            .await?
            .ok_or_else(|| InternalError::entity_not_found("profile", user_id))?;

        let mut row: profile::ActiveModel = profile.into();
        row.avatar_path = Set(avatar_path);
        row.bio = Set(bio);

        row.update(&self.db)
            .await
            .map_err(|e| InternalError::database("update_profile", e))
    }

    fn argon2(&self) -> Result<Argon2<'_>, InternalError> {
        Argon2::new_with_secret(
            self.password_pepper.as_bytes(),
            Algorithm::Argon2id,
            Version::V0x13,
            Params::default(),
        )
        .map_err(|e| InternalError::Crypto {
            operation: "argon2_init",
            message: e.to_string(),
        })
    }

    fn hash_password(&self, password: &str) -> Result<String, InternalError> {
        let salt = SaltString::generate(&mut OsRng);
        Ok(self
            .argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| InternalError::Crypto {
                operation: "hash_password",
                message: e.to_string(),
            })?
            .to_string())
    }
}

impl std::fmt::Debug for UserStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserStore")
            .field("db", &"<connection>")
            .field("password_pepper", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup_test_db() -> (DatabaseConnection, UserStore) {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        let store = UserStore::new(db.clone(), "test-pepper-for-unit-tests".to_string());
        (db, store)
    }

    fn sample(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            phone: "600000000".to_string(),
            department: "IT".to_string(),
            password: "correcthorse".to_string(),
            security_answer_1: "rex".to_string(),
            security_answer_2: "maria".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_with_profile_creates_both_rows() {
        let (_db, store) = setup_test_db().await;

        let user = store
            .create_with_profile(sample("newuser", "new@example.com"))
            .await
            .unwrap();

        let profile = store.get_profile(&user.id).await.unwrap();
        assert!(profile.is_some());
        let profile = profile.unwrap();
        assert_eq!(profile.user_id, user.id);
        assert!(profile.avatar_path.is_none());
        assert!(profile.bio.is_none());
    }

    #[tokio::test]
    async fn test_password_is_stored_hashed() {
        let (_db, store) = setup_test_db().await;

        let user = store
            .create_with_profile(sample("hashuser", "hash@example.com"))
            .await
            .unwrap();

        assert_ne!(user.password_hash, "correcthorse");
        assert!(user.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_verify_credentials_accepts_correct_password() {
        let (_db, store) = setup_test_db().await;

        let created = store
            .create_with_profile(sample("login", "login@example.com"))
            .await
            .unwrap();

        let verified = store
            .verify_credentials("login", "correcthorse")
            .await
            .unwrap();
        assert_eq!(verified.map(|u| u.id), Some(created.id));
    }

    #[tokio::test]
    async fn test_verify_credentials_rejects_wrong_password_and_unknown_user() {
        let (_db, store) = setup_test_db().await;

        store
            .create_with_profile(sample("login", "login@example.com"))
            .await
            .unwrap();

        assert!(store
            .verify_credentials("login", "wrongpass")
            .await
            .unwrap()
            .is_none());
        assert!(store
            .verify_credentials("ghost", "correcthorse")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_email_in_use_excludes_the_account_under_edit() {
        let (_db, store) = setup_test_db().await;

        let user = store
            .create_with_profile(sample("mail", "mail@example.com"))
            .await
            .unwrap();

        assert!(store.email_in_use("mail@example.com", None).await.unwrap());
        assert!(!store
            .email_in_use("mail@example.com", Some(&user.id))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_set_password_rotates_the_hash() {
        let (_db, store) = setup_test_db().await;

        let user = store
            .create_with_profile(sample("rotate", "rotate@example.com"))
            .await
            .unwrap();

        store.set_password(&user.id, "anotherpassword").await.unwrap();

        assert!(store
            .verify_credentials("rotate", "correcthorse")
            .await
            .unwrap()
            .is_none());
        assert!(store
            .verify_credentials("rotate", "anotherpassword")
            .await
            .unwrap()
            .is_some());
    }
}
