use std::sync::Arc;

use crate::errors::{FormErrors, SubmissionError, ValidationError};
use crate::services::resolver::require;
use crate::stores::{AccountUpdate, NewUser, UserStore};
use crate::types::db::user;

/// Validates and applies account submissions: sign-up and account detail
/// updates. Password hashing and the user+profile transaction live in the
/// store; this service owns the input checks.
pub struct AccountService {
    users: Arc<UserStore>,
}

impl AccountService {
    pub fn new(users: Arc<UserStore>) -> Self {
        Self { users }
    }

    /// Register a new account. The profile row is created together with the
    /// user row; there is no separate step that could be skipped.
    pub async fn sign_up(&self, data: NewUser) -> Result<user::Model, SubmissionError> {
        let mut errors = FormErrors::new();

        for (field, value) in [
            ("username", &data.username),
            ("email", &data.email),
            ("phone", &data.phone),
            ("department", &data.department),
            ("password", &data.password),
            ("security_answer_1", &data.security_answer_1),
            ("security_answer_2", &data.security_answer_2),
        ] {
            if let Err(e) = require(value) {
                errors.add_field(field, e);
            }
        }

        if !errors.has_field("username") && self.users.username_in_use(&data.username).await? {
            errors.add_form(ValidationError::DuplicateEntity(format!(
                "the username '{}' is already taken",
                data.username
            )));
        }

        if !errors.has_field("email") && self.users.email_in_use(&data.email, None).await? {
            errors.add_form(ValidationError::DuplicateEntity(format!(
                "the email address '{}' is already in use",
                data.email
            )));
        }

        errors.into_result(())?;

        self.users.create_with_profile(data).await.map_err(Into::into)
    }

    /// Update account details. Email uniqueness excludes the account itself,
    /// so saving without changing the address is always legal.
    pub async fn update_account(
        &self,
        user_id: &str,
        data: AccountUpdate,
    ) -> Result<user::Model, SubmissionError> {
        let mut errors = FormErrors::new();

        for (field, value) in [
            ("email", &data.email),
            ("phone", &data.phone),
            ("department", &data.department),
        ] {
            if let Err(e) = require(value) {
                errors.add_field(field, e);
            }
        }

        if !errors.has_field("email") && self.users.email_in_use(&data.email, Some(user_id)).await? {
            errors.add_form(ValidationError::DuplicateEntity(format!(
                "the email address '{}' is already in use",
                data.email
            )));
        }

        errors.into_result(())?;

        self.users
            .update_account(user_id, data)
            .await
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup() -> (AccountService, Arc<UserStore>) {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        let users = Arc::new(UserStore::new(db, "test-pepper".to_string()));
        (AccountService::new(users.clone()), users)
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

    fn expect_validation(result: Result<user::Model, SubmissionError>) -> FormErrors {
        match result {
            Err(SubmissionError::Validation(errors)) => errors,
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn sign_up_creates_user_and_profile() {
        let (service, users) = setup().await;

        let user = service
            .sign_up(sample("carmen", "carmen@example.com"))
            .await
            .unwrap();

        assert!(users.get_profile(&user.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn duplicate_username_blocks_sign_up() {
        let (service, _) = setup().await;

        service
            .sign_up(sample("carmen", "carmen@example.com"))
            .await
            .unwrap();

        let errors =
            expect_validation(service.sign_up(sample("carmen", "other@example.com")).await);
        assert_eq!(errors.form_errors().count(), 1);
    }

    #[tokio::test]
    async fn duplicate_email_blocks_sign_up() {
        let (service, _) = setup().await;

        service
            .sign_up(sample("carmen", "carmen@example.com"))
            .await
            .unwrap();

        let errors =
            expect_validation(service.sign_up(sample("other", "carmen@example.com")).await);
        assert_eq!(errors.form_errors().count(), 1);
    }

    #[tokio::test]
    async fn blank_sign_up_reports_every_missing_field() {
        let (service, _) = setup().await;

        let errors = expect_validation(
            service
                .sign_up(NewUser {
                    username: String::new(),
                    email: String::new(),
                    phone: String::new(),
                    department: String::new(),
                    password: String::new(),
                    security_answer_1: String::new(),
                    security_answer_2: String::new(),
                })
                .await,
        );

        assert_eq!(errors.field_errors().count(), 7);
    }

    #[tokio::test]
    async fn account_update_keeps_own_email_available() {
        let (service, _) = setup().await;

        let user = service
            .sign_up(sample("carmen", "carmen@example.com"))
            .await
            .unwrap();

        let updated = service
            .update_account(
                &user.id,
                AccountUpdate {
                    email: "carmen@example.com".to_string(),
                    phone: "699999999".to_string(),
                    department: "HR".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.phone, "699999999");
        assert_eq!(updated.department, "HR");
    }

    #[tokio::test]
    async fn account_update_rejects_taken_email() {
        let (service, _) = setup().await;

        service
            .sign_up(sample("carmen", "carmen@example.com"))
            .await
            .unwrap();
        let bob = service.sign_up(sample("bob", "bob@example.com")).await.unwrap();

        let errors = expect_validation(
            service
                .update_account(
                    &bob.id,
                    AccountUpdate {
                        email: "carmen@example.com".to_string(),
                        phone: "600000000".to_string(),
                        department: "IT".to_string(),
                    },
                )
                .await,
        );
        assert_eq!(errors.form_errors().count(), 1);
    }
}
