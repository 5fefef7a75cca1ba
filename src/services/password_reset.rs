use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use crate::errors::InternalError;
use crate::services::token_service::TokenService;
use crate::stores::{ResetSessionStore, UserStore};
use crate::types::db::reset_session;

// The two recovery questions are fixed; accounts store only the answers.
pub const SECURITY_QUESTION_1: &str = "What is the name of your first pet?";
pub const SECURITY_QUESTION_2: &str = "What is the name of your maternal grandmother?";

/// Position in the password-recovery flow.
///
/// `AwaitingUsername` is the entry state before any session exists; the
/// remaining three are persisted with the session. Transitions only move
/// forward; a failed second answer destroys the session instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetState {
    AwaitingUsername,
    AwaitingQuestion1,
    AwaitingQuestion2,
    AwaitingNewPassword,
}

impl ResetState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResetState::AwaitingUsername => "awaiting_username",
            ResetState::AwaitingQuestion1 => "awaiting_question_1",
            ResetState::AwaitingQuestion2 => "awaiting_question_2",
            ResetState::AwaitingNewPassword => "awaiting_new_password",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "awaiting_username" => Some(ResetState::AwaitingUsername),
            "awaiting_question_1" => Some(ResetState::AwaitingQuestion1),
            "awaiting_question_2" => Some(ResetState::AwaitingQuestion2),
            "awaiting_new_password" => Some(ResetState::AwaitingNewPassword),
            _ => None,
        }
    }
}

/// What answering a security question led to
#[derive(Debug, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Identity verified; a new password may now be set
    Verified,
    /// First answer was wrong; one more attempt with the second question
    SecondChance { question: &'static str },
}

#[derive(Debug, Error)]
pub enum ResetError {
    #[error("the user does not exist")]
    UnknownUser,

    #[error("unknown or expired recovery token")]
    InvalidToken,

    #[error("identity could not be verified, contact an administrator")]
    VerificationFailed,

    #[error("this step is not available in the current recovery state")]
    WrongState,

    #[error("a new password is required")]
    PasswordRequired,

    #[error(transparent)]
    Internal(#[from] InternalError),
}

/// Drives the three-step password recovery: identify the account, verify a
/// security answer, set a new password. All progress lives server-side in a
/// token-keyed session with an explicit expiry.
pub struct PasswordResetService {
    users: Arc<UserStore>,
    sessions: Arc<ResetSessionStore>,
    tokens: Arc<TokenService>,
    session_ttl_minutes: i64,
}

impl PasswordResetService {
    pub fn new(
        users: Arc<UserStore>,
        sessions: Arc<ResetSessionStore>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            users,
            sessions,
            tokens,
            session_ttl_minutes: 30,
        }
    }

    /// Step 1: identify the account. Returns the recovery token and the
    /// first question. Any earlier session of the same user is discarded.
    pub async fn start(&self, username: &str) -> Result<(String, &'static str), ResetError> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(ResetError::UnknownUser)?;

        let token = self.tokens.generate_opaque_token();
        let token_hash = self.tokens.hash_opaque_token(&token);
        let expires_at = Utc::now().timestamp() + self.session_ttl_minutes * 60;

        self.sessions
            .create(
                token_hash,
                &user.id,
                ResetState::AwaitingQuestion1.as_str(),
                expires_at,
            )
            .await?;

        Ok((token, SECURITY_QUESTION_1))
    }

    /// Step 2: verify a security answer.
    ///
    /// A wrong first answer moves on to the second question; a wrong second
    /// answer destroys the session and fails the recovery for good.
    pub async fn answer(&self, token: &str, answer: &str) -> Result<AnswerOutcome, ResetError> {
        let session = self.load_live_session(token).await?;

        let user = self
            .users
            .find_by_id(&session.user_id)
            .await?
            .ok_or(ResetError::InvalidToken)?;

        let state = ResetState::parse(&session.state).ok_or(ResetError::InvalidToken)?;
        let answer = answer.trim();

        match state {
            ResetState::AwaitingQuestion1 => {
                if answer == user.security_answer_1 {
                    self.sessions
                        .set_state(session.id, ResetState::AwaitingNewPassword.as_str())
                        .await?;
                    Ok(AnswerOutcome::Verified)
                } else {
                    self.sessions
                        .set_state(session.id, ResetState::AwaitingQuestion2.as_str())
                        .await?;
                    Ok(AnswerOutcome::SecondChance {
                        question: SECURITY_QUESTION_2,
                    })
                }
            }
            ResetState::AwaitingQuestion2 => {
                if answer == user.security_answer_2 {
                    self.sessions
                        .set_state(session.id, ResetState::AwaitingNewPassword.as_str())
                        .await?;
                    Ok(AnswerOutcome::Verified)
                } else {
                    self.sessions.delete(session.id).await?;
                    Err(ResetError::VerificationFailed)
                }
            }
            _ => Err(ResetError::WrongState),
        }
    }

    /// Step 3: set the new password. Only reachable once an answer was
    /// verified; the session is consumed on success.
    pub async fn confirm(&self, token: &str, new_password: &str) -> Result<(), ResetError> {
        let session = self.load_live_session(token).await?;

        let state = ResetState::parse(&session.state).ok_or(ResetError::InvalidToken)?;
        if state != ResetState::AwaitingNewPassword {
            return Err(ResetError::WrongState);
        }

        if new_password.trim().is_empty() {
            return Err(ResetError::PasswordRequired);
        }

        self.users.set_password(&session.user_id, new_password).await?;
        self.sessions.delete(session.id).await?;

        Ok(())
    }

    /// Look the session up by token; expired sessions are removed on sight
    /// and reported as invalid.
    async fn load_live_session(&self, token: &str) -> Result<reset_session::Model, ResetError> {
        let token_hash = self.tokens.hash_opaque_token(token);

        let session = self
            .sessions
            .find_by_token_hash(&token_hash)
            .await?
            .ok_or(ResetError::InvalidToken)?;

        if session.expires_at < Utc::now().timestamp() {
            self.sessions.delete(session.id).await?;
            return Err(ResetError::InvalidToken);
        }

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::user_store::NewUser;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    struct Fixture {
        service: PasswordResetService,
        users: Arc<UserStore>,
        sessions: Arc<ResetSessionStore>,
        tokens: Arc<TokenService>,
    }

    async fn setup() -> Fixture {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        let users = Arc::new(UserStore::new(db.clone(), "test-pepper".to_string()));
        users
            .create_with_profile(NewUser {
                username: "carmen".to_string(),
                email: "carmen@example.com".to_string(),
                phone: "600000000".to_string(),
                department: "IT".to_string(),
                password: "oldpassword".to_string(),
                security_answer_1: "rex".to_string(),
                security_answer_2: "maria".to_string(),
            })
            .await
            .unwrap();

        let sessions = Arc::new(ResetSessionStore::new(db));
        let tokens = Arc::new(TokenService::new(
            "jwt-test-secret".to_string(),
            "reset-test-secret".to_string(),
        ));

        Fixture {
            service: PasswordResetService::new(users.clone(), sessions.clone(), tokens.clone()),
            users,
            sessions,
            tokens,
        }
    }

    #[tokio::test]
    async fn unknown_username_cannot_start_recovery() {
        let fx = setup().await;
        assert!(matches!(
            fx.service.start("ghost").await,
            Err(ResetError::UnknownUser)
        ));
    }

    #[tokio::test]
    async fn correct_first_answer_leads_straight_to_new_password() {
        let fx = setup().await;

        let (token, question) = fx.service.start("carmen").await.unwrap();
        assert_eq!(question, SECURITY_QUESTION_1);

        let outcome = fx.service.answer(&token, "rex").await.unwrap();
        assert_eq!(outcome, AnswerOutcome::Verified);

        fx.service.confirm(&token, "brandnewpassword").await.unwrap();

        assert!(fx
            .users
            .verify_credentials("carmen", "brandnewpassword")
            .await
            .unwrap()
            .is_some());
        assert!(fx
            .users
            .verify_credentials("carmen", "oldpassword")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn wrong_first_answer_offers_the_second_question() {
        let fx = setup().await;

        let (token, _) = fx.service.start("carmen").await.unwrap();

        let outcome = fx.service.answer(&token, "wrong").await.unwrap();
        assert_eq!(
            outcome,
            AnswerOutcome::SecondChance {
                question: SECURITY_QUESTION_2
            }
        );

        // second answer is checked against the second question now
        let outcome = fx.service.answer(&token, "maria").await.unwrap();
        assert_eq!(outcome, AnswerOutcome::Verified);
    }

    #[tokio::test]
    async fn wrong_second_answer_destroys_the_session() {
        let fx = setup().await;

        let (token, _) = fx.service.start("carmen").await.unwrap();
        fx.service.answer(&token, "wrong").await.unwrap();

        assert!(matches!(
            fx.service.answer(&token, "also wrong").await,
            Err(ResetError::VerificationFailed)
        ));

        // the token is dead afterwards
        assert!(matches!(
            fx.service.answer(&token, "maria").await,
            Err(ResetError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn confirm_requires_a_verified_session() {
        let fx = setup().await;

        let (token, _) = fx.service.start("carmen").await.unwrap();

        // still awaiting the first answer
        assert!(matches!(
            fx.service.confirm(&token, "newpassword").await,
            Err(ResetError::WrongState)
        ));
    }

    #[tokio::test]
    async fn confirm_consumes_the_session() {
        let fx = setup().await;

        let (token, _) = fx.service.start("carmen").await.unwrap();
        fx.service.answer(&token, "rex").await.unwrap();
        fx.service.confirm(&token, "brandnewpassword").await.unwrap();

        assert!(matches!(
            fx.service.confirm(&token, "again").await,
            Err(ResetError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn empty_new_password_is_rejected() {
        let fx = setup().await;

        let (token, _) = fx.service.start("carmen").await.unwrap();
        fx.service.answer(&token, "rex").await.unwrap();

        assert!(matches!(
            fx.service.confirm(&token, "   ").await,
            Err(ResetError::PasswordRequired)
        ));
    }

    #[tokio::test]
    async fn expired_session_is_rejected_at_every_step() {
        let fx = setup().await;

        let user = fx.users.find_by_username("carmen").await.unwrap().unwrap();
        let token = fx.tokens.generate_opaque_token();
        let token_hash = fx.tokens.hash_opaque_token(&token);

        // already expired an hour ago
        fx.sessions
            .create(
                token_hash,
                &user.id,
                ResetState::AwaitingQuestion1.as_str(),
                Utc::now().timestamp() - 3600,
            )
            .await
            .unwrap();

        assert!(matches!(
            fx.service.answer(&token, "rex").await,
            Err(ResetError::InvalidToken)
        ));
        assert!(matches!(
            fx.service.confirm(&token, "newpassword").await,
            Err(ResetError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn starting_again_invalidates_the_previous_token() {
        let fx = setup().await;

        let (first_token, _) = fx.service.start("carmen").await.unwrap();
        let (_second_token, _) = fx.service.start("carmen").await.unwrap();

        assert!(matches!(
            fx.service.answer(&first_token, "rex").await,
            Err(ResetError::InvalidToken)
        ));
    }
}
