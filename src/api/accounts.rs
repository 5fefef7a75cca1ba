use std::sync::Arc;

use poem_openapi::{payload::Json, OpenApi, Tags};

use crate::api::{authenticate, BearerAuth};
use crate::errors::{ApiError, SubmissionError, ValidationError};
use crate::services::{
    AccountService, AnswerOutcome, PasswordResetService, ResetError, TokenService,
};
use crate::stores::{AccountUpdate, NewUser, UserStore};
use crate::types::dto::account::{
    AccountUpdateRequest, LoginRequest, ProfileResponse, ProfileUpdateRequest,
    ResetAnswerRequest, ResetAnswerResponse, ResetConfirmRequest, ResetStartRequest,
    ResetStartResponse, SignUpRequest, SignUpResponse, TokenResponse, WhoAmIResponse,
};
use crate::types::dto::common::MessageResponse;

/// Account endpoints: registration, login, profile and password recovery
pub struct AccountsApi {
    accounts: AccountService,
    users: Arc<UserStore>,
    reset: PasswordResetService,
    tokens: Arc<TokenService>,
}

/// API tags for account endpoints
#[derive(Tags)]
enum AccountTags {
    /// Registration and authentication
    Accounts,
    /// Password recovery via security questions
    PasswordRecovery,
}

impl AccountsApi {
    pub fn new(
        accounts: AccountService,
        users: Arc<UserStore>,
        reset: PasswordResetService,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            accounts,
            users,
            reset,
            tokens,
        }
    }

    fn map_reset_error(err: ResetError) -> ApiError {
        match err {
            ResetError::UnknownUser => ApiError::not_found("the user does not exist"),
            ResetError::InvalidToken => ApiError::unauthorized("unknown or expired recovery token"),
            ResetError::VerificationFailed => {
                ApiError::unauthorized("identity could not be verified, contact an administrator")
            }
            ResetError::WrongState => {
                ApiError::conflict("this step is not available in the current recovery state")
            }
            ResetError::PasswordRequired => {
                SubmissionError::field("new_password", ValidationError::Required).into()
            }
            ResetError::Internal(err) => err.into(),
        }
    }
}

#[OpenApi(prefix_path = "/auth")]
impl AccountsApi {
    /// Register a new account; the profile row is created with it
    #[oai(path = "/signup", method = "post", tag = "AccountTags::Accounts")]
    async fn sign_up(&self, body: Json<SignUpRequest>) -> Result<Json<SignUpResponse>, ApiError> {
        let created = self
            .accounts
            .sign_up(NewUser {
                username: body.0.username,
                email: body.0.email,
                phone: body.0.phone,
                department: body.0.department,
                password: body.0.password,
                security_answer_1: body.0.security_answer_1,
                security_answer_2: body.0.security_answer_2,
            })
            .await?;

        Ok(Json(SignUpResponse {
            user_id: created.id,
            username: created.username,
        }))
    }

    /// Login with username and password to receive an access token
    #[oai(path = "/login", method = "post", tag = "AccountTags::Accounts")]
    async fn login(&self, body: Json<LoginRequest>) -> Result<Json<TokenResponse>, ApiError> {
        let user = self
            .users
            .verify_credentials(&body.username, &body.password)
            .await?
            .ok_or_else(|| ApiError::unauthorized("invalid username or password"))?;

        let access_token = self
            .tokens
            .generate_jwt(&user.id)
            .map_err(|e| ApiError::internal(e.to_string()))?;

        Ok(Json(TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.tokens.access_token_ttl_seconds(),
        }))
    }

    /// Verify the access token and return user information
    #[oai(path = "/whoami", method = "get", tag = "AccountTags::Accounts")]
    async fn whoami(&self, auth: BearerAuth) -> Result<Json<WhoAmIResponse>, ApiError> {
        let claims = authenticate(&self.tokens, &auth)?;

        let user = self
            .users
            .find_by_id(&claims.sub)
            .await?
            .ok_or_else(|| ApiError::unauthorized("account no longer exists"))?;

        Ok(Json(WhoAmIResponse {
            user_id: user.id,
            username: user.username,
            expires_at: claims.exp,
        }))
    }

    /// Update the authenticated user's account details
    #[oai(path = "/account", method = "put", tag = "AccountTags::Accounts")]
    async fn update_account(
        &self,
        auth: BearerAuth,
        body: Json<AccountUpdateRequest>,
    ) -> Result<Json<MessageResponse>, ApiError> {
        let claims = authenticate(&self.tokens, &auth)?;

        self.accounts
            .update_account(
                &claims.sub,
                AccountUpdate {
                    email: body.0.email,
                    phone: body.0.phone,
                    department: body.0.department,
                },
            )
            .await?;

        Ok(Json(MessageResponse {
            message: "account updated".to_string(),
        }))
    }

    /// Fetch the authenticated user's profile
    #[oai(path = "/profile", method = "get", tag = "AccountTags::Accounts")]
    async fn get_profile(&self, auth: BearerAuth) -> Result<Json<ProfileResponse>, ApiError> {
        let claims = authenticate(&self.tokens, &auth)?;

        let profile = self
            .users
            .get_profile(&claims.sub)
            .await?
            .ok_or_else(|| ApiError::not_found("profile not found"))?;

        Ok(Json(ProfileResponse {
            user_id: profile.user_id,
            avatar_path: profile.avatar_path,
            bio: profile.bio,
        }))
    }

    /// Update the authenticated user's profile
    #[oai(path = "/profile", method = "put", tag = "AccountTags::Accounts")]
    async fn update_profile(
        &self,
        auth: BearerAuth,
        body: Json<ProfileUpdateRequest>,
    ) -> Result<Json<ProfileResponse>, ApiError> {
        let claims = authenticate(&self.tokens, &auth)?;

        let profile = self
            .users
            .update_profile(&claims.sub, body.0.avatar_path, body.0.bio)
            .await?;

        Ok(Json(ProfileResponse {
            user_id: profile.user_id,
            avatar_path: profile.avatar_path,
            bio: profile.bio,
        }))
    }

    /// Step 1 of password recovery: identify the account and receive the
    /// recovery token plus the first security question
    #[oai(
        path = "/password-reset/start",
        method = "post",
        tag = "AccountTags::PasswordRecovery"
    )]
    async fn reset_start(
        &self,
        body: Json<ResetStartRequest>,
    ) -> Result<Json<ResetStartResponse>, ApiError> {
        let (token, question) = self
            .reset
            .start(&body.username)
            .await
            .map_err(|err| match err {
                ResetError::UnknownUser => SubmissionError::field(
                    "username",
                    ValidationError::NotFound {
                        entity: "user",
                        name: body.username.clone(),
                    },
                )
                .into(),
                other => Self::map_reset_error(other),
            })?;

        Ok(Json(ResetStartResponse {
            token,
            question: question.to_string(),
        }))
    }

    /// Step 2: answer the security question currently posed. A wrong first
    /// answer yields the second question; a wrong second answer ends the
    /// recovery.
    #[oai(
        path = "/password-reset/answer",
        method = "post",
        tag = "AccountTags::PasswordRecovery"
    )]
    async fn reset_answer(
        &self,
        body: Json<ResetAnswerRequest>,
    ) -> Result<Json<ResetAnswerResponse>, ApiError> {
        let outcome = self
            .reset
            .answer(&body.token, &body.answer)
            .await
            .map_err(Self::map_reset_error)?;

        Ok(Json(match outcome {
            AnswerOutcome::Verified => ResetAnswerResponse {
                verified: true,
                question: None,
            },
            AnswerOutcome::SecondChance { question } => ResetAnswerResponse {
                verified: false,
                question: Some(question.to_string()),
            },
        }))
    }

    /// Step 3: set the new password and consume the recovery session
    #[oai(
        path = "/password-reset/confirm",
        method = "post",
        tag = "AccountTags::PasswordRecovery"
    )]
    async fn reset_confirm(
        &self,
        body: Json<ResetConfirmRequest>,
    ) -> Result<Json<MessageResponse>, ApiError> {
        self.reset
            .confirm(&body.token, &body.new_password)
            .await
            .map_err(Self::map_reset_error)?;

        Ok(Json(MessageResponse {
            message: "your password has been reset, you can log in now".to_string(),
        }))
    }
}
