use std::sync::Arc;

use poem_openapi::{param::Path, payload::Json, OpenApi, Tags};

use crate::api::{authenticate, BearerAuth};
use crate::errors::{ApiError, SubmissionError};
use crate::services::{Resolution, TokenService};
use crate::stores::{MessageStore, UserStore};
use crate::types::db::message;
use crate::types::dto::message::{MessageView, SendMessageRequest};

/// Internal messaging endpoints
pub struct MessagesApi {
    messages: Arc<MessageStore>,
    users: Arc<UserStore>,
    tokens: Arc<TokenService>,
}

/// API tags for messaging endpoints
#[derive(Tags)]
enum MessageTags {
    /// Internal messages between users
    Messages,
}

impl MessagesApi {
    pub fn new(
        messages: Arc<MessageStore>,
        users: Arc<UserStore>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            messages,
            users,
            tokens,
        }
    }

    fn to_view(message: message::Model) -> MessageView {
        MessageView {
            id: message.id,
            sender_id: message.sender_id,
            recipient_id: message.recipient_id,
            subject: message.subject,
            body: message.body,
            sent_at: message.sent_at,
            is_read: message.is_read,
        }
    }
}

#[OpenApi(prefix_path = "/messages")]
impl MessagesApi {
    /// Send a message; the recipient is referenced by username
    #[oai(path = "/", method = "post", tag = "MessageTags::Messages")]
    async fn send(
        &self,
        auth: BearerAuth,
        body: Json<SendMessageRequest>,
    ) -> Result<Json<MessageView>, ApiError> {
        let claims = authenticate(&self.tokens, &auth)?;

        let matches = self.users.find_by_username_ci(&body.recipient_username).await?;
        let recipient = Resolution::from_matches(matches)
            .into_field_result("user", &body.recipient_username)
            .map_err(|e| SubmissionError::field("recipient_username", e))?;

        let sent = self
            .messages
            .send(&claims.sub, &recipient.id, &body.subject, &body.body)
            .await?;

        Ok(Json(Self::to_view(sent)))
    }

    /// The authenticated user's inbox, newest first
    #[oai(path = "/inbox", method = "get", tag = "MessageTags::Messages")]
    async fn inbox(&self, auth: BearerAuth) -> Result<Json<Vec<MessageView>>, ApiError> {
        let claims = authenticate(&self.tokens, &auth)?;

        let rows = self.messages.inbox(&claims.sub).await?;
        Ok(Json(rows.into_iter().map(Self::to_view).collect()))
    }

    /// Mark a received message as read
    #[oai(path = "/:id/read", method = "post", tag = "MessageTags::Messages")]
    async fn mark_read(
        &self,
        auth: BearerAuth,
        id: Path<i32>,
    ) -> Result<Json<MessageView>, ApiError> {
        let claims = authenticate(&self.tokens, &auth)?;

        let message = self
            .messages
            .get(id.0)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("message {} not found", id.0)))?;

        if message.recipient_id != claims.sub {
            return Err(ApiError::forbidden("only the recipient may mark a message read"));
        }

        let updated = self.messages.mark_read(message.id).await?;
        Ok(Json(Self::to_view(updated)))
    }
}
