use poem_openapi::Object;

/// Request model for sending an internal message
#[derive(Object, Debug)]
pub struct SendMessageRequest {
    /// Username of the recipient (resolved case-insensitively)
    pub recipient_username: String,

    /// Subject line
    pub subject: String,

    /// Message body
    pub body: String,
}

/// An internal message as returned by the API
#[derive(Object, Debug)]
pub struct MessageView {
    /// Row id
    pub id: i32,

    /// Sender user id
    pub sender_id: String,

    /// Recipient user id
    pub recipient_id: String,

    /// Subject line
    pub subject: String,

    /// Message body
    pub body: String,

    /// Unix timestamp of the send instant
    pub sent_at: i64,

    /// Whether the recipient has read the message
    pub is_read: bool,
}
