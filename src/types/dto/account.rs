use poem_openapi::Object;

/// Request model for account registration
#[derive(Object, Debug)]
pub struct SignUpRequest {
    /// Username (unique)
    pub username: String,

    /// Email address (unique)
    pub email: String,

    /// Phone number
    pub phone: String,

    /// Department name (free text)
    pub department: String,

    /// Password
    pub password: String,

    /// Answer to the first security question
    pub security_answer_1: String,

    /// Answer to the second security question
    pub security_answer_2: String,
}

/// Response model for account registration
#[derive(Object, Debug)]
pub struct SignUpResponse {
    /// Id of the created user
    pub user_id: String,

    /// Username of the created user
    pub username: String,
}

/// Request model for user login
#[derive(Object, Debug)]
pub struct LoginRequest {
    /// Username for authentication
    pub username: String,

    /// Password for authentication
    pub password: String,
}

/// Response model containing the authentication token
#[derive(Object, Debug)]
pub struct TokenResponse {
    /// JWT access token for API authentication
    pub access_token: String,

    /// Token type (always "Bearer")
    pub token_type: String,

    /// Number of seconds until the access token expires
    pub expires_in: i64,
}

/// Response model for whoami endpoint
#[derive(Object, Debug)]
pub struct WhoAmIResponse {
    /// User id
    pub user_id: String,

    /// Username
    pub username: String,

    /// Token expiration time (Unix timestamp)
    pub expires_at: i64,
}

/// Request model for account detail updates
#[derive(Object, Debug)]
pub struct AccountUpdateRequest {
    /// Email address (unique across users)
    pub email: String,

    /// Phone number
    pub phone: String,

    /// Department name (free text)
    pub department: String,
}

/// Request model for profile updates
#[derive(Object, Debug)]
pub struct ProfileUpdateRequest {
    /// Stored path of the avatar image
    pub avatar_path: Option<String>,

    /// Short biography
    pub bio: Option<String>,
}

/// Response model for the profile endpoints
#[derive(Object, Debug)]
pub struct ProfileResponse {
    /// Owning user id
    pub user_id: String,

    /// Stored path of the avatar image
    pub avatar_path: Option<String>,

    /// Short biography
    pub bio: Option<String>,
}

/// Request model for starting password recovery
#[derive(Object, Debug)]
pub struct ResetStartRequest {
    /// Username of the account to recover
    pub username: String,
}

/// Response model for starting password recovery
#[derive(Object, Debug)]
pub struct ResetStartResponse {
    /// Opaque recovery token; required by the follow-up steps
    pub token: String,

    /// The security question to answer next
    pub question: String,
}

/// Request model for answering a security question
#[derive(Object, Debug)]
pub struct ResetAnswerRequest {
    /// Recovery token from the start step
    pub token: String,

    /// Answer to the question currently posed
    pub answer: String,
}

/// Response model for answering a security question
#[derive(Object, Debug)]
pub struct ResetAnswerResponse {
    /// Whether identity is verified and a new password may be set
    pub verified: bool,

    /// Next security question, present when another attempt is allowed
    pub question: Option<String>,
}

/// Request model for completing password recovery
#[derive(Object, Debug)]
pub struct ResetConfirmRequest {
    /// Recovery token from the start step
    pub token: String,

    /// New password
    pub new_password: String,
}
