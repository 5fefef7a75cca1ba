// API layer - HTTP endpoints
pub mod accounts;
pub mod directory;
pub mod employees;
pub mod events;
pub mod health;
pub mod messages;

pub use accounts::AccountsApi;
pub use directory::DirectoryApi;
pub use employees::EmployeesApi;
pub use events::EventsApi;
pub use health::HealthApi;
pub use messages::MessagesApi;

use poem_openapi::{auth::Bearer, SecurityScheme};

use crate::errors::ApiError;
use crate::services::token_service::{Claims, TokenError};
use crate::services::TokenService;

/// JWT Bearer token authentication
#[derive(SecurityScheme)]
#[oai(
    ty = "bearer",
    key_name = "Authorization",
    key_in = "header",
    bearer_format = "JWT"
)]
pub struct BearerAuth(pub Bearer);

/// Validate the bearer token and return its claims
pub(crate) fn authenticate(tokens: &TokenService, auth: &BearerAuth) -> Result<Claims, ApiError> {
    tokens.validate_jwt(&auth.0.token).map_err(|e| match e {
        TokenError::Expired => ApiError::unauthorized("token has expired"),
        TokenError::Invalid | TokenError::Generation(_) => {
            ApiError::unauthorized("invalid or malformed token")
        }
    })
}
