use poem_openapi::Object;

/// Response model for health check endpoint
#[derive(Object, Debug)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,

    /// Timestamp of the health check (ISO 8601 format)
    pub timestamp: String,
}

/// Standardized error response model
#[derive(Object, Debug)]
pub struct ErrorResponse {
    /// Error type or category
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code
    pub status_code: u16,
}

/// One rejected input: either tied to a field or to the form as a whole
#[derive(Object, Debug)]
pub struct FieldViolation {
    /// Originating field, absent for form-level errors
    pub field: Option<String>,

    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,
}

/// Validation failure payload: every independently-detectable error of the
/// submission in one round trip
#[derive(Object, Debug)]
pub struct ValidationProblem {
    /// Summary message
    pub message: String,

    /// Field-keyed and form-keyed errors
    pub errors: Vec<FieldViolation>,
}

/// Generic acknowledgement
#[derive(Object, Debug)]
pub struct MessageResponse {
    /// Success message
    pub message: String,
}
