use poem_openapi::Object;

/// Request model for creating a named reference row (department, place or
/// module)
#[derive(Object, Debug)]
pub struct CreateNamedRequest {
    /// Display name
    pub name: String,
}

/// A department, place or module as returned by the API
#[derive(Object, Debug)]
pub struct NamedResponse {
    /// Row id
    pub id: i32,

    /// Display name
    pub name: String,
}
