use poem_openapi::Object;

/// Submitted employee fields. The department is referenced by free-text name
/// and resolved against existing departments.
#[derive(Object, Debug)]
pub struct EmployeeRequest {
    /// First name
    pub first_name: String,

    /// Last name(s)
    pub last_name: String,

    /// Department name (resolved case-insensitively)
    pub department_name: String,

    /// Phone number
    pub phone: String,

    /// Email address
    pub email: String,

    /// Free-text notes
    pub notes: Option<String>,
}

/// An employee as returned by the API
#[derive(Object, Debug)]
pub struct EmployeeResponse {
    /// Row id
    pub id: i32,

    /// First name
    pub first_name: String,

    /// Last name(s)
    pub last_name: String,

    /// Department id
    pub department_id: i32,

    /// Department name
    pub department_name: String,

    /// Phone number
    pub phone: String,

    /// Email address
    pub email: String,

    /// Free-text notes
    pub notes: Option<String>,
}
