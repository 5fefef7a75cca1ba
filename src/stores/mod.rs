// Stores layer - Data access and repository pattern
pub mod department_store;
pub mod employee_store;
pub mod event_store;
pub mod message_store;
pub mod module_store;
pub mod place_store;
pub mod reset_session_store;
pub mod user_store;

pub use department_store::DepartmentStore;
pub use employee_store::{EmployeeData, EmployeeStore};
pub use event_store::{EventData, EventDetail, EventFilters, EventStore};
pub use message_store::MessageStore;
pub use module_store::ModuleStore;
pub use place_store::PlaceStore;
pub use reset_session_store::ResetSessionStore;
pub use user_store::{AccountUpdate, NewUser, UserStore};

use sea_orm::sea_query::{Expr, Func, IntoColumnRef, SimpleExpr};

/// Case-insensitive exact match on a text column (`lower(col) = lower(value)`).
/// The submitted value is trimmed first; surrounding whitespace is never
/// significant in a name lookup.
pub(crate) fn eq_ci(col: impl IntoColumnRef, value: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(col))).eq(value.trim().to_lowercase())
}

/// Case-insensitive substring match on a text column.
pub(crate) fn contains_ci(col: impl IntoColumnRef, value: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(col))).like(format!("%{}%", value.trim().to_lowercase()))
}
