use thiserror::Error;

/// Internal error type for store and service operations
///
/// Not exposed via the API directly - endpoints convert to `ApiError`.
#[derive(Error, Debug)]
pub enum InternalError {
    #[error("database error during {operation}: {source}")]
    Database {
        operation: String,
        #[source]
        source: sea_orm::DbErr,
    },

    #[error("{entity} {id} not found")]
    EntityNotFound { entity: &'static str, id: String },

    /// Deletion blocked because events still reference the row.
    #[error("{entity} {id} is referenced by {count} event(s) and cannot be deleted")]
    ProtectedReference {
        entity: &'static str,
        id: String,
        count: u64,
    },

    #[error("{operation} failed: {message}")]
    Crypto {
        operation: &'static str,
        message: String,
    },
}

impl InternalError {
    pub fn database(operation: &str, source: sea_orm::DbErr) -> Self {
        InternalError::Database {
            operation: operation.to_string(),
            source,
        }
    }

    pub fn entity_not_found(entity: &'static str, id: impl ToString) -> Self {
        InternalError::EntityNotFound {
            entity,
            id: id.to_string(),
        }
    }
}
