use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::services::TokenService;
use crate::stores::{
    DepartmentStore, EmployeeStore, EventStore, MessageStore, ModuleStore, PlaceStore,
    ResetSessionStore, UserStore,
};

/// Centralized application data following the main-owned stores pattern.
///
/// All stores are created once in main and shared across the API handlers,
/// so there is exactly one instance of each per process.
pub struct AppData {
    pub db: DatabaseConnection,
    pub departments: Arc<DepartmentStore>,
    pub employees: Arc<EmployeeStore>,
    pub places: Arc<PlaceStore>,
    pub modules: Arc<ModuleStore>,
    pub events: Arc<EventStore>,
    pub users: Arc<UserStore>,
    pub reset_sessions: Arc<ResetSessionStore>,
    pub messages: Arc<MessageStore>,
    pub tokens: Arc<TokenService>,
}

impl AppData {
    /// Initialize all application data. The database should be connected and
    /// migrated before calling this.
    pub fn init(db: DatabaseConnection, config: &AppConfig) -> Self {
        tracing::debug!("Creating stores...");

        let tokens = Arc::new(TokenService::new(
            config.jwt_secret.clone(),
            config.reset_token_secret.clone(),
        ));

        let data = Self {
            departments: Arc::new(DepartmentStore::new(db.clone())),
            employees: Arc::new(EmployeeStore::new(db.clone())),
            places: Arc::new(PlaceStore::new(db.clone())),
            modules: Arc::new(ModuleStore::new(db.clone())),
            events: Arc::new(EventStore::new(db.clone())),
            users: Arc::new(UserStore::new(db.clone(), config.password_pepper.clone())),
            reset_sessions: Arc::new(ResetSessionStore::new(db.clone())),
            messages: Arc::new(MessageStore::new(db.clone())),
            tokens,
            db,
        };

        tracing::info!("AppData initialization complete");
        data
    }
}
