// Database entities (sea-orm)
pub mod department;
pub mod employee;
pub mod event;
pub mod event_module;
pub mod message;
pub mod module;
pub mod place;
pub mod profile;
pub mod reset_session;
pub mod user;
