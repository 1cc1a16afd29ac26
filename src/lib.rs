pub mod error;
pub mod models;
pub mod openapi;
pub mod repo;
pub mod response;
pub mod routes;
pub mod validate;

// Re-export commonly used items for tests / external users
pub use routes::{config, AppState};
