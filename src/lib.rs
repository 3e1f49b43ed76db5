//! Pizza catalog: REST backend for restaurants, pizzas and the prices that join them.

pub mod config;
pub mod error;
pub mod handlers;
pub mod migration;
pub mod models;
pub mod response;
pub mod routes;
pub mod serializer;
pub mod state;
pub mod store;

pub use config::Settings;
pub use error::{AppError, ConfigError};
pub use migration::{apply_migrations, ensure_database_exists};
pub use routes::{app, catalog_routes, common_routes};
pub use state::AppState;
pub use store::{CatalogStore, MemoryStore, PgStore};
