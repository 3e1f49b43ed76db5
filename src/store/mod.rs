//! Persistence interface for the catalog and its two backends.

mod memory;
mod postgres;
mod seed;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use seed::{demo_catalog, DemoCatalog};

use crate::error::AppError;
use crate::models::{NewRestaurantPizza, Pizza, Restaurant, RestaurantPizza};
use async_trait::async_trait;

/// Storage operations used by the HTTP handlers. Each call is one statement or one transaction.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Cheap round trip used by `GET /ready`.
    async fn ping(&self) -> Result<(), AppError>;

    /// All restaurants ordered by id, relations not loaded.
    async fn list_restaurants(&self) -> Result<Vec<Restaurant>, AppError>;

    /// One restaurant with `restaurant_pizzas` loaded; every association carries its pizza and restaurant.
    async fn find_restaurant(&self, id: i64) -> Result<Option<Restaurant>, AppError>;

    /// Delete a restaurant and, by cascade, its associations.
    /// Returns false when no restaurant had that id.
    async fn delete_restaurant(&self, id: i64) -> Result<bool, AppError>;

    /// All pizzas ordered by id, relations not loaded.
    async fn list_pizzas(&self) -> Result<Vec<Pizza>, AppError>;

    /// Pizzas ranked by their highest association price, descending, ties by pizza id.
    /// Each pizza appears at most once.
    async fn most_expensive_pizzas(&self, limit: u32) -> Result<Vec<Pizza>, AppError>;

    /// Distinct restaurants with at least one association to `pizza_id`, ordered by id.
    async fn restaurants_serving_pizza(&self, pizza_id: i64) -> Result<Vec<Restaurant>, AppError>;

    /// Distinct pizzas with at least one association to `restaurant_id`, ordered by id.
    async fn pizzas_at_restaurant(&self, restaurant_id: i64) -> Result<Vec<Pizza>, AppError>;

    /// Insert an association. The returned row has `restaurant` and `pizza` loaded.
    async fn create_restaurant_pizza(&self, new: NewRestaurantPizza) -> Result<RestaurantPizza, AppError>;

    /// Insert the demo catalog if there are no restaurants yet. Returns whether rows were written.
    async fn seed(&self) -> Result<bool, AppError>;
}
