//! Catalog routes.
//! `/restaurants/:id/restaurants` takes a pizza id; the segment shares the `:id` name with its siblings
//! because the router requires one parameter name per position.

use crate::handlers::{index, pizza, restaurant, restaurant_pizza};
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};

pub fn catalog_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/restaurants", get(restaurant::list))
        .route("/restaurants/:id", get(restaurant::read).delete(restaurant::delete))
        .route("/restaurants/:id/restaurants", get(restaurant::serving_pizza))
        .route("/restaurants/:id/pizzas", get(pizza::at_restaurant))
        .route("/pizzas", get(pizza::list))
        .route("/pizzas/most_expensive", get(pizza::most_expensive))
        .route("/restaurant_pizzas", post(restaurant_pizza::create))
        .with_state(state)
}
