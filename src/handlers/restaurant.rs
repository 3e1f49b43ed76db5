//! Restaurant handlers: list, read with associations, delete, and pizza-based lookups.

use super::path_id;
use crate::error::AppError;
use crate::response::ok;
use crate::serializer::{to_dict, to_dict_many, Rules};
use crate::state::AppState;
use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
};

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let restaurants = state.store.list_restaurants().await?;
    Ok(ok(to_dict_many(&restaurants, &Rules::none())))
}

pub async fn read(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = path_id(path, AppError::restaurant_not_found)?;
    let restaurant = state
        .store
        .find_restaurant(id)
        .await?
        .ok_or_else(AppError::restaurant_not_found)?;
    Ok(ok(to_dict(&restaurant, &Rules::new(&["restaurant_pizzas"]))))
}

pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = path_id(path, AppError::restaurant_not_found)?;
    if !state.store.delete_restaurant(id).await? {
        return Err(AppError::restaurant_not_found());
    }
    tracing::info!(restaurant_id = id, "restaurant deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Restaurants with at least one association to the pizza in the path.
pub async fn serving_pizza(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let pizza_id = path_id(path, AppError::pizza_not_found)?;
    let restaurants = state.store.restaurants_serving_pizza(pizza_id).await?;
    Ok(ok(to_dict_many(&restaurants, &Rules::none())))
}
