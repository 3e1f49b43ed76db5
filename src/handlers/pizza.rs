//! Pizza handlers.

use super::path_id;
use crate::error::AppError;
use crate::response::ok;
use crate::serializer::{to_dict_many, Rules};
use crate::state::AppState;
use axum::{
    extract::{rejection::PathRejection, Path, State},
    response::IntoResponse,
};

pub const MOST_EXPENSIVE_LIMIT: u32 = 3;

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let pizzas = state.store.list_pizzas().await?;
    Ok(ok(to_dict_many(&pizzas, &Rules::new(&["-restaurant_pizzas"]))))
}

pub async fn most_expensive(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let pizzas = state.store.most_expensive_pizzas(MOST_EXPENSIVE_LIMIT).await?;
    Ok(ok(to_dict_many(&pizzas, &Rules::none())))
}

pub async fn at_restaurant(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let restaurant_id = path_id(path, AppError::restaurant_not_found)?;
    let pizzas = state.store.pizzas_at_restaurant(restaurant_id).await?;
    Ok(ok(to_dict_many(&pizzas, &Rules::none())))
}
