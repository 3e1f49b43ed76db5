//! Association writes.

use crate::error::AppError;
use crate::models::NewRestaurantPizza;
use crate::response::created;
use crate::serializer::{to_dict, Rules};
use crate::state::AppState;
use axum::{extract::rejection::JsonRejection, extract::State, response::IntoResponse, Json};
use serde_json::Value;

/// Every failure on this route, including unexpected ones, answers 400 with the generic envelope.
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let inner = async {
        let Json(body) = body.map_err(|rejection| AppError::validation(rejection.body_text()))?;
        let new = NewRestaurantPizza::from_body(&body)?;
        let row = state.store.create_restaurant_pizza(new).await?;
        tracing::info!(id = row.id, restaurant_id = row.restaurant_id, pizza_id = row.pizza_id, "restaurant_pizza created");
        Ok::<_, AppError>(created(to_dict(&row, &Rules::new(&["restaurant", "pizza"]))))
    };
    inner.await.map_err(AppError::into_validation)
}
