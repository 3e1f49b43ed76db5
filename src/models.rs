//! Catalog entities and the write payload for restaurant_pizzas.

use crate::error::AppError;
use serde_json::Value;
use std::ops::RangeInclusive;

/// Allowed price for a restaurant_pizza row, inclusive. Mirrors the table's CHECK constraint.
pub const PRICE_RANGE: RangeInclusive<f64> = 1.0..=30.0;

#[derive(Debug, Clone, PartialEq, Default, sqlx::FromRow)]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    pub address: String,
    #[sqlx(skip)]
    pub restaurant_pizzas: Option<Vec<RestaurantPizza>>,
}

#[derive(Debug, Clone, PartialEq, Default, sqlx::FromRow)]
pub struct Pizza {
    pub id: i64,
    pub name: String,
    pub ingredients: String,
    #[sqlx(skip)]
    pub restaurant_pizzas: Option<Vec<RestaurantPizza>>,
}

#[derive(Debug, Clone, PartialEq, Default, sqlx::FromRow)]
pub struct RestaurantPizza {
    pub id: i64,
    pub price: f64,
    pub pizza_id: i64,
    pub restaurant_id: i64,
    #[sqlx(skip)]
    pub restaurant: Option<Box<Restaurant>>,
    #[sqlx(skip)]
    pub pizza: Option<Box<Pizza>>,
}

impl Restaurant {
    pub fn new(id: i64, name: impl Into<String>, address: impl Into<String>) -> Self {
        Restaurant {
            id,
            name: name.into(),
            address: address.into(),
            restaurant_pizzas: None,
        }
    }
}

impl Pizza {
    pub fn new(id: i64, name: impl Into<String>, ingredients: impl Into<String>) -> Self {
        Pizza {
            id,
            name: name.into(),
            ingredients: ingredients.into(),
            restaurant_pizzas: None,
        }
    }
}

/// Validated body of `POST /restaurant_pizzas`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewRestaurantPizza {
    pub price: f64,
    pub pizza_id: i64,
    pub restaurant_id: i64,
}

impl NewRestaurantPizza {
    /// Presence and type checks on the raw JSON body, then the price bound.
    pub fn from_body(body: &Value) -> Result<Self, AppError> {
        let obj = body
            .as_object()
            .ok_or_else(|| AppError::validation("body must be a JSON object"))?;
        let field = |name: &str| obj.get(name).filter(|v| !v.is_null());

        let (Some(price), Some(pizza_id), Some(restaurant_id)) =
            (field("price"), field("pizza_id"), field("restaurant_id"))
        else {
            return Err(AppError::validation("price, pizza_id and restaurant_id are required"));
        };

        let price = price
            .as_f64()
            .ok_or_else(|| AppError::validation("price must be a number"))?;
        let pizza_id = pizza_id
            .as_i64()
            .ok_or_else(|| AppError::validation("pizza_id must be an integer"))?;
        let restaurant_id = restaurant_id
            .as_i64()
            .ok_or_else(|| AppError::validation("restaurant_id must be an integer"))?;

        let new = NewRestaurantPizza {
            price,
            pizza_id,
            restaurant_id,
        };
        new.validate()?;
        Ok(new)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if !self.price.is_finite() || !PRICE_RANGE.contains(&self.price) {
            return Err(AppError::validation(format!(
                "price must be between {} and {}",
                PRICE_RANGE.start(),
                PRICE_RANGE.end()
            )));
        }
        Ok(())
    }
}
