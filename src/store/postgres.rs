//! Catalog storage on PostgreSQL. Tables are created by [`crate::migration::apply_migrations`].

use super::{demo_catalog, CatalogStore};
use crate::error::AppError;
use crate::models::{NewRestaurantPizza, Pizza, Restaurant, RestaurantPizza};
use async_trait::async_trait;
use sqlx::PgPool;

const SELECT_RESTAURANTS: &str = "SELECT id, name, address FROM restaurants ORDER BY id";
const SELECT_RESTAURANT: &str = "SELECT id, name, address FROM restaurants WHERE id = $1";
const SELECT_PIZZAS: &str = "SELECT id, name, ingredients FROM pizzas ORDER BY id";
const SELECT_PIZZA: &str = "SELECT id, name, ingredients FROM pizzas WHERE id = $1";

const SELECT_RESTAURANT_ASSOCIATIONS: &str = r#"
    SELECT rp.id, rp.price, rp.pizza_id, rp.restaurant_id,
           p.name AS pizza_name, p.ingredients AS pizza_ingredients
    FROM restaurant_pizzas rp
    JOIN pizzas p ON p.id = rp.pizza_id
    WHERE rp.restaurant_id = $1
    ORDER BY rp.id
"#;

const SELECT_MOST_EXPENSIVE: &str = r#"
    SELECT p.id, p.name, p.ingredients
    FROM pizzas p
    JOIN (
        SELECT pizza_id, MAX(price) AS top_price
        FROM restaurant_pizzas
        GROUP BY pizza_id
    ) ranked ON ranked.pizza_id = p.id
    ORDER BY ranked.top_price DESC, p.id ASC
    LIMIT $1
"#;

const SELECT_RESTAURANTS_SERVING: &str = r#"
    SELECT r.id, r.name, r.address
    FROM restaurants r
    WHERE EXISTS (
        SELECT 1 FROM restaurant_pizzas rp
        WHERE rp.restaurant_id = r.id AND rp.pizza_id = $1
    )
    ORDER BY r.id
"#;

const SELECT_PIZZAS_AT: &str = r#"
    SELECT p.id, p.name, p.ingredients
    FROM pizzas p
    WHERE EXISTS (
        SELECT 1 FROM restaurant_pizzas rp
        WHERE rp.pizza_id = p.id AND rp.restaurant_id = $1
    )
    ORDER BY p.id
"#;

const INSERT_RESTAURANT_PIZZA: &str = r#"
    INSERT INTO restaurant_pizzas (price, pizza_id, restaurant_id)
    VALUES ($1, $2, $3)
    RETURNING id, price, pizza_id, restaurant_id
"#;

const DELETE_RESTAURANT: &str = "DELETE FROM restaurants WHERE id = $1";

#[derive(sqlx::FromRow)]
struct AssociationRow {
    id: i64,
    price: f64,
    pizza_id: i64,
    restaurant_id: i64,
    pizza_name: String,
    pizza_ingredients: String,
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Constraint violations on insert are the caller's fault; anything else stays unexpected.
fn classify_write_error(err: sqlx::Error) -> AppError {
    let err = AppError::Db(err);
    if err.is_constraint_violation() {
        AppError::validation(err.to_string())
    } else {
        err
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_restaurants(&self) -> Result<Vec<Restaurant>, AppError> {
        tracing::debug!(sql = SELECT_RESTAURANTS, "query");
        let rows = sqlx::query_as::<_, Restaurant>(SELECT_RESTAURANTS)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_restaurant(&self, id: i64) -> Result<Option<Restaurant>, AppError> {
        tracing::debug!(sql = SELECT_RESTAURANT, id, "query");
        let mut tx = self.pool.begin().await?;
        let Some(restaurant) = sqlx::query_as::<_, Restaurant>(SELECT_RESTAURANT)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        tracing::debug!(sql = SELECT_RESTAURANT_ASSOCIATIONS, id, "query");
        let rows = sqlx::query_as::<_, AssociationRow>(SELECT_RESTAURANT_ASSOCIATIONS)
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;
        tx.commit().await?;

        let associations = rows
            .into_iter()
            .map(|row| RestaurantPizza {
                id: row.id,
                price: row.price,
                pizza_id: row.pizza_id,
                restaurant_id: row.restaurant_id,
                restaurant: Some(Box::new(restaurant.clone())),
                pizza: Some(Box::new(Pizza::new(row.pizza_id, row.pizza_name, row.pizza_ingredients))),
            })
            .collect();
        Ok(Some(Restaurant {
            restaurant_pizzas: Some(associations),
            ..restaurant
        }))
    }

    async fn delete_restaurant(&self, id: i64) -> Result<bool, AppError> {
        tracing::debug!(sql = DELETE_RESTAURANT, id, "query");
        let result = sqlx::query(DELETE_RESTAURANT).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_pizzas(&self) -> Result<Vec<Pizza>, AppError> {
        tracing::debug!(sql = SELECT_PIZZAS, "query");
        let rows = sqlx::query_as::<_, Pizza>(SELECT_PIZZAS).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn most_expensive_pizzas(&self, limit: u32) -> Result<Vec<Pizza>, AppError> {
        tracing::debug!(sql = SELECT_MOST_EXPENSIVE, limit, "query");
        let rows = sqlx::query_as::<_, Pizza>(SELECT_MOST_EXPENSIVE)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn restaurants_serving_pizza(&self, pizza_id: i64) -> Result<Vec<Restaurant>, AppError> {
        tracing::debug!(sql = SELECT_RESTAURANTS_SERVING, pizza_id, "query");
        let rows = sqlx::query_as::<_, Restaurant>(SELECT_RESTAURANTS_SERVING)
            .bind(pizza_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn pizzas_at_restaurant(&self, restaurant_id: i64) -> Result<Vec<Pizza>, AppError> {
        tracing::debug!(sql = SELECT_PIZZAS_AT, restaurant_id, "query");
        let rows = sqlx::query_as::<_, Pizza>(SELECT_PIZZAS_AT)
            .bind(restaurant_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn create_restaurant_pizza(&self, new: NewRestaurantPizza) -> Result<RestaurantPizza, AppError> {
        new.validate()?;
        tracing::debug!(sql = INSERT_RESTAURANT_PIZZA, params = ?new, "query (tx)");
        let mut tx = self.pool.begin().await?;
        let mut row = sqlx::query_as::<_, RestaurantPizza>(INSERT_RESTAURANT_PIZZA)
            .bind(new.price)
            .bind(new.pizza_id)
            .bind(new.restaurant_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(classify_write_error)?;
        let restaurant = sqlx::query_as::<_, Restaurant>(SELECT_RESTAURANT)
            .bind(row.restaurant_id)
            .fetch_one(&mut *tx)
            .await?;
        let pizza = sqlx::query_as::<_, Pizza>(SELECT_PIZZA)
            .bind(row.pizza_id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        row.restaurant = Some(Box::new(restaurant));
        row.pizza = Some(Box::new(pizza));
        Ok(row)
    }

    async fn seed(&self) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;
        let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM restaurants")
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            return Ok(false);
        }

        let demo = demo_catalog();
        let mut restaurant_ids = Vec::with_capacity(demo.restaurants.len());
        for &(name, address) in demo.restaurants {
            let (id,): (i64,) = sqlx::query_as("INSERT INTO restaurants (name, address) VALUES ($1, $2) RETURNING id")
                .bind(name)
                .bind(address)
                .fetch_one(&mut *tx)
                .await?;
            restaurant_ids.push(id);
        }
        let mut pizza_ids = Vec::with_capacity(demo.pizzas.len());
        for &(name, ingredients) in demo.pizzas {
            let (id,): (i64,) = sqlx::query_as("INSERT INTO pizzas (name, ingredients) VALUES ($1, $2) RETURNING id")
                .bind(name)
                .bind(ingredients)
                .fetch_one(&mut *tx)
                .await?;
            pizza_ids.push(id);
        }
        for &(price, pizza, restaurant) in demo.restaurant_pizzas {
            sqlx::query("INSERT INTO restaurant_pizzas (price, pizza_id, restaurant_id) VALUES ($1, $2, $3)")
                .bind(price)
                .bind(pizza_ids[pizza])
                .bind(restaurant_ids[restaurant])
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::apply_migrations;
    use sqlx::postgres::PgPoolOptions;

    #[test]
    fn non_constraint_write_errors_stay_unexpected() {
        for err in [sqlx::Error::PoolTimedOut, sqlx::Error::RowNotFound, sqlx::Error::PoolClosed] {
            match classify_write_error(err) {
                AppError::Db(_) => {}
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    async fn insert_owner_rows(pool: &PgPool) -> (i64, i64) {
        let (restaurant_id,): (i64,) =
            sqlx::query_as("INSERT INTO restaurants (name, address) VALUES ('Store Test', 'nowhere') RETURNING id")
                .fetch_one(pool)
                .await
                .unwrap();
        let (pizza_id,): (i64,) =
            sqlx::query_as("INSERT INTO pizzas (name, ingredients) VALUES ('Store Test', 'Dough') RETURNING id")
                .fetch_one(pool)
                .await
                .unwrap();
        (restaurant_id, pizza_id)
    }

    async fn association_count(pool: &PgPool, restaurant_id: i64) -> i64 {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM restaurant_pizzas WHERE restaurant_id = $1")
            .bind(restaurant_id)
            .fetch_one(pool)
            .await
            .unwrap();
        count
    }

    /// Needs a reachable database: `TEST_DATABASE_URL=postgres://... cargo test -- --ignored`.
    #[tokio::test]
    #[ignore]
    async fn writes_against_postgres() {
        let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
            return;
        };
        let pool = PgPoolOptions::new().max_connections(2).connect(&url).await.unwrap();
        apply_migrations(&pool).await.unwrap();
        let store = PgStore::new(pool.clone());
        let (restaurant_id, pizza_id) = insert_owner_rows(&pool).await;

        let missing_pizza = NewRestaurantPizza {
            price: 5.0,
            pizza_id: i64::MAX,
            restaurant_id,
        };
        match store.create_restaurant_pizza(missing_pizza).await {
            Err(AppError::Validation(_)) => {}
            other => panic!("foreign key violation not classified: {other:?}"),
        }

        let out_of_range = sqlx::query("INSERT INTO restaurant_pizzas (price, pizza_id, restaurant_id) VALUES ($1, $2, $3)")
            .bind(999.0_f64)
            .bind(pizza_id)
            .bind(restaurant_id)
            .execute(&pool)
            .await
            .map_err(classify_write_error);
        match out_of_range {
            Err(AppError::Validation(_)) => {}
            other => panic!("check violation not classified: {other:?}"),
        }
        assert_eq!(association_count(&pool, restaurant_id).await, 0);

        let created = store
            .create_restaurant_pizza(NewRestaurantPizza {
                price: 12.0,
                pizza_id,
                restaurant_id,
            })
            .await
            .unwrap();
        assert_eq!(created.restaurant.as_ref().map(|r| r.id), Some(restaurant_id));
        assert_eq!(created.pizza.as_ref().map(|p| p.name.as_str()), Some("Store Test"));

        let loaded = store.find_restaurant(restaurant_id).await.unwrap().unwrap();
        assert_eq!(loaded.restaurant_pizzas.map(|rps| rps.len()), Some(1));
        let serving: Vec<i64> = store.restaurants_serving_pizza(pizza_id).await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(serving, vec![restaurant_id]);

        assert!(store.delete_restaurant(restaurant_id).await.unwrap());
        assert_eq!(association_count(&pool, restaurant_id).await, 0);
        assert!(!store.delete_restaurant(restaurant_id).await.unwrap());
        sqlx::query("DELETE FROM pizzas WHERE id = $1").bind(pizza_id).execute(&pool).await.unwrap();
    }
}
