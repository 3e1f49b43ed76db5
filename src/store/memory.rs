//! In-process store with the same key, foreign-key and cascade rules as the Postgres schema.

use super::{demo_catalog, CatalogStore};
use crate::error::AppError;
use crate::models::{NewRestaurantPizza, Pizza, Restaurant, RestaurantPizza};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Tables {
    restaurants: BTreeMap<i64, Restaurant>,
    pizzas: BTreeMap<i64, Pizza>,
    restaurant_pizzas: BTreeMap<i64, RestaurantPizza>,
    next_restaurant_id: i64,
    next_pizza_id: i64,
    next_restaurant_pizza_id: i64,
}

impl Tables {
    fn insert_restaurant(&mut self, name: &str, address: &str) -> i64 {
        self.next_restaurant_id += 1;
        let id = self.next_restaurant_id;
        self.restaurants.insert(id, Restaurant::new(id, name, address));
        id
    }

    fn insert_pizza(&mut self, name: &str, ingredients: &str) -> i64 {
        self.next_pizza_id += 1;
        let id = self.next_pizza_id;
        self.pizzas.insert(id, Pizza::new(id, name, ingredients));
        id
    }

    fn insert_restaurant_pizza(&mut self, new: NewRestaurantPizza) -> Result<RestaurantPizza, AppError> {
        new.validate()?;
        let restaurant = self
            .restaurants
            .get(&new.restaurant_id)
            .ok_or_else(|| AppError::validation(format!("restaurant {} does not exist", new.restaurant_id)))?;
        let pizza = self
            .pizzas
            .get(&new.pizza_id)
            .ok_or_else(|| AppError::validation(format!("pizza {} does not exist", new.pizza_id)))?;
        let loaded = RestaurantPizza {
            id: self.next_restaurant_pizza_id + 1,
            price: new.price,
            pizza_id: new.pizza_id,
            restaurant_id: new.restaurant_id,
            restaurant: Some(Box::new(restaurant.clone())),
            pizza: Some(Box::new(pizza.clone())),
        };
        self.next_restaurant_pizza_id += 1;
        let row = RestaurantPizza {
            restaurant: None,
            pizza: None,
            ..loaded.clone()
        };
        self.restaurant_pizzas.insert(row.id, row);
        Ok(loaded)
    }
}

/// Cloning shares the underlying tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_restaurant(&self, name: &str, address: &str) -> Result<i64, AppError> {
        Ok(self.write()?.insert_restaurant(name, address))
    }

    pub fn insert_pizza(&self, name: &str, ingredients: &str) -> Result<i64, AppError> {
        Ok(self.write()?.insert_pizza(name, ingredients))
    }

    /// Number of association rows, for assertions about cascades and rejected writes.
    pub fn restaurant_pizza_count(&self) -> Result<usize, AppError> {
        Ok(self.read()?.restaurant_pizzas.len())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, AppError> {
        self.tables
            .read()
            .map_err(|_| AppError::Internal("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, AppError> {
        self.tables
            .write()
            .map_err(|_| AppError::Internal("memory store lock poisoned".into()))
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        self.read().map(|_| ())
    }

    async fn list_restaurants(&self) -> Result<Vec<Restaurant>, AppError> {
        Ok(self.read()?.restaurants.values().cloned().collect())
    }

    async fn find_restaurant(&self, id: i64) -> Result<Option<Restaurant>, AppError> {
        let tables = self.read()?;
        let Some(restaurant) = tables.restaurants.get(&id) else {
            return Ok(None);
        };
        let associations = tables
            .restaurant_pizzas
            .values()
            .filter(|rp| rp.restaurant_id == id)
            .map(|rp| RestaurantPizza {
                restaurant: Some(Box::new(restaurant.clone())),
                pizza: tables.pizzas.get(&rp.pizza_id).cloned().map(Box::new),
                ..rp.clone()
            })
            .collect();
        Ok(Some(Restaurant {
            restaurant_pizzas: Some(associations),
            ..restaurant.clone()
        }))
    }

    async fn delete_restaurant(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.write()?;
        if tables.restaurants.remove(&id).is_none() {
            return Ok(false);
        }
        tables.restaurant_pizzas.retain(|_, rp| rp.restaurant_id != id);
        Ok(true)
    }

    async fn list_pizzas(&self) -> Result<Vec<Pizza>, AppError> {
        Ok(self.read()?.pizzas.values().cloned().collect())
    }

    async fn most_expensive_pizzas(&self, limit: u32) -> Result<Vec<Pizza>, AppError> {
        let tables = self.read()?;
        let mut best: BTreeMap<i64, f64> = BTreeMap::new();
        for rp in tables.restaurant_pizzas.values() {
            let entry = best.entry(rp.pizza_id).or_insert(rp.price);
            if rp.price > *entry {
                *entry = rp.price;
            }
        }
        let mut ranked: Vec<(i64, f64)> = best.into_iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        Ok(ranked
            .into_iter()
            .filter_map(|(pizza_id, _)| tables.pizzas.get(&pizza_id).cloned())
            .take(limit as usize)
            .collect())
    }

    async fn restaurants_serving_pizza(&self, pizza_id: i64) -> Result<Vec<Restaurant>, AppError> {
        let tables = self.read()?;
        let ids: BTreeSet<i64> = tables
            .restaurant_pizzas
            .values()
            .filter(|rp| rp.pizza_id == pizza_id)
            .map(|rp| rp.restaurant_id)
            .collect();
        Ok(ids.iter().filter_map(|id| tables.restaurants.get(id).cloned()).collect())
    }

    async fn pizzas_at_restaurant(&self, restaurant_id: i64) -> Result<Vec<Pizza>, AppError> {
        let tables = self.read()?;
        let ids: BTreeSet<i64> = tables
            .restaurant_pizzas
            .values()
            .filter(|rp| rp.restaurant_id == restaurant_id)
            .map(|rp| rp.pizza_id)
            .collect();
        Ok(ids.iter().filter_map(|id| tables.pizzas.get(id).cloned()).collect())
    }

    async fn create_restaurant_pizza(&self, new: NewRestaurantPizza) -> Result<RestaurantPizza, AppError> {
        self.write()?.insert_restaurant_pizza(new)
    }

    async fn seed(&self) -> Result<bool, AppError> {
        let mut tables = self.write()?;
        if !tables.restaurants.is_empty() {
            return Ok(false);
        }
        let demo = demo_catalog();
        let restaurant_ids: Vec<i64> = demo
            .restaurants
            .iter()
            .map(|(name, address)| tables.insert_restaurant(name, address))
            .collect();
        let pizza_ids: Vec<i64> = demo
            .pizzas
            .iter()
            .map(|(name, ingredients)| tables.insert_pizza(name, ingredients))
            .collect();
        for &(price, pizza, restaurant) in demo.restaurant_pizzas {
            tables.insert_restaurant_pizza(NewRestaurantPizza {
                price,
                pizza_id: pizza_ids[pizza],
                restaurant_id: restaurant_ids[restaurant],
            })?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        assert!(store.seed().await.unwrap());
        store
    }

    #[tokio::test]
    async fn seed_only_fills_an_empty_store() {
        let store = seeded().await;
        assert!(!store.seed().await.unwrap());
        assert_eq!(store.list_restaurants().await.unwrap().len(), 3);
        assert_eq!(store.list_pizzas().await.unwrap().len(), 3);
        assert_eq!(store.restaurant_pizza_count().unwrap(), 4);
    }

    #[tokio::test]
    async fn find_restaurant_loads_associations() {
        let store = seeded().await;
        let restaurant = store.find_restaurant(1).await.unwrap().unwrap();
        let associations = restaurant.restaurant_pizzas.unwrap();
        assert_eq!(associations.len(), 2);
        for rp in &associations {
            assert_eq!(rp.restaurant_id, 1);
            assert_eq!(rp.restaurant.as_ref().unwrap().id, 1);
            assert_eq!(rp.pizza.as_ref().unwrap().id, rp.pizza_id);
        }
        assert!(store.find_restaurant(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_cascades_only_to_own_associations() {
        let store = seeded().await;
        assert!(store.delete_restaurant(1).await.unwrap());
        assert!(!store.delete_restaurant(1).await.unwrap());
        assert_eq!(store.restaurant_pizza_count().unwrap(), 2);
        assert_eq!(store.list_pizzas().await.unwrap().len(), 3);
        assert_eq!(store.list_restaurants().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn most_expensive_ranks_by_highest_price_once_per_pizza() {
        let store = seeded().await;
        let names: Vec<String> = store
            .most_expensive_pizzas(3)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Geri", "Melanie", "Emma"]);
        assert_eq!(store.most_expensive_pizzas(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn most_expensive_breaks_ties_by_pizza_id() {
        let store = MemoryStore::new();
        let r = store.insert_restaurant("R", "a").unwrap();
        let first = store.insert_pizza("First", "x").unwrap();
        let second = store.insert_pizza("Second", "y").unwrap();
        for pizza_id in [second, first] {
            store
                .create_restaurant_pizza(NewRestaurantPizza { price: 10.0, pizza_id, restaurant_id: r })
                .await
                .unwrap();
        }
        let ids: Vec<i64> = store.most_expensive_pizzas(3).await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[tokio::test]
    async fn joins_return_distinct_entities() {
        let store = seeded().await;
        store
            .create_restaurant_pizza(NewRestaurantPizza { price: 3.0, pizza_id: 2, restaurant_id: 1 })
            .await
            .unwrap();
        let at_first: Vec<i64> = store.pizzas_at_restaurant(1).await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(at_first, vec![1, 2]);
        let serving_geri: Vec<i64> = store.restaurants_serving_pizza(2).await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(serving_geri, vec![1, 2]);
        assert!(store.restaurants_serving_pizza(42).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_enforces_foreign_keys_and_price() {
        let store = seeded().await;
        let before = store.restaurant_pizza_count().unwrap();
        for new in [
            NewRestaurantPizza { price: 5.0, pizza_id: 99, restaurant_id: 1 },
            NewRestaurantPizza { price: 5.0, pizza_id: 1, restaurant_id: 99 },
            NewRestaurantPizza { price: 999.0, pizza_id: 1, restaurant_id: 1 },
        ] {
            assert!(matches!(store.create_restaurant_pizza(new).await, Err(AppError::Validation(_))));
        }
        assert_eq!(store.restaurant_pizza_count().unwrap(), before);

        let created = store
            .create_restaurant_pizza(NewRestaurantPizza { price: 12.0, pizza_id: 1, restaurant_id: 3 })
            .await
            .unwrap();
        assert_eq!(created.id, 5);
        assert_eq!(created.restaurant.unwrap().id, 3);
        assert_eq!(created.pizza.unwrap().id, 1);
    }
}
