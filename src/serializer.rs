//! Rule-driven conversion of catalog entities into JSON objects.
//!
//! The output always holds an entity's scalar attributes. Relations are added
//! according to the rules passed by the caller and the current nesting depth:
//!
//! * depth 0: only relations named by an include rule;
//! * depth 1: to-one relations by default, collections only when named;
//! * depth [`MAX_DEPTH`]: scalars only.
//!
//! Capping the depth is what keeps back-references from looping: a restaurant
//! nested under one of its own `restaurant_pizzas` is written without relations.
//! An exclude rule (`-name`, or `-a.b` for a nested level) removes a relation
//! regardless of defaults or includes.

use crate::models::{Pizza, Restaurant, RestaurantPizza};
use serde_json::{Map, Number, Value};

pub const MAX_DEPTH: usize = 2;

pub enum Relation<'a> {
    One(Option<&'a dyn ToDict>),
    Many(Option<Vec<&'a dyn ToDict>>),
}

pub trait ToDict {
    fn fields(&self) -> Map<String, Value>;
    fn relations(&self) -> Vec<(&'static str, Relation<'_>)>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Rule {
    exclude: bool,
    path: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rules {
    rules: Vec<Rule>,
}

impl Rules {
    pub fn none() -> Self {
        Rules::default()
    }

    pub fn new(directives: &[&str]) -> Self {
        let rules = directives
            .iter()
            .filter_map(|directive| {
                let (exclude, path) = match directive.strip_prefix('-') {
                    Some(rest) => (true, rest),
                    None => (false, *directive),
                };
                let path: Vec<String> = path.split('.').filter(|s| !s.is_empty()).map(String::from).collect();
                (!path.is_empty()).then_some(Rule { exclude, path })
            })
            .collect();
        Rules { rules }
    }

    fn includes(&self, name: &str) -> bool {
        self.rules.iter().any(|r| !r.exclude && r.path[0] == name)
    }

    fn excludes(&self, name: &str) -> bool {
        self.rules.iter().any(|r| r.exclude && r.path.len() == 1 && r.path[0] == name)
    }

    /// Rules that apply inside relation `name`, with the leading segment removed.
    fn descend(&self, name: &str) -> Rules {
        let rules = self
            .rules
            .iter()
            .filter(|r| r.path.len() > 1 && r.path[0] == name)
            .map(|r| Rule {
                exclude: r.exclude,
                path: r.path[1..].to_vec(),
            })
            .collect();
        Rules { rules }
    }
}

pub fn to_dict(entity: &dyn ToDict, rules: &Rules) -> Value {
    Value::Object(serialize(entity, rules, 0))
}

pub fn to_dict_many<T: ToDict>(entities: &[T], rules: &Rules) -> Value {
    Value::Array(entities.iter().map(|e| to_dict(e, rules)).collect())
}

fn serialize(entity: &dyn ToDict, rules: &Rules, depth: usize) -> Map<String, Value> {
    let mut out = entity.fields();
    if depth >= MAX_DEPTH {
        return out;
    }
    for (name, relation) in entity.relations() {
        if rules.excludes(name) {
            continue;
        }
        let wanted = rules.includes(name)
            || (depth > 0 && matches!(relation, Relation::One(_)));
        if !wanted {
            continue;
        }
        let nested = rules.descend(name);
        match relation {
            Relation::One(Some(related)) => {
                out.insert(name.to_string(), Value::Object(serialize(related, &nested, depth + 1)));
            }
            Relation::Many(Some(related)) => {
                let items = related
                    .into_iter()
                    .map(|r| Value::Object(serialize(r, &nested, depth + 1)))
                    .collect();
                out.insert(name.to_string(), Value::Array(items));
            }
            Relation::One(None) | Relation::Many(None) => {}
        }
    }
    out
}

fn price_value(price: f64) -> Value {
    if price.fract() == 0.0 && price.abs() < 1e15 {
        Value::Number(Number::from(price as i64))
    } else {
        Number::from_f64(price).map(Value::Number).unwrap_or(Value::Null)
    }
}

fn many(items: &Option<Vec<RestaurantPizza>>) -> Relation<'_> {
    Relation::Many(items.as_ref().map(|v| v.iter().map(|i| i as &dyn ToDict).collect()))
}

impl ToDict for Restaurant {
    fn fields(&self) -> Map<String, Value> {
        let mut m = Map::new();
        m.insert("id".into(), self.id.into());
        m.insert("name".into(), self.name.clone().into());
        m.insert("address".into(), self.address.clone().into());
        m
    }

    fn relations(&self) -> Vec<(&'static str, Relation<'_>)> {
        vec![("restaurant_pizzas", many(&self.restaurant_pizzas))]
    }
}

impl ToDict for Pizza {
    fn fields(&self) -> Map<String, Value> {
        let mut m = Map::new();
        m.insert("id".into(), self.id.into());
        m.insert("name".into(), self.name.clone().into());
        m.insert("ingredients".into(), self.ingredients.clone().into());
        m
    }

    fn relations(&self) -> Vec<(&'static str, Relation<'_>)> {
        vec![("restaurant_pizzas", many(&self.restaurant_pizzas))]
    }
}

impl ToDict for RestaurantPizza {
    fn fields(&self) -> Map<String, Value> {
        let mut m = Map::new();
        m.insert("id".into(), self.id.into());
        m.insert("price".into(), price_value(self.price));
        m.insert("pizza_id".into(), self.pizza_id.into());
        m.insert("restaurant_id".into(), self.restaurant_id.into());
        m
    }

    fn relations(&self) -> Vec<(&'static str, Relation<'_>)> {
        vec![
            ("pizza", Relation::One(self.pizza.as_deref().map(|p| p as &dyn ToDict))),
            ("restaurant", Relation::One(self.restaurant.as_deref().map(|r| r as &dyn ToDict))),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn loaded_restaurant() -> Restaurant {
        let base = Restaurant::new(1, "Karen's Pizza Shack", "address1");
        let pizza = Pizza::new(2, "Emma", "Dough, Tomato Sauce, Cheese");
        let association = RestaurantPizza {
            id: 7,
            price: 12.5,
            pizza_id: 2,
            restaurant_id: 1,
            restaurant: Some(Box::new(base.clone())),
            pizza: Some(Box::new(pizza)),
        };
        Restaurant {
            restaurant_pizzas: Some(vec![association]),
            ..base
        }
    }

    #[test]
    fn default_rules_emit_scalars_only() {
        let value = to_dict(&loaded_restaurant(), &Rules::none());
        assert_eq!(value, json!({"id": 1, "name": "Karen's Pizza Shack", "address": "address1"}));
    }

    #[test]
    fn included_collection_expands_siblings_one_level() {
        let value = to_dict(&loaded_restaurant(), &Rules::new(&["restaurant_pizzas"]));
        let item = &value["restaurant_pizzas"][0];
        assert_eq!(item["price"], json!(12.5));
        assert_eq!(item["pizza"]["id"], json!(2));
        assert_eq!(item["restaurant"]["id"], json!(1));
        // no cycle back through the parent
        assert!(item["restaurant"].get("restaurant_pizzas").is_none());
        assert!(item["pizza"].get("restaurant_pizzas").is_none());
    }

    #[test]
    fn exclusion_wins_over_include() {
        let rules = Rules::new(&["restaurant_pizzas", "-restaurant_pizzas"]);
        let value = to_dict(&loaded_restaurant(), &rules);
        assert!(value.get("restaurant_pizzas").is_none());
    }

    #[test]
    fn nested_exclusion_drops_one_sibling() {
        let rules = Rules::new(&["restaurant_pizzas", "-restaurant_pizzas.restaurant"]);
        let value = to_dict(&loaded_restaurant(), &rules);
        let item = &value["restaurant_pizzas"][0];
        assert!(item.get("restaurant").is_none());
        assert_eq!(item["pizza"]["name"], json!("Emma"));
    }

    #[test]
    fn explicit_to_one_rules_at_top_level() {
        let rp = loaded_restaurant().restaurant_pizzas.unwrap().remove(0);
        assert!(to_dict(&rp, &Rules::none()).get("pizza").is_none());
        let value = to_dict(&rp, &Rules::new(&["restaurant", "pizza"]));
        assert_eq!(value["restaurant"]["name"], json!("Karen's Pizza Shack"));
        assert_eq!(value["pizza"]["ingredients"], json!("Dough, Tomato Sauce, Cheese"));
    }

    #[test]
    fn unloaded_relations_are_omitted() {
        let pizza = Pizza::new(3, "Geri", "Dough");
        let value = to_dict(&pizza, &Rules::new(&["restaurant_pizzas"]));
        assert_eq!(value, json!({"id": 3, "name": "Geri", "ingredients": "Dough"}));
    }

    #[test]
    fn whole_prices_serialize_as_integers() {
        assert_eq!(price_value(12.0), json!(12));
        assert_eq!(price_value(9.99), json!(9.99));
    }

    #[test]
    fn blank_directives_are_ignored() {
        assert_eq!(Rules::new(&["", "-"]), Rules::none());
    }
}
