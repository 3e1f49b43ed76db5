//! Demo rows written when `SEED_DATA` is enabled on an empty store.

pub struct DemoCatalog {
    /// (name, address)
    pub restaurants: &'static [(&'static str, &'static str)],
    /// (name, ingredients)
    pub pizzas: &'static [(&'static str, &'static str)],
    /// (price, pizza index, restaurant index), indexes into the slices above.
    pub restaurant_pizzas: &'static [(f64, usize, usize)],
}

pub fn demo_catalog() -> DemoCatalog {
    DemoCatalog {
        restaurants: &[
            ("Karen's Pizza Shack", "address1"),
            ("Sanjay's Pizza", "address2"),
            ("Kiki's Pizza", "address3"),
        ],
        pizzas: &[
            ("Emma", "Dough, Tomato Sauce, Cheese"),
            ("Geri", "Dough, Tomato Sauce, Cheese, Pepperoni"),
            ("Melanie", "Dough, Sauce, Ricotta, Red peppers, Mustard"),
        ],
        restaurant_pizzas: &[(1.0, 0, 0), (4.0, 1, 1), (5.0, 2, 2), (8.0, 1, 0)],
    }
}
