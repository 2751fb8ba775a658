//! Benchmark utilities and helpers.

use std::sync::Arc;

use flint_sql::{DataType, Field, Row, Schema, Table, Value};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Schema of the generated `users` table: `(id, name, age, city)`.
pub fn users_schema() -> Schema {
    Schema::new(vec![
        Field::not_null("id", DataType::Int),
        Field::nullable("name", DataType::Text),
        Field::nullable("age", DataType::Int),
        Field::nullable("city", DataType::Int),
    ])
}

/// Generates a `users` table with `count` random rows.
pub fn generate_users(count: usize) -> Table {
    let mut rng = StdRng::seed_from_u64(42);
    let names = [
        "Alice", "Bob", "Charlie", "Diana", "Eve", "Frank", "Grace", "Henry",
    ];

    let rows = (0..count as i32)
        .map(|id| {
            let name = format!(
                "{}_{}",
                names[rng.gen_range(0..names.len())],
                rng.gen_range(0..10000)
            );
            Row::new(vec![
                Value::Int(id + 1),
                Value::String(name),
                Value::Int(rng.gen_range(18..80)),
                Value::Int(rng.gen_range(0..64)),
            ])
        })
        .collect();
    Table::new(Arc::new(users_schema()), rows)
}

/// Schema of the generated `cities` table: `(city, population)`.
pub fn cities_schema() -> Schema {
    Schema::new(vec![
        Field::not_null("city", DataType::Int),
        Field::nullable("population", DataType::BigInt),
    ])
}

/// Generates a `cities` table with one row per city id used by `users`.
pub fn generate_cities() -> Table {
    let mut rng = StdRng::seed_from_u64(7);
    let rows = (0..64)
        .map(|city| {
            Row::new(vec![
                Value::Int(city),
                Value::BigInt(rng.gen_range(1_000..10_000_000)),
            ])
        })
        .collect();
    Table::new(Arc::new(cities_schema()), rows)
}
