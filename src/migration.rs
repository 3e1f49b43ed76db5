//! Catalog DDL for PostgreSQL. Every statement is idempotent, so this runs on each start.

use crate::error::AppError;
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::str::FromStr;

const CATALOG_DDL: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS restaurants (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        address TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS pizzas (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        ingredients TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS restaurant_pizzas (
        id BIGSERIAL PRIMARY KEY,
        price DOUBLE PRECISION NOT NULL,
        pizza_id BIGINT NOT NULL REFERENCES pizzas (id) ON DELETE CASCADE,
        restaurant_id BIGINT NOT NULL REFERENCES restaurants (id) ON DELETE CASCADE,
        CONSTRAINT restaurant_pizzas_price_range CHECK (price >= 1 AND price <= 30)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS restaurant_pizzas_restaurant_id_idx ON restaurant_pizzas (restaurant_id)",
    "CREATE INDEX IF NOT EXISTS restaurant_pizzas_pizza_id_idx ON restaurant_pizzas (pizza_id)",
];

/// Create the restaurants, pizzas and restaurant_pizzas tables if they do not exist.
pub async fn apply_migrations(pool: &PgPool) -> Result<(), AppError> {
    for ddl in CATALOG_DDL {
        tracing::debug!(sql = %ddl.trim(), "migration");
        sqlx::query(ddl).execute(pool).await?;
    }
    tracing::info!(statements = CATALOG_DDL.len(), "catalog schema ready");
    Ok(())
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = split_database_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::Internal(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// Split a connection URL into (URL of the `postgres` admin database, target database name).
fn split_database_url(url: &str) -> Result<(String, String), AppError> {
    let scheme_end = url.find("://").map(|i| i + 3).unwrap_or(0);
    let path_start = url[scheme_end..]
        .find('/')
        .map(|i| scheme_end + i + 1)
        .ok_or_else(|| AppError::Internal("DATABASE_URL: no database path".into()))?;
    let (base, rest) = url.split_at(path_start);
    let (db_name, query) = match rest.split_once('?') {
        Some((name, query)) => (name, Some(query)),
        None => (rest, None),
    };
    let admin_url = match query {
        Some(q) => format!("{}postgres?{}", base, q),
        None => format!("{}postgres", base),
    };
    Ok((admin_url, db_name.trim().to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
