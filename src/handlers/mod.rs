//! HTTP handlers for the catalog routes.

pub mod pizza;
pub mod restaurant;
pub mod restaurant_pizza;

use crate::error::AppError;
use axum::extract::{rejection::PathRejection, Path};
use axum::response::Html;

pub async fn index() -> Html<&'static str> {
    Html("<h1>Code challenge</h1>")
}

/// Integer id from the path. A segment that is not an i64 names no entity, so it answers `not_found`.
fn path_id(path: Result<Path<i64>, PathRejection>, not_found: fn() -> AppError) -> Result<i64, AppError> {
    match path {
        Ok(Path(id)) => Ok(id),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "non-integer id in path");
            Err(not_found())
        }
    }
}
