//! Response helpers. Bodies are the serialized entities themselves, with no envelope.

use axum::{http::StatusCode, Json};
use serde_json::Value;

pub fn ok(body: Value) -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(body))
}

pub fn created(body: Value) -> (StatusCode, Json<Value>) {
    (StatusCode::CREATED, Json(body))
}
