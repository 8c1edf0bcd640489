//! Placeholder routers for areas that are not implemented yet.

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

pub fn stub_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/test", get(|| placeholder("Admin")))
        .route("/attendance/test", get(|| placeholder("Attendance")))
        .route("/auth/test", get(|| placeholder("Auth")))
}

async fn placeholder(area: &'static str) -> Json<Value> {
    Json(json!({ "message": format!("{} route works", area) }))
}
