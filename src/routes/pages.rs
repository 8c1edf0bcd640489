use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::instrument;

use crate::{
    config::public_upload_path,
    error::AppError,
    qr::SHARED_QR_KEY,
    state::AppState,
    users::repo_types::{QrStatus, User},
};

pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/scan", get(scan_landing))
        .route("/dashboard", get(dashboard))
}

#[derive(Debug, Serialize)]
pub struct HomePage {
    pub qr_url: String,
    pub scan_url: String,
}

#[derive(Debug, Serialize)]
pub struct ScanPage {
    pub message: &'static str,
    pub instructions: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DashboardEntry {
    pub id: i64,
    pub name: String,
    pub qr_url: Option<String>,
    pub qr_status: QrStatus,
    pub count: i64,
}

/// Kiosk home: where the shared QR is served from.
pub async fn home(State(state): State<AppState>) -> Json<HomePage> {
    Json(HomePage {
        qr_url: public_upload_path(SHARED_QR_KEY),
        scan_url: state.config.scan_url(),
    })
}

pub async fn scan_landing() -> Json<ScanPage> {
    Json(ScanPage {
        message: "Welcome! Scan your personal QR code to check in.",
        instructions: "Open the link encoded in your personal QR code to mark your attendance.",
    })
}

#[instrument(skip(state))]
pub async fn dashboard(State(state): State<AppState>) -> Result<Json<Vec<DashboardEntry>>, AppError> {
    let rows = User::list_with_counts(&state.db).await?;
    Ok(Json(
        rows.into_iter()
            .map(|r| DashboardEntry {
                id: r.id,
                name: r.name,
                qr_url: r.qr_code_path,
                qr_status: r.qr_status,
                count: r.attendance_count,
            })
            .collect(),
    ))
}
