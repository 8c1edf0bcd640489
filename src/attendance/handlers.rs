use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    attendance::{
        dto::MarkedResponse,
        repo::Attendance,
        services::{count_by_user, format_timestamp, record_attendance},
    },
    error::AppError,
    state::AppState,
    users::repo_types::User,
};

pub fn attendance_routes() -> Router<AppState> {
    Router::new()
        .route("/attendance/mark/:user_id", get(mark_attendance))
        .route("/attendance/history/:user_id", get(attendance_history))
}

/// Target of a per-user QR: every visit is one check-in.
#[instrument(skip(state))]
pub async fn mark_attendance(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<MarkedResponse>, AppError> {
    let mark = record_attendance(&state.db, user_id, None).await?;
    let count = count_by_user(&state.db, user_id).await?;
    Ok(Json(MarkedResponse {
        message: format!("Attendance marked for {}", mark.user.name),
        user_id: mark.user.id,
        time: format_timestamp(mark.record.timestamp),
        count,
    }))
}

#[instrument(skip(state))]
pub async fn attendance_history(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<Attendance>>, AppError> {
    if User::find_by_id(&state.db, user_id).await?.is_none() {
        return Err(AppError::NotFound);
    }
    Ok(Json(Attendance::list_by_user(&state.db, user_id).await?))
}
