use axum::{
    extract::{Path, State},
    routing::post,
    Form, Json, Router,
};
use tracing::{info, instrument};

use crate::{
    error::AppError,
    state::AppState,
    users::{
        dto::{AddUserForm, ProvisionResponse, UserAddedResponse},
        services::{create_user, provision_by_id},
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user/add", post(add_user))
        .route("/user/:id/provision", post(provision_user))
}

#[instrument(skip(state, form))]
pub async fn add_user(
    State(state): State<AppState>,
    Form(form): Form<AddUserForm>,
) -> Result<Json<UserAddedResponse>, AppError> {
    let (user, qr_url) = create_user(&state, &form.name).await?;
    Ok(Json(UserAddedResponse {
        message: "User added".into(),
        user_id: user.id,
        qr_url,
    }))
}

/// Retries provisioning for a user left without a QR.
#[instrument(skip(state))]
pub async fn provision_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProvisionResponse>, AppError> {
    info!(user_id = id, "provisioning requested");
    let qr_url = provision_by_id(&state, id).await?;
    Ok(Json(ProvisionResponse { user_id: id, qr_url }))
}
