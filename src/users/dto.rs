use serde::{Deserialize, Serialize};

use crate::users::services::QrAssetRef;

/// Form body of `POST /user/add`.
#[derive(Debug, Deserialize)]
pub struct AddUserForm {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct UserAddedResponse {
    pub message: String,
    pub user_id: i64,
    pub qr_url: QrAssetRef,
}

#[derive(Debug, Serialize)]
pub struct ProvisionResponse {
    pub user_id: i64,
    pub qr_url: QrAssetRef,
}
