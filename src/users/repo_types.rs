use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Provisioning state of a user's QR asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum QrStatus {
    Unprovisioned,
    Provisioned,
}

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub qr_code_path: Option<String>, // public path, set once on provisioning
    pub qr_status: QrStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Dashboard row: a user and how many times they checked in.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserAttendanceCount {
    pub id: i64,
    pub name: String,
    pub qr_code_path: Option<String>,
    pub qr_status: QrStatus,
    pub attendance_count: i64,
}
