use serde::Serialize;

/// Response of `GET /attendance/mark/:user_id`.
#[derive(Debug, Serialize)]
pub struct MarkedResponse {
    pub message: String,
    pub user_id: i64,
    pub time: String, // "YYYY-MM-DD HH:MM:SS", UTC
    pub count: i64,
}
