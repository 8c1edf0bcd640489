use sqlx::SqlitePool;
use time::{macros::format_description, OffsetDateTime};
use tracing::{info, warn};

use crate::attendance::repo::Attendance;
use crate::error::AppError;
use crate::users::repo_types::User;

/// Outcome of a successful check-in.
#[derive(Debug, Clone)]
pub struct AttendanceMark {
    pub user: User,
    pub record: Attendance,
}

/// Appends one attendance record for `user_id`.
///
/// Unknown users yield `NotFound` and nothing is written. Repeated check-ins
/// are all accepted. `at` defaults to the current UTC time.
pub async fn record_attendance(
    db: &SqlitePool,
    user_id: i64,
    at: Option<OffsetDateTime>,
) -> Result<AttendanceMark, AppError> {
    let timestamp = at.unwrap_or_else(OffsetDateTime::now_utc);
    let Some(record) = Attendance::insert_for_existing_user(db, user_id, timestamp).await? else {
        warn!(user_id, "attendance for unknown user");
        return Err(AppError::NotFound);
    };

    // users are never deleted, so the row the insert matched is still there
    let user = User::find_by_id(db, user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    info!(user_id, attendance_id = record.id, name = %user.name, "attendance marked");
    Ok(AttendanceMark { user, record })
}

pub async fn count_by_user(db: &SqlitePool, user_id: i64) -> Result<i64, AppError> {
    Ok(Attendance::count_by_user(db, user_id).await?)
}

/// `YYYY-MM-DD HH:MM:SS`
pub fn format_timestamp(ts: OffsetDateTime) -> String {
    let fmt = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    ts.format(fmt).unwrap_or_else(|e| {
        warn!(error = %e, timestamp = %ts, "timestamp formatting failed; using unix seconds");
        ts.unix_timestamp().to_string()
    })
}
