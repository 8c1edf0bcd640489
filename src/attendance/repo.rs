use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Attendance {
    pub id: i64,
    pub user_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl Attendance {
    /// Inserts a record only if `user_id` exists; `None` otherwise.
    ///
    /// The existence check and the write are one statement so concurrent
    /// check-ins queue on SQLite's write lock instead of failing an upgrade.
    pub async fn insert_for_existing_user<'e, E>(
        db: E,
        user_id: i64,
        timestamp: OffsetDateTime,
    ) -> Result<Option<Attendance>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Attendance>(
            r#"
            INSERT INTO attendances (user_id, timestamp)
            SELECT ?1, ?2
             WHERE EXISTS (SELECT 1 FROM users WHERE id = ?1)
            RETURNING id, user_id, timestamp
            "#,
        )
        .bind(user_id)
        .bind(timestamp)
        .fetch_optional(db)
        .await
    }

    pub async fn count_by_user<'e, E>(db: E, user_id: i64) -> Result<i64, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM attendances WHERE user_id = ?1"#)
            .bind(user_id)
            .fetch_one(db)
            .await
    }

    pub async fn list_by_user<'e, E>(db: E, user_id: i64) -> Result<Vec<Attendance>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Attendance>(
            r#"
            SELECT id, user_id, timestamp
              FROM attendances
             WHERE user_id = ?1
             ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }
}
