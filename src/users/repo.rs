use crate::users::repo_types::{User, UserAttendanceCount};
use sqlx::{SqliteExecutor, SqlitePool};
use time::OffsetDateTime;

impl User {
    /// Insert a new, not yet provisioned user.
    pub async fn create(
        db: &SqlitePool,
        name: &str,
        created_at: OffsetDateTime,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, qr_status, created_at)
            VALUES (?1, 'unprovisioned', ?2)
            RETURNING id, name, qr_code_path, qr_status, created_at
            "#,
        )
        .bind(name)
        .bind(created_at)
        .fetch_one(db)
        .await
    }

    pub async fn find_by_id<'e, E>(db: E, id: i64) -> Result<Option<User>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, qr_code_path, qr_status, created_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// `unprovisioned -> provisioned`, storing the asset path in the same
    /// statement. Returns `None` when the user is missing or already provisioned.
    pub async fn mark_provisioned(
        db: &SqlitePool,
        id: i64,
        qr_code_path: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET qr_code_path = ?2, qr_status = 'provisioned'
             WHERE id = ?1 AND qr_status = 'unprovisioned'
            RETURNING id, name, qr_code_path, qr_status, created_at
            "#,
        )
        .bind(id)
        .bind(qr_code_path)
        .fetch_optional(db)
        .await
    }

    pub async fn list_unprovisioned(db: &SqlitePool) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, qr_code_path, qr_status, created_at
            FROM users
            WHERE qr_status = 'unprovisioned'
            ORDER BY id
            "#,
        )
        .fetch_all(db)
        .await
    }

    pub async fn list_with_counts(db: &SqlitePool) -> Result<Vec<UserAttendanceCount>, sqlx::Error> {
        sqlx::query_as::<_, UserAttendanceCount>(
            r#"
            SELECT u.id, u.name, u.qr_code_path, u.qr_status,
                   COUNT(a.id) AS attendance_count
              FROM users u
              LEFT JOIN attendances a ON a.user_id = u.id
             GROUP BY u.id
             ORDER BY u.id
            "#,
        )
        .fetch_all(db)
        .await
    }
}
