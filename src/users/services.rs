use serde::Serialize;
use time::OffsetDateTime;
use tracing::{error, info, warn};

use crate::config::public_upload_path;
use crate::error::AppError;
use crate::qr;
use crate::state::AppState;
use crate::users::repo_types::{QrStatus, User};

/// Public path of a provisioned per-user QR image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QrAssetRef(pub String);

/// Asset key of a user's QR; distinct ids never share a key.
pub fn qr_key_for(user_id: i64) -> String {
    format!("user_{}.png", user_id)
}

/// Validates `name`, persists the user and provisions its QR.
///
/// On a provisioning failure the user stays committed as `unprovisioned`
/// and the error is returned; `provision` or `provision_pending` can retry it.
pub async fn create_user(st: &AppState, name: &str) -> Result<(User, QrAssetRef), AppError> {
    let name = name.trim();
    if name.is_empty() {
        warn!("rejecting user with empty name");
        return Err(AppError::Validation("name is required".into()));
    }

    let user = User::create(&st.db, name, OffsetDateTime::now_utc()).await?;
    info!(user_id = user.id, name = %user.name, "user created");

    match provision(st, &user).await {
        Ok(asset) => {
            let user = User::find_by_id(&st.db, user.id)
                .await?
                .ok_or(AppError::NotFound)?;
            Ok((user, asset))
        }
        Err(e) => {
            error!(user_id = user.id, error = %e, "provisioning failed; user left unprovisioned");
            Err(e)
        }
    }
}

/// Renders the user's mark-attendance QR and records it on the user.
pub async fn provision(st: &AppState, user: &User) -> Result<QrAssetRef, AppError> {
    if user.qr_status == QrStatus::Provisioned {
        if let Some(path) = &user.qr_code_path {
            return Ok(QrAssetRef(path.clone()));
        }
    }

    let key = qr_key_for(user.id);
    let mark_url = st.config.mark_url(user.id);
    qr::encode(st.storage.as_ref(), &mark_url, &key, Some(st.config.qr.size)).await?;

    let public = public_upload_path(&key);
    match User::mark_provisioned(&st.db, user.id, &public).await? {
        Some(updated) => {
            info!(user_id = updated.id, qr_url = %public, %mark_url, "user provisioned");
            Ok(QrAssetRef(public))
        }
        None => {
            // provisioned concurrently; the path is a function of the id
            let current = User::find_by_id(&st.db, user.id)
                .await?
                .ok_or(AppError::NotFound)?;
            Ok(QrAssetRef(current.qr_code_path.unwrap_or(public)))
        }
    }
}

pub async fn provision_by_id(st: &AppState, user_id: i64) -> Result<QrAssetRef, AppError> {
    let user = User::find_by_id(&st.db, user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    provision(st, &user).await
}

/// Retries every user left `unprovisioned`. Returns how many succeeded.
pub async fn provision_pending(st: &AppState) -> Result<usize, AppError> {
    let pending = User::list_unprovisioned(&st.db).await?;
    let mut done = 0;
    for user in &pending {
        match provision(st, user).await {
            Ok(_) => done += 1,
            Err(e) => warn!(user_id = user.id, error = %e, "pending provisioning failed"),
        }
    }
    if !pending.is_empty() {
        info!(pending = pending.len(), provisioned = done, "pending users processed");
    }
    Ok(done)
}

#[cfg(test)]
mod provisioning_tests {
    use super::*;
    use crate::qr::encoder::test_support::decode_png;

    const BASE: &str = "http://127.0.0.1:10000";

    #[test]
    fn qr_keys_are_distinct_per_user() {
        assert_eq!(qr_key_for(1), "user_1.png");
        assert_ne!(qr_key_for(1), qr_key_for(2));
        assert_ne!(qr_key_for(1), qr_key_for(11));
    }

    #[tokio::test]
    async fn create_user_provisions_qr_for_mark_url() {
        let (st, store) = AppState::for_tests(BASE).await;

        let (user, asset) = create_user(&st, "Ali Rezaei").await.unwrap();

        assert_eq!(user.id, 1);
        assert_eq!(user.qr_status, QrStatus::Provisioned);
        assert_eq!(asset, QrAssetRef("/static/uploads/user_1.png".into()));
        assert_eq!(user.qr_code_path.as_deref(), Some("/static/uploads/user_1.png"));

        let png = store.object("user_1.png").unwrap();
        assert_eq!(decode_png(&png), format!("{}/attendance/mark/1", BASE));
    }

    #[tokio::test]
    async fn users_get_distinct_assets() {
        let (st, store) = AppState::for_tests(BASE).await;

        let (_, a) = create_user(&st, "Ali Rezaei").await.unwrap();
        let (_, b) = create_user(&st, "Sara Ahmadi").await.unwrap();

        assert_ne!(a, b);
        assert_eq!(store.keys(), vec!["user_1.png".to_string(), "user_2.png".to_string()]);
        let png = store.object("user_2.png").unwrap();
        assert_eq!(decode_png(&png), format!("{}/attendance/mark/2", BASE));
    }

    #[tokio::test]
    async fn empty_name_is_rejected_before_persistence() {
        let (st, store) = AppState::for_tests(BASE).await;

        let err = create_user(&st, "   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(User::list_with_counts(&st.db).await.unwrap().is_empty());
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn failed_provisioning_leaves_user_retryable() {
        let (st, store) = AppState::for_tests(BASE).await;
        store.set_fail_writes(true);

        let err = create_user(&st, "Mina Karimi").await.unwrap_err();
        assert!(matches!(err, AppError::Io(_)));

        let user = User::find_by_id(&st.db, 1).await.unwrap().unwrap();
        assert_eq!(user.qr_status, QrStatus::Unprovisioned);
        assert!(user.qr_code_path.is_none());

        store.set_fail_writes(false);
        assert_eq!(provision_pending(&st).await.unwrap(), 1);
        let user = User::find_by_id(&st.db, 1).await.unwrap().unwrap();
        assert_eq!(user.qr_status, QrStatus::Provisioned);
        assert_eq!(user.qr_code_path.as_deref(), Some("/static/uploads/user_1.png"));
    }

    #[tokio::test]
    async fn provisioning_twice_does_not_reencode() {
        let (st, store) = AppState::for_tests(BASE).await;
        let (user, first) = create_user(&st, "Ali Rezaei").await.unwrap();
        let writes = store.writes();

        let again = provision(&st, &user).await.unwrap();
        assert_eq!(again, first);
        assert_eq!(store.writes(), writes);
    }

    #[tokio::test]
    async fn provision_unknown_user_is_not_found() {
        let (st, _) = AppState::for_tests(BASE).await;
        assert!(matches!(
            provision_by_id(&st, 999).await,
            Err(AppError::NotFound)
        ));
    }
}
