use crate::config::AppConfig;
use crate::db;
use crate::storage::{AssetStore, LocalStore};
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub storage: Arc<dyn AssetStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = db::connect(&config.database_url).await?;
        db::migrate(&db).await?;

        let storage = Arc::new(LocalStore::new(&config.qr.upload_dir)) as Arc<dyn AssetStore>;

        Ok(Self::from_parts(db, config, storage))
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>, storage: Arc<dyn AssetStore>) -> Self {
        Self {
            db,
            config,
            storage,
        }
    }
}

#[cfg(test)]
pub fn test_config(base_url: &str) -> AppConfig {
    use crate::config::{normalize_base_url, QrConfig};

    AppConfig {
        database_url: "sqlite::memory:".into(),
        base_url: normalize_base_url(base_url),
        host: "127.0.0.1".into(),
        port: 0,
        qr: QrConfig {
            upload_dir: "static/uploads".into(),
            size: crate::config::DEFAULT_QR_SIZE,
        },
    }
}

#[cfg(test)]
impl AppState {
    /// In-memory database plus in-memory asset store; the store is returned
    /// separately so tests can inspect writes.
    pub async fn for_tests(
        base_url: &str,
    ) -> (Self, Arc<crate::storage::memory::MemoryStore>) {
        let store = Arc::new(crate::storage::memory::MemoryStore::default());
        let state = Self::from_parts(
            db::in_memory().await,
            Arc::new(test_config(base_url)),
            store.clone() as Arc<dyn AssetStore>,
        );
        (state, store)
    }
}
