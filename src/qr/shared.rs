use bytes::Bytes;
use tracing::info;

use super::encoder::{encode, QrError};
use crate::config::AppConfig;
use crate::storage::AssetStore;

/// Well-known key of the kiosk QR inside the uploads directory.
pub const SHARED_QR_KEY: &str = "attendance_qr.png";
/// Holds the payload the shared QR was rendered from.
const SHARED_QR_MARKER_KEY: &str = "attendance_qr.png.url";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedQr {
    pub key: &'static str,
    pub payload: String,
    pub regenerated: bool,
}

/// Makes sure the shared scan QR exists and encodes the current scan URL.
///
/// The image is only rendered when it is missing or its marker records a
/// different payload (e.g. `BASE_URL` changed between deployments).
pub async fn bootstrap_shared_qr(
    store: &dyn AssetStore,
    config: &AppConfig,
) -> Result<SharedQr, QrError> {
    let payload = config.scan_url();

    if store.exists(SHARED_QR_KEY).await? && marker_matches(store, &payload).await? {
        info!(key = SHARED_QR_KEY, %payload, "shared qr already present");
        return Ok(SharedQr {
            key: SHARED_QR_KEY,
            payload,
            regenerated: false,
        });
    }

    encode(store, &payload, SHARED_QR_KEY, Some(config.qr.size)).await?;
    store
        .put(SHARED_QR_MARKER_KEY, Bytes::from(payload.clone()))
        .await?;
    info!(key = SHARED_QR_KEY, %payload, "shared qr regenerated");

    Ok(SharedQr {
        key: SHARED_QR_KEY,
        payload,
        regenerated: true,
    })
}

async fn marker_matches(store: &dyn AssetStore, payload: &str) -> Result<bool, QrError> {
    Ok(store
        .get(SHARED_QR_MARKER_KEY)
        .await?
        .is_some_and(|m| m.as_ref() == payload.as_bytes()))
}

#[cfg(test)]
mod shared_tests {
    use super::*;
    use crate::qr::encoder::test_support::decode_png;
    use crate::state::test_config;
    use crate::storage::memory::MemoryStore;

    #[tokio::test]
    async fn second_bootstrap_does_not_write() {
        let store = MemoryStore::default();
        let cfg = test_config("http://kiosk.local");

        let first = bootstrap_shared_qr(&store, &cfg).await.unwrap();
        assert!(first.regenerated);
        let writes = store.writes();

        let second = bootstrap_shared_qr(&store, &cfg).await.unwrap();
        assert!(!second.regenerated);
        assert_eq!(store.writes(), writes);
    }

    #[tokio::test]
    async fn shared_qr_encodes_scan_url() {
        let store = MemoryStore::default();
        let cfg = test_config("http://kiosk.local");

        bootstrap_shared_qr(&store, &cfg).await.unwrap();

        let png = store.object(SHARED_QR_KEY).unwrap();
        assert_eq!(decode_png(&png), "http://kiosk.local/scan");
    }

    #[tokio::test]
    async fn shared_qr_uses_configured_size() {
        let store = MemoryStore::default();
        let mut cfg = test_config("http://kiosk.local");
        cfg.qr.size = 240;

        bootstrap_shared_qr(&store, &cfg).await.unwrap();

        let png = store.object(SHARED_QR_KEY).unwrap();
        let img = image::load_from_memory(&png).unwrap();
        assert_eq!((img.width(), img.height()), (240, 240));
    }

    #[tokio::test]
    async fn changed_base_url_regenerates() {
        let store = MemoryStore::default();
        bootstrap_shared_qr(&store, &test_config("http://old.local"))
            .await
            .unwrap();

        let shared = bootstrap_shared_qr(&store, &test_config("http://new.local"))
            .await
            .unwrap();
        assert!(shared.regenerated);
        let png = store.object(SHARED_QR_KEY).unwrap();
        assert_eq!(decode_png(&png), "http://new.local/scan");
    }

    #[tokio::test]
    async fn file_without_marker_is_regenerated() {
        let store = MemoryStore::default();
        store
            .put(SHARED_QR_KEY, Bytes::from_static(b"stale"))
            .await
            .unwrap();

        let shared = bootstrap_shared_qr(&store, &test_config("http://kiosk.local"))
            .await
            .unwrap();
        assert!(shared.regenerated);
        assert_ne!(&store.object(SHARED_QR_KEY).unwrap()[..], b"stale");
    }

    #[tokio::test]
    async fn write_failure_surfaces() {
        let store = MemoryStore::default();
        store.set_fail_writes(true);
        let err = bootstrap_shared_qr(&store, &test_config("http://kiosk.local"))
            .await
            .unwrap_err();
        assert!(matches!(err, QrError::Io(_)));
    }
}
