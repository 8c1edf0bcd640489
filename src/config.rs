use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

/// Public path prefix under which the uploads directory is served.
pub const UPLOADS_PUBLIC_PREFIX: &str = "/static/uploads";
pub const DEFAULT_QR_SIZE: u32 = 300;

#[derive(Debug, Clone, Deserialize)]
pub struct QrConfig {
    pub upload_dir: PathBuf,
    pub size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub base_url: String,
    pub host: String,
    pub port: u16,
    pub qr: QrConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://attendance.db?mode=rwc".into());
        let base_url = std::env::var("BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:10000".into());
        let port = match std::env::var("APP_PORT") {
            Ok(v) => v.parse::<u16>().context("APP_PORT must be a port number")?,
            Err(_) => 10000,
        };
        let qr = QrConfig {
            upload_dir: std::env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "static/uploads".into())
                .into(),
            size: parse_qr_size(std::env::var("QR_SIZE").ok().as_deref()),
        };
        Ok(Self {
            database_url,
            base_url: normalize_base_url(&base_url),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
            qr,
        })
    }

    /// Payload of the shared kiosk QR.
    pub fn scan_url(&self) -> String {
        format!("{}/scan", self.base_url)
    }

    /// Payload of a per-user QR.
    pub fn mark_url(&self, user_id: i64) -> String {
        format!("{}/attendance/mark/{}", self.base_url, user_id)
    }
}

/// Side of the rendered QR in pixels; unset, unparsable or zero means 300.
pub fn parse_qr_size(raw: Option<&str>) -> u32 {
    raw.and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|s| *s > 0)
        .unwrap_or(DEFAULT_QR_SIZE)
}

/// Strips a single trailing slash so `base + "/scan"` never doubles it.
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed.strip_suffix('/').unwrap_or(trimmed).to_string()
}

/// Public URL of an object stored in the uploads directory.
pub fn public_upload_path(key: &str) -> String {
    format!("{}/{}", UPLOADS_PUBLIC_PREFIX, key)
}

#[cfg(test)]
mod config_tests {
    use super::*;
    use crate::state::test_config as config;

    #[test]
    fn urls_are_built_from_base() {
        let cfg = config("https://kiosk.example.org");
        assert_eq!(cfg.scan_url(), "https://kiosk.example.org/scan");
        assert_eq!(cfg.mark_url(42), "https://kiosk.example.org/attendance/mark/42");
    }

    #[test]
    fn trailing_slash_is_trimmed_once() {
        let cfg = config("http://127.0.0.1:10000/");
        assert_eq!(cfg.scan_url(), "http://127.0.0.1:10000/scan");
    }

    #[test]
    fn qr_size_defaults_to_300() {
        assert_eq!(parse_qr_size(None), 300);
        assert_eq!(parse_qr_size(Some("0")), 300);
        assert_eq!(parse_qr_size(Some("big")), 300);
        assert_eq!(parse_qr_size(Some(" 512 ")), 512);
    }

    #[test]
    fn public_upload_path_uses_static_prefix() {
        assert_eq!(public_upload_path("user_7.png"), "/static/uploads/user_7.png");
    }
}
