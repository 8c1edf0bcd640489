use std::io::Cursor;

use bytes::Bytes;
use image::{
    imageops::{self, FilterType},
    GrayImage, ImageFormat, Luma,
};
use qrcode::{EcLevel, QrCode};
use tracing::debug;

use crate::storage::{AssetStore, StorageError};

/// Pixels per QR module before any rescaling.
pub const MODULE_PX: u32 = 10;
/// Quiet border around the symbol, in modules.
pub const BORDER_MODULES: u32 = 2;
pub const EC_LEVEL: EcLevel = EcLevel::M;

#[derive(Debug, thiserror::Error)]
pub enum QrError {
    #[error("qr encoding failed: {0}")]
    Encoding(String),
    #[error("qr write failed: {0}")]
    Io(#[source] StorageError),
}

impl From<StorageError> for QrError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::CreateDir { .. } => QrError::Encoding(e.to_string()),
            other => QrError::Io(other),
        }
    }
}

/// Renders `payload` into a black-on-white greyscale QR image.
///
/// With `size` the image is rescaled (nearest neighbour) to `size × size`.
pub fn render(payload: &str, size: Option<u32>) -> Result<GrayImage, QrError> {
    if payload.is_empty() {
        return Err(QrError::Encoding("payload is empty".into()));
    }
    if size == Some(0) {
        return Err(QrError::Encoding("size must be positive".into()));
    }

    let code = QrCode::with_error_correction_level(payload.as_bytes(), EC_LEVEL)
        .map_err(|e| QrError::Encoding(e.to_string()))?;
    let modules = code
        .render::<Luma<u8>>()
        .quiet_zone(false)
        .module_dimensions(MODULE_PX, MODULE_PX)
        .build();

    let border = BORDER_MODULES * MODULE_PX;
    let side = modules.width() + 2 * border;
    let mut canvas = GrayImage::from_pixel(side, side, Luma([255]));
    imageops::replace(&mut canvas, &modules, i64::from(border), i64::from(border));

    Ok(match size {
        Some(s) if s != side => imageops::resize(&canvas, s, s, FilterType::Nearest),
        _ => canvas,
    })
}

pub fn render_png(payload: &str, size: Option<u32>) -> Result<Bytes, QrError> {
    let img = render(payload, size)?;
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| QrError::Encoding(e.to_string()))?;
    Ok(Bytes::from(buf.into_inner()))
}

/// Renders `payload` and writes the PNG to `destination` in `store`,
/// overwriting whatever was there.
pub async fn encode(
    store: &dyn AssetStore,
    payload: &str,
    destination: &str,
    size: Option<u32>,
) -> Result<(), QrError> {
    let png = render_png(payload, size)?;
    let len = png.len();
    store.put(destination, png).await?;
    debug!(destination, bytes = len, "qr written");
    Ok(())
}
