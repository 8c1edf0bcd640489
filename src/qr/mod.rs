pub mod encoder;
pub mod shared;

pub use encoder::{encode, QrError};
pub use shared::{bootstrap_shared_qr, SHARED_QR_KEY};
