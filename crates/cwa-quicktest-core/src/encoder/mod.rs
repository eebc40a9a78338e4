//! Encoding pipeline for the app's QR code / deep link payload.
//!
//! ```text
//! TestRecord ─▶ ordered fields ─▶ "v1#v2#…" ─▶ SHA-256 ─▶ hash
//!     │                                                   │
//!     └──────────── fields + hash ─▶ compact JSON ─▶ base64 ─▶ https://s.coronawarn.app?v=1#<payload>
//! ```

mod digest;
mod payload;
mod salt;

pub use digest::*;
pub use payload::*;
pub use salt::*;

use thiserror::Error;

/// Encoding errors.
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid payload: {0}")]
    Payload(String),

    #[error("Secure random source unavailable: {0}")]
    RandomSource(String),

    #[error("Validation error: {0}")]
    Validation(#[from] crate::models::ValidationError),
}

pub type EncodeResult<T> = Result<T, EncodeError>;
