//! Typed client for the remote audio-processing backend
//!
//! Four HTTP operations, no retries, no caching:
//! - GET /detect-devices - enumerate audio endpoints
//! - POST /config - partial configuration update (JSON)
//! - POST /start - full configuration plus reference audio (multipart)
//! - POST /stop - end the running session

mod client;
mod error;
mod types;

pub use client::{HttpApiClient, ProcessingApi};
pub use error::ApiError;
pub use types::{Device, DeviceLists, ReferenceAudio};
