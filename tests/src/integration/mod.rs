//! Cross-crate integration flows.

pub mod allocation_flow;
pub mod codec_properties;
pub mod concurrency;
pub mod reservation_flow;
