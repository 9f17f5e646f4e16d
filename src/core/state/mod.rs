//! Watermark checkpoint state
//!
//! One watermark per search index marks the end of the last successfully
//! synchronized window. The [`WatermarkStore`] contract is a plain durable
//! key/value get/set; [`watermark`] fixes the key and value conventions.

pub mod store;
pub mod watermark;

pub use store::{FileWatermarkStore, MemoryWatermarkStore, WatermarkStore};
pub use watermark::{format_watermark, parse_watermark, watermark_key};
