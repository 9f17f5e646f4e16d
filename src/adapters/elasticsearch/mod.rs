//! Elasticsearch integration
//!
//! The search cluster is only ever touched through two contracts: index
//! creation at startup and idempotent `_bulk` upserts keyed by document id.
//! [`SearchClient`] speaks the REST protocol; [`SearchLoader`] is the
//! [`crate::core::sync::DocumentSink`] the driver loads through.

pub mod client;
pub mod loader;
pub mod mappings;

pub use client::SearchClient;
pub use loader::SearchLoader;
