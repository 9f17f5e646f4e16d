//! External system integrations for cinesync.
//!
//! - [`postgres`] - Pooled access to the movies catalog
//! - [`elasticsearch`] - REST client and idempotent bulk loader for the
//!   search cluster
//!
//! Adapters isolate the wire protocols behind small clients; core logic only
//! sees domain types and the [`crate::core::sync`] traits.

pub mod elasticsearch;
pub mod postgres;
