//! PostgreSQL catalog integration

pub mod client;

pub use client::CatalogClient;
