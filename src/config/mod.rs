//! Configuration management for cinesync.
//!
//! Configuration is loaded from a TOML file with `${VAR}` environment
//! substitution and `CINESYNC_*` environment overrides, validated once, and
//! passed by reference into the components that need it.

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::load_config;
pub use schema::{
    ApplicationConfig, CinesyncConfig, ElasticsearchConfig, LoggingConfig, PostgresConfig,
    RetryConfig, StateConfig, SyncConfig,
};
pub use secret::{secret_from, SecretString, SecretValue};
