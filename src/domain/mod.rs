//! Domain models and types for cinesync.
//!
//! The domain layer provides:
//! - **Catalog identifiers** ([`SearchIndex`], [`CatalogTable`])
//! - **Denormalized records** ([`FilmRecord`], [`GenreRecord`], [`PersonRecord`], [`IndexDocument`])
//! - **Error types** ([`CinesyncError`], [`SearchError`])
//! - **Result type alias** ([`Result`])

pub mod catalog;
pub mod errors;
pub mod records;
pub mod result;

// Re-export commonly used types for convenience
pub use catalog::{CatalogTable, SearchIndex};
pub use errors::{CinesyncError, SearchError};
pub use records::{FilmRecord, FilmRoles, GenreRecord, IndexDocument, PersonRecord, PersonRef, RowMapper};
pub use result::Result;
