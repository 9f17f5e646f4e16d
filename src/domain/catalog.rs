//! Catalog and index identifiers
//!
//! Closed enumerations over the search indexes served by cinesync and the
//! PostgreSQL tables they are built from. Table and column names only ever
//! come from these types, never from request input.

use crate::domain::{CinesyncError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target search index identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchIndex {
    /// Denormalized film documents
    Movies,
    /// Genre documents
    Genres,
    /// Person documents with per-film roles
    Persons,
}

impl SearchIndex {
    /// Index name as known to Elasticsearch
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchIndex::Movies => "movies",
            SearchIndex::Genres => "genres",
            SearchIndex::Persons => "persons",
        }
    }

    /// Every index cinesync knows how to build
    pub fn all() -> [SearchIndex; 3] {
        [SearchIndex::Movies, SearchIndex::Genres, SearchIndex::Persons]
    }
}

impl fmt::Display for SearchIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchIndex {
    type Err = CinesyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "movies" => Ok(SearchIndex::Movies),
            "genres" => Ok(SearchIndex::Genres),
            "persons" => Ok(SearchIndex::Persons),
            other => Err(CinesyncError::Configuration(format!(
                "unknown search index '{other}', expected one of: movies, genres, persons"
            ))),
        }
    }
}

/// A catalog entity table scanned for changes
///
/// Each variant is the base table of one entity kind; the same list doubles
/// as the set of related tables other kinds may be joined to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogTable {
    FilmWork,
    Genre,
    Person,
}

impl CatalogTable {
    /// Schema-qualified table name for SQL
    pub fn qualified_name(&self) -> &'static str {
        match self {
            CatalogTable::FilmWork => "content.film_work",
            CatalogTable::Genre => "content.genre",
            CatalogTable::Person => "content.person",
        }
    }

    /// Every table a sync pass scans; receivers skip tables that don't
    /// apply to their entity kind.
    pub fn all() -> [CatalogTable; 3] {
        [CatalogTable::FilmWork, CatalogTable::Genre, CatalogTable::Person]
    }
}

impl fmt::Display for CatalogTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.qualified_name())
    }
}
