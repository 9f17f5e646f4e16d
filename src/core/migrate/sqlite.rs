//! Legacy SQLite catalog reader
//!
//! Row shapes mirror the legacy schema exactly: ids are TEXT uuids and
//! timestamps are TEXT in `YYYY-MM-DD HH:MM:SS.ffffff+00` form. Rows are
//! fetched through a streaming cursor, so only the accumulating typed rows
//! are held, never the driver's full raw result.

use crate::domain::{CinesyncError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rusqlite::{Connection, OpenFlags, Row};
use std::path::Path;
use uuid::Uuid;

/// A `film_work` row as stored in the legacy catalog
#[derive(Debug, Clone)]
pub struct FilmWorkRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub creation_date: Option<NaiveDate>,
    pub file_path: Option<String>,
    pub rating: Option<f64>,
    pub kind: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct GenreRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct PersonRow {
    pub id: Uuid,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct GenreFilmWorkRow {
    pub id: Uuid,
    pub film_work_id: Uuid,
    pub genre_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct PersonFilmWorkRow {
    pub id: Uuid,
    pub film_work_id: Uuid,
    pub person_id: Uuid,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Everything the legacy catalog holds, table by table
#[derive(Debug, Default)]
pub struct CatalogDump {
    pub film_works: Vec<FilmWorkRow>,
    pub genres: Vec<GenreRow>,
    pub persons: Vec<PersonRow>,
    pub genre_film_works: Vec<GenreFilmWorkRow>,
    pub person_film_works: Vec<PersonFilmWorkRow>,
}

/// Read-only handle on the legacy SQLite catalog
#[derive(Debug)]
pub struct SqliteCatalog {
    conn: Connection,
}

impl SqliteCatalog {
    /// Open the catalog file read-only
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| {
                CinesyncError::Configuration(format!(
                    "failed to open SQLite catalog {}: {e}",
                    path.display()
                ))
            })?;

        Ok(Self { conn })
    }

    /// Read all five tables
    pub fn dump(&self) -> Result<CatalogDump> {
        Ok(CatalogDump {
            film_works: self.read_table(
                "SELECT id, title, description, creation_date, file_path, rating, type, \
                 created_at, updated_at FROM film_work",
                |row| {
                    Ok(FilmWorkRow {
                        id: read_uuid(row, 0)?,
                        title: row.get(1)?,
                        description: row.get(2)?,
                        creation_date: read_date(row, 3)?,
                        file_path: row.get(4)?,
                        rating: row.get(5)?,
                        kind: row.get(6)?,
                        created_at: read_timestamp(row, 7)?,
                        updated_at: read_timestamp(row, 8)?,
                    })
                },
            )?,
            genres: self.read_table(
                "SELECT id, name, description, created_at, updated_at FROM genre",
                |row| {
                    Ok(GenreRow {
                        id: read_uuid(row, 0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                        created_at: read_timestamp(row, 3)?,
                        updated_at: read_timestamp(row, 4)?,
                    })
                },
            )?,
            persons: self.read_table(
                "SELECT id, full_name, created_at, updated_at FROM person",
                |row| {
                    Ok(PersonRow {
                        id: read_uuid(row, 0)?,
                        full_name: row.get(1)?,
                        created_at: read_timestamp(row, 2)?,
                        updated_at: read_timestamp(row, 3)?,
                    })
                },
            )?,
            genre_film_works: self.read_table(
                "SELECT id, film_work_id, genre_id, created_at FROM genre_film_work",
                |row| {
                    Ok(GenreFilmWorkRow {
                        id: read_uuid(row, 0)?,
                        film_work_id: read_uuid(row, 1)?,
                        genre_id: read_uuid(row, 2)?,
                        created_at: read_timestamp(row, 3)?,
                    })
                },
            )?,
            person_film_works: self.read_table(
                "SELECT id, film_work_id, person_id, role, created_at FROM person_film_work",
                |row| {
                    Ok(PersonFilmWorkRow {
                        id: read_uuid(row, 0)?,
                        film_work_id: read_uuid(row, 1)?,
                        person_id: read_uuid(row, 2)?,
                        role: row.get(3)?,
                        created_at: read_timestamp(row, 4)?,
                    })
                },
            )?,
        })
    }

    fn read_table<T>(
        &self,
        sql: &str,
        map: impl Fn(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>> {
        let mut statement = self
            .conn
            .prepare(sql)
            .map_err(|e| CinesyncError::Database(format!("SQLite prepare failed: {e}")))?;

        let rows = statement
            .query_map([], |row| map(row))
            .map_err(|e| CinesyncError::Database(format!("SQLite query failed: {e}")))?;

        let mut collected = Vec::new();
        for row in rows {
            collected
                .push(row.map_err(|e| CinesyncError::Database(format!("SQLite row failed: {e}")))?);
        }

        Ok(collected)
    }
}

fn read_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let text: String = row.get(idx)?;
    text.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("invalid uuid '{text}': {e}"),
            )),
        )
    })
}

fn read_date(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let text: Option<String> = row.get(idx)?;
    match text {
        None => Ok(None),
        Some(text) => text.parse().map(Some).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Text,
                Box::new(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("invalid date '{text}': {e}"),
                )),
            )
        }),
    }
}

/// Legacy timestamps look like `2021-06-16 20:14:09.221838+00`
fn read_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    parse_legacy_timestamp(&text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e)),
        )
    })
}

fn parse_legacy_timestamp(text: &str) -> std::result::Result<DateTime<Utc>, String> {
    let trimmed = text.trim_end_matches("+00");
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("invalid timestamp '{text}': {e}"))
}
