//! Denormalized, index-ready records
//!
//! Each record type mirrors one transform query's column list exactly, in
//! order: adding a field to a record requires adding a matching column to
//! the transform query in the same position. Records live only long enough
//! to be serialized into an [`IndexDocument`] and handed to the loader; the
//! search index is the durable copy.

use crate::domain::Result;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use uuid::Uuid;

/// A document ready for the search index, keyed by the entity's primary id
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDocument {
    /// Document id; upserts with the same id overwrite
    pub id: Uuid,

    /// Serialized document body
    pub body: serde_json::Value,
}

/// Positional row-to-document mapping used by an entity receiver
pub type RowMapper = fn(&Row) -> Result<IndexDocument>;

/// A person referenced from a film document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRef {
    pub id: Uuid,
    pub name: String,
}

/// A film referenced from a person document, with that person's roles in it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmRoles {
    pub id: Uuid,
    pub roles: Vec<String>,
}

/// Fully joined film document
///
/// Column order: id, title, description, rating, actor names, writer names,
/// director names, genre names, actor objects, writer objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilmRecord {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub imdb_rating: Option<f64>,
    pub actors_names: Vec<String>,
    pub writers_names: Vec<String>,
    pub director: Vec<String>,
    pub genre: Vec<String>,
    pub actors: Vec<PersonRef>,
    pub writers: Vec<PersonRef>,
}

impl FilmRecord {
    /// Map a transform query row onto a film record, positionally.
    pub fn from_row(row: &Row) -> Result<Self> {
        let actors: serde_json::Value = row.try_get(8)?;
        let writers: serde_json::Value = row.try_get(9)?;

        Ok(Self {
            id: row.try_get(0)?,
            title: row.try_get(1)?,
            description: row.try_get(2)?,
            imdb_rating: row.try_get(3)?,
            actors_names: row.try_get(4)?,
            writers_names: row.try_get(5)?,
            director: row.try_get(6)?,
            genre: row.try_get(7)?,
            actors: serde_json::from_value(actors)?,
            writers: serde_json::from_value(writers)?,
        })
    }
}

/// Genre document: id, name, description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenreRecord {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

impl GenreRecord {
    pub fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.try_get(0)?,
            name: row.try_get(1)?,
            description: row.try_get(2)?,
        })
    }
}

/// Person document: id, full name, films with roles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonRecord {
    pub id: Uuid,
    pub name: String,
    pub films: Vec<FilmRoles>,
}

impl PersonRecord {
    pub fn from_row(row: &Row) -> Result<Self> {
        let films: serde_json::Value = row.try_get(2)?;

        Ok(Self {
            id: row.try_get(0)?,
            name: row.try_get(1)?,
            films: serde_json::from_value(films)?,
        })
    }
}

/// Row mapper for the movies index
pub fn film_document(row: &Row) -> Result<IndexDocument> {
    let record = FilmRecord::from_row(row)?;
    Ok(IndexDocument {
        id: record.id,
        body: serde_json::to_value(&record)?,
    })
}

/// Row mapper for the genres index
pub fn genre_document(row: &Row) -> Result<IndexDocument> {
    let record = GenreRecord::from_row(row)?;
    Ok(IndexDocument {
        id: record.id,
        body: serde_json::to_value(&record)?,
    })
}

/// Row mapper for the persons index
pub fn person_document(row: &Row) -> Result<IndexDocument> {
    let record = PersonRecord::from_row(row)?;
    Ok(IndexDocument {
        id: record.id,
        body: serde_json::to_value(&record)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_film_record_serializes_index_shape() {
        let id = Uuid::new_v4();
        let actor = Uuid::new_v4();
        let record = FilmRecord {
            id,
            title: "Solaris".to_string(),
            description: None,
            imdb_rating: Some(8.1),
            actors_names: vec!["Donatas Banionis".to_string()],
            writers_names: vec![],
            director: vec!["Andrei Tarkovsky".to_string()],
            genre: vec!["Sci-Fi".to_string()],
            actors: vec![PersonRef {
                id: actor,
                name: "Donatas Banionis".to_string(),
            }],
            writers: vec![],
        };

        let body = serde_json::to_value(&record).unwrap();
        assert_eq!(body["id"], serde_json::json!(id.to_string()));
        assert_eq!(body["imdb_rating"], serde_json::json!(8.1));
        assert_eq!(body["description"], serde_json::Value::Null);
        assert_eq!(body["actors"][0]["name"], "Donatas Banionis");
        assert_eq!(body["writers"], serde_json::json!([]));
    }

    #[test]
    fn test_person_record_nested_films() {
        let record = PersonRecord {
            id: Uuid::new_v4(),
            name: "Harrison Ford".to_string(),
            films: vec![FilmRoles {
                id: Uuid::new_v4(),
                roles: vec!["actor".to_string()],
            }],
        };

        let body = serde_json::to_value(&record).unwrap();
        assert_eq!(body["films"][0]["roles"], serde_json::json!(["actor"]));
    }

    #[test]
    fn test_person_ref_round_trip() {
        let json = serde_json::json!([{"id": Uuid::new_v4(), "name": "Jodie Foster"}]);
        let refs: Vec<PersonRef> = serde_json::from_value(json).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name, "Jodie Foster");
    }
}
