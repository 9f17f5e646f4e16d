//! Index mappings and settings
//!
//! All indexes share one analysis chain: a combined `ru_en` analyzer with
//! English and Russian stemming and stop words. Mappings are strict so a
//! document with an unexpected field is rejected instead of widening the
//! schema silently.

use crate::domain::SearchIndex;
use serde_json::{json, Value};

/// Analysis settings shared by every index
fn index_settings() -> Value {
    json!({
        "refresh_interval": "1s",
        "analysis": {
            "filter": {
                "english_stop": {"type": "stop", "stopwords": "_english_"},
                "english_stemmer": {"type": "stemmer", "language": "english"},
                "english_possessive_stemmer": {
                    "type": "stemmer",
                    "language": "possessive_english"
                },
                "russian_stop": {"type": "stop", "stopwords": "_russian_"},
                "russian_stemmer": {"type": "stemmer", "language": "russian"}
            },
            "analyzer": {
                "ru_en": {
                    "tokenizer": "standard",
                    "filter": [
                        "lowercase",
                        "english_stop",
                        "english_stemmer",
                        "english_possessive_stemmer",
                        "russian_stop",
                        "russian_stemmer"
                    ]
                }
            }
        }
    })
}

fn movies_mapping() -> Value {
    json!({
        "dynamic": "strict",
        "properties": {
            "id": {"type": "keyword"},
            "imdb_rating": {"type": "float"},
            "genre": {"type": "keyword"},
            "title": {
                "type": "text",
                "analyzer": "ru_en",
                "fields": {"raw": {"type": "keyword"}}
            },
            "description": {"type": "text", "analyzer": "ru_en"},
            "director": {"type": "text", "analyzer": "ru_en"},
            "actors_names": {"type": "text", "analyzer": "ru_en"},
            "writers_names": {"type": "text", "analyzer": "ru_en"},
            "actors": {
                "type": "nested",
                "dynamic": "strict",
                "properties": {
                    "id": {"type": "keyword"},
                    "name": {"type": "text", "analyzer": "ru_en"}
                }
            },
            "writers": {
                "type": "nested",
                "dynamic": "strict",
                "properties": {
                    "id": {"type": "keyword"},
                    "name": {"type": "text", "analyzer": "ru_en"}
                }
            }
        }
    })
}

fn genres_mapping() -> Value {
    json!({
        "dynamic": "strict",
        "properties": {
            "id": {"type": "keyword"},
            "name": {"type": "text", "analyzer": "ru_en"},
            "description": {"type": "text", "analyzer": "ru_en"}
        }
    })
}

fn persons_mapping() -> Value {
    json!({
        "dynamic": "strict",
        "properties": {
            "id": {"type": "keyword"},
            "name": {"type": "text", "analyzer": "ru_en"},
            "films": {
                "type": "nested",
                "dynamic": "strict",
                "properties": {
                    "id": {"type": "keyword"},
                    "roles": {"type": "text", "analyzer": "ru_en"}
                }
            }
        }
    })
}

/// Full create-index body (settings + mappings) for `index`
pub fn index_body(index: SearchIndex) -> Value {
    let mappings = match index {
        SearchIndex::Movies => movies_mapping(),
        SearchIndex::Genres => genres_mapping(),
        SearchIndex::Persons => persons_mapping(),
    };

    json!({
        "settings": index_settings(),
        "mappings": mappings
    })
}
