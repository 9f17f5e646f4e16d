//! Receiver wiring for the three catalog entity kinds
//!
//! The film index depends on genres and people through the two join tables;
//! the person index depends on films through `person_film_work`; genres
//! stand alone. This is the full static relation map, checked here once at
//! construction rather than discovered at query time.

use crate::adapters::postgres::CatalogClient;
use crate::config::{RetryConfig, SyncConfig};
use crate::core::extract::orchestrator::SyncOrchestrator;
use crate::core::extract::planner::{QueryPlanner, RelatedTableBinding};
use crate::core::extract::query;
use crate::core::extract::receiver::EntityReceiver;
use crate::domain::records;
use crate::domain::{CatalogTable, SearchIndex};
use std::sync::Arc;

/// Build the orchestrator with receivers for films, genres and people
pub fn build_orchestrator(
    client: Arc<CatalogClient>,
    sync: &SyncConfig,
    retry: &RetryConfig,
) -> SyncOrchestrator {
    let film_planner = QueryPlanner::new(
        CatalogTable::FilmWork,
        query::FILM_TRANSFORM_QUERY,
        [
            (
                CatalogTable::Genre,
                RelatedTableBinding {
                    join_table: "content.genre_film_work",
                    base_id_column: "film_work_id",
                    related_id_column: "genre_id",
                },
            ),
            (
                CatalogTable::Person,
                RelatedTableBinding {
                    join_table: "content.person_film_work",
                    base_id_column: "film_work_id",
                    related_id_column: "person_id",
                },
            ),
        ],
    );

    let genre_planner = QueryPlanner::new(CatalogTable::Genre, query::GENRE_TRANSFORM_QUERY, []);

    let person_planner = QueryPlanner::new(
        CatalogTable::Person,
        query::PERSON_TRANSFORM_QUERY,
        [(
            CatalogTable::FilmWork,
            RelatedTableBinding {
                join_table: "content.person_film_work",
                base_id_column: "person_id",
                related_id_column: "film_work_id",
            },
        )],
    );

    let receivers = vec![
        EntityReceiver::new(
            SearchIndex::Movies,
            film_planner,
            records::film_document,
            client.clone(),
            sync.fetch_size,
            sync.id_chunk_size,
            retry.clone(),
        ),
        EntityReceiver::new(
            SearchIndex::Genres,
            genre_planner,
            records::genre_document,
            client.clone(),
            sync.fetch_size,
            sync.id_chunk_size,
            retry.clone(),
        ),
        EntityReceiver::new(
            SearchIndex::Persons,
            person_planner,
            records::person_document,
            client,
            sync.fetch_size,
            sync.id_chunk_size,
            retry.clone(),
        ),
    ];

    SyncOrchestrator::new(receivers)
}
