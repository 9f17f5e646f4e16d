//! SQL templates for the four extraction query shapes
//!
//! Pure string templating. Table and column identifiers are substituted from
//! static configuration only; runtime values always travel as positional
//! binds (`$1` = window start, `$2` = window end, `$1` = id array for
//! transforms), never as concatenated text.

/// Ids of base-table rows whose `updated_at` falls in the half-open window
/// `[$1, $2)`.
///
/// The scan is ordered by `updated_at` with `id` as tie-break so adjacent
/// windows neither skip nor double-count rows sharing a boundary timestamp.
pub fn target_query(base_table: &str) -> String {
    format!(
        "SELECT id \
         FROM {base_table} \
         WHERE updated_at >= $1 AND updated_at < $2 \
         ORDER BY updated_at, id"
    )
}

/// Distinct base-table ids reachable through the join table from related
/// rows whose `updated_at` falls in `[$1, $2)`.
pub fn related_query(
    base_table: &str,
    related_table: &str,
    join_table: &str,
    base_id_column: &str,
    related_id_column: &str,
) -> String {
    format!(
        "SELECT DISTINCT b.id \
         FROM {related_table} related \
         JOIN {join_table} m2m ON related.id = m2m.{related_id_column} \
         JOIN {base_table} b ON m2m.{base_id_column} = b.id \
         WHERE related.updated_at >= $1 AND related.updated_at < $2"
    )
}

/// Minimum `updated_at` across the base table; NULL when the table is empty.
pub fn earliest_update_query(base_table: &str) -> String {
    format!("SELECT MIN(updated_at) FROM {base_table}")
}

/// Denormalized film rows for the ids in `$1`, one row per film.
///
/// Column order must match `FilmRecord::from_row`.
pub const FILM_TRANSFORM_QUERY: &str = "\
    SELECT
        fw.id,
        fw.title,
        fw.description,
        fw.rating AS imdb_rating,
        COALESCE(
            array_agg(DISTINCT p.full_name)
            FILTER (WHERE p.id IS NOT NULL AND pfw.role = 'actor'),
            ARRAY[]::text[]
        ) AS actors_names,
        COALESCE(
            array_agg(DISTINCT p.full_name)
            FILTER (WHERE p.id IS NOT NULL AND pfw.role = 'writer'),
            ARRAY[]::text[]
        ) AS writers_names,
        COALESCE(
            array_agg(DISTINCT p.full_name)
            FILTER (WHERE p.id IS NOT NULL AND pfw.role = 'director'),
            ARRAY[]::text[]
        ) AS director,
        COALESCE(
            array_agg(DISTINCT g.name) FILTER (WHERE g.id IS NOT NULL),
            ARRAY[]::text[]
        ) AS genre,
        COALESCE(
            json_agg(
                DISTINCT jsonb_build_object('id', p.id, 'name', p.full_name)
            ) FILTER (WHERE p.id IS NOT NULL AND pfw.role = 'actor'),
            '[]'::json
        ) AS actors,
        COALESCE(
            json_agg(
                DISTINCT jsonb_build_object('id', p.id, 'name', p.full_name)
            ) FILTER (WHERE p.id IS NOT NULL AND pfw.role = 'writer'),
            '[]'::json
        ) AS writers
    FROM content.film_work fw
    LEFT JOIN content.person_film_work pfw ON pfw.film_work_id = fw.id
    LEFT JOIN content.person p ON p.id = pfw.person_id
    LEFT JOIN content.genre_film_work gfw ON gfw.film_work_id = fw.id
    LEFT JOIN content.genre g ON g.id = gfw.genre_id
    WHERE fw.id = ANY($1)
    GROUP BY fw.id";

/// Genre rows for the ids in `$1`. Column order matches
/// `GenreRecord::from_row`.
pub const GENRE_TRANSFORM_QUERY: &str = "\
    SELECT g.id, g.name, g.description
    FROM content.genre g
    WHERE g.id = ANY($1)";

/// Person rows with per-film role aggregation for the ids in `$1`.
///
/// Column order matches `PersonRecord::from_row`.
pub const PERSON_TRANSFORM_QUERY: &str = "\
    SELECT
        p.id,
        p.full_name,
        COALESCE(jsonb_agg(film_roles) FILTER (WHERE film_roles IS NOT NULL), '[]'::jsonb) AS films
    FROM content.person p
    LEFT JOIN (
        SELECT
            pfw.person_id,
            jsonb_build_object(
                'id', fw.id,
                'roles', COALESCE(
                    array_agg(DISTINCT pfw.role) FILTER (WHERE pfw.role IS NOT NULL),
                    ARRAY[]::text[]
                )
            ) AS film_roles
        FROM content.person_film_work pfw
        LEFT JOIN content.film_work fw ON fw.id = pfw.film_work_id
        GROUP BY pfw.person_id, fw.id
    ) roles ON roles.person_id = p.id
    WHERE p.id = ANY($1)
    GROUP BY p.id, p.full_name";
