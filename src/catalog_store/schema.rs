//! SQLite schema definitions for the catalogue database.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};

const PODCASTS_TABLE: Table = Table {
    name: "podcasts",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("description", &SqlType::Text, non_null = true),
        sqlite_column!("publisher", &SqlType::Text, non_null = true),
        sqlite_column!("categories", &SqlType::Text, non_null = true), // JSON array
        sqlite_column!("language", &SqlType::Text),
        sqlite_column!("listener_count", &SqlType::Integer),
        sqlite_column!("rating", &SqlType::Real),
        sqlite_column!("total_episodes", &SqlType::Integer),
        sqlite_column!("avg_episode_minutes", &SqlType::Real),
        sqlite_column!("episodes_per_month", &SqlType::Real),
    ],
    indices: &[("idx_podcasts_publisher", "publisher")],
};

pub const CATALOG_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[PODCASTS_TABLE],
    migration: None,
}];
