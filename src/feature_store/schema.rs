//! SQLite schema definitions for the feature cache database.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};

const PODCAST_FEATURES_TABLE: Table = Table {
    name: "podcast_features",
    columns: &[
        sqlite_column!("podcast_id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("main_topics", &SqlType::Text, non_null = true), // JSON array
        sqlite_column!("style_interview", &SqlType::Integer, non_null = true),
        sqlite_column!("style_storytelling", &SqlType::Integer, non_null = true),
        sqlite_column!("style_educational", &SqlType::Integer, non_null = true),
        sqlite_column!("style_debate", &SqlType::Integer, non_null = true),
        sqlite_column!("complexity_level", &SqlType::Text, non_null = true),
        sqlite_column!("average_episode_minutes", &SqlType::Real, non_null = true),
        sqlite_column!("update_frequency", &SqlType::Text, non_null = true),
        sqlite_column!("production_quality", &SqlType::Real, non_null = true),
        sqlite_column!("hosting_style", &SqlType::Text, non_null = true), // JSON array
        sqlite_column!("language_complexity", &SqlType::Real, non_null = true),
        sqlite_column!("extracted_at", &SqlType::Integer, non_null = true),
    ],
    indices: &[("idx_features_extracted_at", "extracted_at")],
};

pub const FEATURE_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[PODCAST_FEATURES_TABLE],
    migration: None,
}];
