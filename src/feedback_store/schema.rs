//! SQLite schema definitions for the feedback database.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};

const FEEDBACK_TABLE: Table = Table {
    name: "feedback",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("user_id", &SqlType::Text, non_null = true),
        sqlite_column!("podcast_id", &SqlType::Text, non_null = true),
        sqlite_column!("feedback_type", &SqlType::Text, non_null = true),
        sqlite_column!("rating", &SqlType::Real),
        sqlite_column!("categories", &SqlType::Text, non_null = true), // JSON array
        sqlite_column!("podcast_style", &SqlType::Text),
        sqlite_column!("created_at_ms", &SqlType::Integer, non_null = true),
        sqlite_column!("is_processed", &SqlType::Integer, non_null = true),
    ],
    indices: &[
        ("idx_feedback_user_id", "user_id"),
        ("idx_feedback_podcast_id", "podcast_id"),
        ("idx_feedback_is_processed", "is_processed"),
    ],
};

const PODCAST_ENGAGEMENT_TABLE: Table = Table {
    name: "podcast_engagement",
    columns: &[
        sqlite_column!("podcast_id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("total_feedback", &SqlType::Integer, non_null = true),
        sqlite_column!("likes", &SqlType::Integer, non_null = true),
        sqlite_column!("dislikes", &SqlType::Integer, non_null = true),
        sqlite_column!("saves", &SqlType::Integer, non_null = true),
        sqlite_column!("listens", &SqlType::Integer, non_null = true),
        sqlite_column!("completions", &SqlType::Integer, non_null = true),
        sqlite_column!("average_rating", &SqlType::Real),
        sqlite_column!("updated_at", &SqlType::Integer, non_null = true),
    ],
    indices: &[],
};

pub const FEEDBACK_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[FEEDBACK_TABLE, PODCAST_ENGAGEMENT_TABLE],
    migration: None,
}];
