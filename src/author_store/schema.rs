//! SQLite schema definitions for the author database.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};

const AUTHOR_PREFERENCES_TABLE: Table = Table {
    name: "author_preferences",
    columns: &[
        sqlite_column!("user_id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("topics", &SqlType::Text, non_null = true), // JSON array
        sqlite_column!("preferred_length", &SqlType::Text, non_null = true),
        sqlite_column!("style_interview", &SqlType::Integer, non_null = true),
        sqlite_column!("style_storytelling", &SqlType::Integer, non_null = true),
        sqlite_column!("style_educational", &SqlType::Integer, non_null = true),
        sqlite_column!("style_debate", &SqlType::Integer, non_null = true),
        sqlite_column!("expertise_level", &SqlType::Text, non_null = true),
        sqlite_column!("updated_at", &SqlType::Integer, non_null = true),
    ],
    indices: &[],
};

const PREFERENCE_ADJUSTMENTS_TABLE: Table = Table {
    name: "preference_adjustments",
    columns: &[
        sqlite_column!("user_id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("topic_weights", &SqlType::Text, non_null = true), // JSON object
        sqlite_column!("weight_interview", &SqlType::Real, non_null = true),
        sqlite_column!("weight_storytelling", &SqlType::Real, non_null = true),
        sqlite_column!("weight_educational", &SqlType::Real, non_null = true),
        sqlite_column!("weight_debate", &SqlType::Real, non_null = true),
        sqlite_column!("last_adjusted", &SqlType::Integer, non_null = true),
    ],
    indices: &[],
};

pub const AUTHOR_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[AUTHOR_PREFERENCES_TABLE, PREFERENCE_ADJUSTMENTS_TABLE],
    migration: None,
}];
