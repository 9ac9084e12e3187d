//! SQLite-backed author store implementation.

use super::models::{
    AuthorPreferences, PreferenceAdjustment, PreferredLength, StylePreferences, StyleWeights, Topic,
};
use super::schema::AUTHOR_VERSIONED_SCHEMAS;
use super::trait_def::AuthorStore;
use crate::feature_store::ComplexityLevel;
use crate::sqlite_persistence::open_connection_pair;
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// SQLite-backed author store.
#[derive(Clone)]
pub struct SqliteAuthorStore {
    read_conn: Arc<Mutex<Connection>>,
    write_conn: Arc<Mutex<Connection>>,
}

impl SqliteAuthorStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let (read_conn, write_conn) =
            open_connection_pair(db_path.as_ref(), AUTHOR_VERSIONED_SCHEMAS, "author")?;

        let count: usize =
            read_conn.query_row("SELECT COUNT(*) FROM author_preferences", [], |r| r.get(0))?;
        info!("Author store ready: {} authors", count);

        Ok(Self {
            read_conn: Arc::new(Mutex::new(read_conn)),
            write_conn: Arc::new(Mutex::new(write_conn)),
        })
    }
}

fn topics_to_json(topics: &[Topic]) -> String {
    let slugs: Vec<&str> = topics.iter().map(|t| t.as_str()).collect();
    serde_json::to_string(&slugs).unwrap_or_else(|_| "[]".to_string())
}

fn topics_from_json(s: String) -> Vec<Topic> {
    let slugs: Vec<String> = serde_json::from_str(&s).unwrap_or_else(|e| {
        warn!("Malformed topics JSON in author db: {}: {}", s, e);
        vec![]
    });
    slugs.iter().filter_map(|slug| Topic::parse(slug)).collect()
}

fn weights_to_json(weights: &HashMap<String, f64>) -> String {
    serde_json::to_string(weights).unwrap_or_else(|_| "{}".to_string())
}

fn weights_from_json(s: String) -> HashMap<String, f64> {
    serde_json::from_str(&s).unwrap_or_else(|e| {
        warn!("Malformed topic weights JSON in author db: {}: {}", s, e);
        HashMap::new()
    })
}

impl AuthorStore for SqliteAuthorStore {
    fn get_preferences(&self, user_id: &str) -> Result<Option<AuthorPreferences>> {
        let conn = self.read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "SELECT user_id, topics, preferred_length, style_interview, style_storytelling,
                    style_educational, style_debate, expertise_level, updated_at
             FROM author_preferences WHERE user_id = ?1",
        )?;
        let result = stmt
            .query_row(params![user_id], |row| {
                Ok(AuthorPreferences {
                    user_id: row.get(0)?,
                    topics: topics_from_json(row.get(1)?),
                    preferred_length: PreferredLength::parse_lenient(&row.get::<_, String>(2)?),
                    style_preferences: StylePreferences {
                        interview: row.get::<_, i32>(3)? != 0,
                        storytelling: row.get::<_, i32>(4)? != 0,
                        educational: row.get::<_, i32>(5)? != 0,
                        debate: row.get::<_, i32>(6)? != 0,
                    },
                    expertise_level: ComplexityLevel::parse_lenient(&row.get::<_, String>(7)?),
                    updated_at: row.get(8)?,
                })
            })
            .optional()?;
        Ok(result)
    }

    fn upsert_preferences(&self, preferences: &AuthorPreferences) -> Result<()> {
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO author_preferences
             (user_id, topics, preferred_length, style_interview, style_storytelling,
              style_educational, style_debate, expertise_level, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                preferences.user_id,
                topics_to_json(&preferences.topics),
                preferences.preferred_length.as_str(),
                preferences.style_preferences.interview as i32,
                preferences.style_preferences.storytelling as i32,
                preferences.style_preferences.educational as i32,
                preferences.style_preferences.debate as i32,
                preferences.expertise_level.as_str(),
                preferences.updated_at,
            ],
        )?;
        Ok(())
    }

    fn get_adjustment(&self, user_id: &str) -> Result<Option<PreferenceAdjustment>> {
        let conn = self.read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "SELECT user_id, topic_weights, weight_interview, weight_storytelling,
                    weight_educational, weight_debate, last_adjusted
             FROM preference_adjustments WHERE user_id = ?1",
        )?;
        let result = stmt
            .query_row(params![user_id], |row| {
                Ok(PreferenceAdjustment {
                    user_id: row.get(0)?,
                    topic_weights: weights_from_json(row.get(1)?),
                    style_weights: StyleWeights {
                        interview: row.get(2)?,
                        storytelling: row.get(3)?,
                        educational: row.get(4)?,
                        debate: row.get(5)?,
                    },
                    last_adjusted: row.get(6)?,
                })
            })
            .optional()?;
        Ok(result)
    }

    fn upsert_adjustment(&self, adjustment: &PreferenceAdjustment) -> Result<()> {
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO preference_adjustments
             (user_id, topic_weights, weight_interview, weight_storytelling,
              weight_educational, weight_debate, last_adjusted)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                adjustment.user_id,
                weights_to_json(&adjustment.topic_weights),
                adjustment.style_weights.interview,
                adjustment.style_weights.storytelling,
                adjustment.style_weights.educational,
                adjustment.style_weights.debate,
                adjustment.last_adjusted,
            ],
        )?;
        Ok(())
    }
}
