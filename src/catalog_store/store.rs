//! SQLite-backed catalogue store implementation.

use super::models::Podcast;
use super::schema::CATALOG_VERSIONED_SCHEMAS;
use super::trait_def::CatalogStore;
use crate::sqlite_persistence::open_connection_pair;
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// SQLite-backed podcast catalogue.
#[derive(Clone)]
pub struct SqliteCatalogStore {
    read_conn: Arc<Mutex<Connection>>,
    write_conn: Arc<Mutex<Connection>>,
}

impl SqliteCatalogStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let (read_conn, write_conn) =
            open_connection_pair(db_path.as_ref(), CATALOG_VERSIONED_SCHEMAS, "catalog")?;

        let count: usize = read_conn.query_row("SELECT COUNT(*) FROM podcasts", [], |r| r.get(0))?;
        info!("Catalog store ready: {} podcasts", count);

        Ok(Self {
            read_conn: Arc::new(Mutex::new(read_conn)),
            write_conn: Arc::new(Mutex::new(write_conn)),
        })
    }

    fn row_to_podcast(row: &Row) -> rusqlite::Result<Podcast> {
        Ok(Podcast {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            publisher: row.get(3)?,
            categories: parse_json_array(row.get(4)?),
            language: row.get(5)?,
            listener_count: row.get::<_, Option<i64>>(6)?.map(|v| v as u64),
            rating: row.get(7)?,
            total_episodes: row.get::<_, Option<i64>>(8)?.map(|v| v as u32),
            avg_episode_minutes: row.get(9)?,
            episodes_per_month: row.get(10)?,
        })
    }
}

const PODCAST_COLUMNS: &str = "id, title, description, publisher, categories, language, \
     listener_count, rating, total_episodes, avg_episode_minutes, episodes_per_month";

// Helper: serialize Vec<String> to JSON text
fn json_array(v: &[String]) -> String {
    serde_json::to_string(v).unwrap_or_else(|_| "[]".to_string())
}

// Helper: deserialize JSON text to Vec<String>, tolerating malformed rows
fn parse_json_array(s: String) -> Vec<String> {
    serde_json::from_str(&s).unwrap_or_else(|e| {
        warn!("Malformed JSON array in catalog db: {}: {}", s, e);
        vec![]
    })
}

impl CatalogStore for SqliteCatalogStore {
    fn get_podcast(&self, podcast_id: &str) -> Result<Option<Podcast>> {
        let conn = self.read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM podcasts WHERE id = ?1",
            PODCAST_COLUMNS
        ))?;
        let result = stmt
            .query_row(params![podcast_id], Self::row_to_podcast)
            .optional()?;
        Ok(result)
    }

    fn get_all_podcasts(&self) -> Result<Vec<Podcast>> {
        let conn = self.read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM podcasts ORDER BY id",
            PODCAST_COLUMNS
        ))?;
        let podcasts = stmt
            .query_map([], Self::row_to_podcast)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(podcasts)
    }

    fn upsert_podcast(&self, podcast: &Podcast) -> Result<()> {
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO podcasts
             (id, title, description, publisher, categories, language,
              listener_count, rating, total_episodes, avg_episode_minutes, episodes_per_month)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                podcast.id,
                podcast.title,
                podcast.description,
                podcast.publisher,
                json_array(&podcast.categories),
                podcast.language,
                podcast.listener_count.map(|v| v as i64),
                podcast.rating,
                podcast.total_episodes.map(|v| v as i64),
                podcast.avg_episode_minutes,
                podcast.episodes_per_month,
            ],
        )?;
        Ok(())
    }

    fn get_podcast_count(&self) -> Result<usize> {
        let conn = self.read_conn.lock().unwrap();
        let count: usize = conn.query_row("SELECT COUNT(*) FROM podcasts", [], |r| r.get(0))?;
        Ok(count)
    }
}
