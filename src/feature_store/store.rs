//! SQLite-backed feature cache implementation.

use super::models::{
    ComplexityLevel, ContentStyle, FeatureCacheStats, PodcastFeatures, UpdateFrequency,
};
use super::schema::FEATURE_VERSIONED_SCHEMAS;
use super::trait_def::FeatureStore;
use crate::sqlite_persistence::open_connection_pair;
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// SQLite-backed feature cache.
#[derive(Clone)]
pub struct SqliteFeatureStore {
    read_conn: Arc<Mutex<Connection>>,
    write_conn: Arc<Mutex<Connection>>,
}

impl SqliteFeatureStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let (read_conn, write_conn) =
            open_connection_pair(db_path.as_ref(), FEATURE_VERSIONED_SCHEMAS, "features")?;

        let count: usize =
            read_conn.query_row("SELECT COUNT(*) FROM podcast_features", [], |r| r.get(0))?;
        info!("Feature store ready: {} podcasts cached", count);

        Ok(Self {
            read_conn: Arc::new(Mutex::new(read_conn)),
            write_conn: Arc::new(Mutex::new(write_conn)),
        })
    }

    fn row_to_features(row: &Row) -> rusqlite::Result<PodcastFeatures> {
        Ok(PodcastFeatures {
            podcast_id: row.get(0)?,
            main_topics: parse_json_array(row.get(1)?),
            content_style: ContentStyle {
                interview: row.get::<_, i32>(2)? != 0,
                storytelling: row.get::<_, i32>(3)? != 0,
                educational: row.get::<_, i32>(4)? != 0,
                debate: row.get::<_, i32>(5)? != 0,
            },
            complexity_level: ComplexityLevel::parse_lenient(&row.get::<_, String>(6)?),
            average_episode_minutes: row.get(7)?,
            update_frequency: UpdateFrequency::parse_lenient(&row.get::<_, String>(8)?),
            production_quality: row.get(9)?,
            hosting_style: parse_json_array(row.get(10)?),
            language_complexity: row.get(11)?,
            extracted_at: row.get(12)?,
        })
    }
}

fn json_array(v: &[String]) -> String {
    serde_json::to_string(v).unwrap_or_else(|_| "[]".to_string())
}

fn parse_json_array(s: String) -> Vec<String> {
    serde_json::from_str(&s).unwrap_or_else(|e| {
        warn!("Malformed JSON array in feature db: {}: {}", s, e);
        vec![]
    })
}

impl FeatureStore for SqliteFeatureStore {
    fn get_features(&self, podcast_id: &str) -> Result<Option<PodcastFeatures>> {
        let conn = self.read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "SELECT podcast_id, main_topics, style_interview, style_storytelling,
                    style_educational, style_debate, complexity_level,
                    average_episode_minutes, update_frequency, production_quality,
                    hosting_style, language_complexity, extracted_at
             FROM podcast_features WHERE podcast_id = ?1",
        )?;
        let result = stmt
            .query_row(params![podcast_id], Self::row_to_features)
            .optional()?;
        Ok(result)
    }

    fn upsert_features(&self, features: &PodcastFeatures) -> Result<()> {
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO podcast_features
             (podcast_id, main_topics, style_interview, style_storytelling,
              style_educational, style_debate, complexity_level,
              average_episode_minutes, update_frequency, production_quality,
              hosting_style, language_complexity, extracted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                features.podcast_id,
                json_array(&features.main_topics),
                features.content_style.interview as i32,
                features.content_style.storytelling as i32,
                features.content_style.educational as i32,
                features.content_style.debate as i32,
                features.complexity_level.as_str(),
                features.average_episode_minutes,
                features.update_frequency.as_str(),
                features.production_quality,
                json_array(&features.hosting_style),
                features.language_complexity,
                features.extracted_at,
            ],
        )?;
        Ok(())
    }

    fn delete_features_older_than(&self, cutoff_epoch: i64) -> Result<usize> {
        let conn = self.write_conn.lock().unwrap();
        let deleted = conn.execute(
            "DELETE FROM podcast_features WHERE extracted_at < ?1",
            params![cutoff_epoch],
        )?;
        Ok(deleted)
    }

    fn get_feature_stats(&self) -> Result<FeatureCacheStats> {
        let conn = self.read_conn.lock().unwrap();
        let cached_podcasts: usize =
            conn.query_row("SELECT COUNT(*) FROM podcast_features", [], |r| r.get(0))?;
        let oldest_extracted_at: Option<i64> =
            conn.query_row("SELECT MIN(extracted_at) FROM podcast_features", [], |r| {
                r.get(0)
            })?;
        Ok(FeatureCacheStats {
            cached_podcasts,
            oldest_extracted_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (SqliteFeatureStore, TempDir) {
        let tmp = TempDir::new().unwrap();
        let db_path = tmp.path().join("features.db");
        let store = SqliteFeatureStore::new(&db_path).unwrap();
        (store, tmp)
    }

    fn make_features(podcast_id: &str, extracted_at: i64) -> PodcastFeatures {
        PodcastFeatures {
            podcast_id: podcast_id.to_string(),
            main_topics: vec!["technology".to_string(), "startups".to_string()],
            content_style: ContentStyle {
                interview: true,
                storytelling: false,
                educational: true,
                debate: false,
            },
            complexity_level: ComplexityLevel::Advanced,
            average_episode_minutes: 42.5,
            update_frequency: UpdateFrequency::Weekly,
            production_quality: 0.8,
            hosting_style: vec!["conversational".to_string()],
            language_complexity: 0.6,
            extracted_at,
        }
    }

    #[test]
    fn test_features_roundtrip() {
        let (store, _tmp) = create_test_store();
        let features = make_features("pod1", 1700000000);

        store.upsert_features(&features).unwrap();

        let result = store.get_features("pod1").unwrap().unwrap();
        assert_eq!(result.main_topics, features.main_topics);
        assert!(result.content_style.interview);
        assert!(!result.content_style.debate);
        assert_eq!(result.complexity_level, ComplexityLevel::Advanced);
        assert_eq!(result.update_frequency, UpdateFrequency::Weekly);
        assert!((result.average_episode_minutes - 42.5).abs() < f64::EPSILON);
        assert!((result.production_quality - 0.8).abs() < f64::EPSILON);
        assert_eq!(result.extracted_at, 1700000000);

        assert!(store.get_features("nonexistent").unwrap().is_none());
    }

    #[test]
    fn test_upsert_replaces_whole_record() {
        let (store, _tmp) = create_test_store();
        store.upsert_features(&make_features("pod1", 1700000000)).unwrap();

        let mut recomputed = make_features("pod1", 1700090000);
        recomputed.main_topics = vec!["health".to_string()];
        recomputed.production_quality = 0.4;
        store.upsert_features(&recomputed).unwrap();

        let result = store.get_features("pod1").unwrap().unwrap();
        assert_eq!(result.main_topics, vec!["health".to_string()]);
        assert!((result.production_quality - 0.4).abs() < f64::EPSILON);
        assert_eq!(result.extracted_at, 1700090000);
        assert_eq!(store.get_feature_stats().unwrap().cached_podcasts, 1);
    }

    #[test]
    fn test_delete_features_older_than() {
        let (store, _tmp) = create_test_store();
        store.upsert_features(&make_features("old", 1000)).unwrap();
        store.upsert_features(&make_features("fresh", 2000)).unwrap();

        let deleted = store.delete_features_older_than(1500).unwrap();
        assert_eq!(deleted, 1);
        assert!(store.get_features("old").unwrap().is_none());
        assert!(store.get_features("fresh").unwrap().is_some());
    }

    #[test]
    fn test_feature_stats() {
        let (store, _tmp) = create_test_store();
        let stats = store.get_feature_stats().unwrap();
        assert_eq!(stats.cached_podcasts, 0);
        assert!(stats.oldest_extracted_at.is_none());

        store.upsert_features(&make_features("a", 500)).unwrap();
        store.upsert_features(&make_features("b", 900)).unwrap();

        let stats = store.get_feature_stats().unwrap();
        assert_eq!(stats.cached_podcasts, 2);
        assert_eq!(stats.oldest_extracted_at, Some(500));
    }
}
