//! SQLite-backed feedback store implementation.

use super::models::{
    FeedbackDetails, FeedbackStats, FeedbackType, PodcastEngagement, PodcastStyle,
};
use super::schema::FEEDBACK_VERSIONED_SCHEMAS;
use super::trait_def::FeedbackStore;
use crate::sqlite_persistence::open_connection_pair;
use anyhow::{bail, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// SQLite-backed feedback store.
#[derive(Clone)]
pub struct SqliteFeedbackStore {
    read_conn: Arc<Mutex<Connection>>,
    write_conn: Arc<Mutex<Connection>>,
}

impl SqliteFeedbackStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let (read_conn, write_conn) =
            open_connection_pair(db_path.as_ref(), FEEDBACK_VERSIONED_SCHEMAS, "feedback")?;

        let stats = Self::count_rows(&read_conn)?;
        info!(
            "Feedback store ready: {} rows, {} unprocessed",
            stats.total, stats.unprocessed
        );

        Ok(Self {
            read_conn: Arc::new(Mutex::new(read_conn)),
            write_conn: Arc::new(Mutex::new(write_conn)),
        })
    }

    fn count_rows(conn: &Connection) -> Result<FeedbackStats> {
        let total: usize = conn.query_row("SELECT COUNT(*) FROM feedback", [], |r| r.get(0))?;
        let unprocessed: usize = conn.query_row(
            "SELECT COUNT(*) FROM feedback WHERE is_processed = 0",
            [],
            |r| r.get(0),
        )?;
        Ok(FeedbackStats { total, unprocessed })
    }

    fn row_to_feedback(row: &Row) -> rusqlite::Result<FeedbackDetails> {
        let type_str: String = row.get(3)?;
        let feedback_type = FeedbackType::parse(&type_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                3,
                rusqlite::types::Type::Text,
                format!("unknown feedback type: {}", type_str).into(),
            )
        })?;
        Ok(FeedbackDetails {
            id: row.get(0)?,
            user_id: row.get(1)?,
            podcast_id: row.get(2)?,
            feedback_type,
            rating: row.get(4)?,
            categories: parse_json_array(row.get(5)?),
            podcast_style: row
                .get::<_, Option<String>>(6)?
                .and_then(|s| PodcastStyle::parse(&s)),
            created_at_ms: row.get(7)?,
            is_processed: row.get::<_, i32>(8)? != 0,
        })
    }
}

const FEEDBACK_COLUMNS: &str = "id, user_id, podcast_id, feedback_type, rating, categories, \
     podcast_style, created_at_ms, is_processed";

fn json_array(v: &[String]) -> String {
    serde_json::to_string(v).unwrap_or_else(|_| "[]".to_string())
}

fn parse_json_array(s: String) -> Vec<String> {
    serde_json::from_str(&s).unwrap_or_else(|e| {
        warn!("Malformed JSON array in feedback db: {}: {}", s, e);
        vec![]
    })
}

impl FeedbackStore for SqliteFeedbackStore {
    fn insert_feedback(&self, feedback: &FeedbackDetails) -> Result<()> {
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            "INSERT INTO feedback
             (id, user_id, podcast_id, feedback_type, rating, categories,
              podcast_style, created_at_ms, is_processed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                feedback.id,
                feedback.user_id,
                feedback.podcast_id,
                feedback.feedback_type.as_str(),
                feedback.rating,
                json_array(&feedback.categories),
                feedback.podcast_style.map(|s| s.as_str()),
                feedback.created_at_ms,
                feedback.is_processed as i32,
            ],
        )?;
        Ok(())
    }

    fn get_unprocessed_feedback(&self, limit: usize) -> Result<Vec<FeedbackDetails>> {
        let conn = self.read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM feedback WHERE is_processed = 0 ORDER BY created_at_ms ASC LIMIT ?1",
            FEEDBACK_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![limit], Self::row_to_feedback)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn mark_feedback_processed(&self, feedback_id: &str) -> Result<()> {
        let conn = self.write_conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE feedback SET is_processed = 1 WHERE id = ?1",
            params![feedback_id],
        )?;
        if updated == 0 {
            bail!("No feedback row with id {}", feedback_id);
        }
        Ok(())
    }

    fn get_feedback_for_user(&self, user_id: &str) -> Result<Vec<FeedbackDetails>> {
        let conn = self.read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM feedback WHERE user_id = ?1 ORDER BY created_at_ms ASC",
            FEEDBACK_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![user_id], Self::row_to_feedback)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn get_feedback_for_podcast(&self, podcast_id: &str) -> Result<Vec<FeedbackDetails>> {
        let conn = self.read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM feedback WHERE podcast_id = ?1 ORDER BY created_at_ms ASC",
            FEEDBACK_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![podcast_id], Self::row_to_feedback)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn upsert_engagement(&self, engagement: &PodcastEngagement) -> Result<()> {
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO podcast_engagement
             (podcast_id, total_feedback, likes, dislikes, saves, listens,
              completions, average_rating, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                engagement.podcast_id,
                engagement.total_feedback,
                engagement.likes,
                engagement.dislikes,
                engagement.saves,
                engagement.listens,
                engagement.completions,
                engagement.average_rating,
                engagement.updated_at,
            ],
        )?;
        Ok(())
    }

    fn get_engagement(&self, podcast_id: &str) -> Result<Option<PodcastEngagement>> {
        let conn = self.read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "SELECT podcast_id, total_feedback, likes, dislikes, saves, listens,
                    completions, average_rating, updated_at
             FROM podcast_engagement WHERE podcast_id = ?1",
        )?;
        let result = stmt
            .query_row(params![podcast_id], |row| {
                Ok(PodcastEngagement {
                    podcast_id: row.get(0)?,
                    total_feedback: row.get(1)?,
                    likes: row.get(2)?,
                    dislikes: row.get(3)?,
                    saves: row.get(4)?,
                    listens: row.get(5)?,
                    completions: row.get(6)?,
                    average_rating: row.get(7)?,
                    updated_at: row.get(8)?,
                })
            })
            .optional()?;
        Ok(result)
    }

    fn get_feedback_stats(&self) -> Result<FeedbackStats> {
        let conn = self.read_conn.lock().unwrap();
        Self::count_rows(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (SqliteFeedbackStore, TempDir) {
        let tmp = TempDir::new().unwrap();
        let db_path = tmp.path().join("feedback.db");
        let store = SqliteFeedbackStore::new(&db_path).unwrap();
        (store, tmp)
    }

    fn make_feedback(id: &str, user_id: &str, created_at_ms: i64) -> FeedbackDetails {
        FeedbackDetails {
            id: id.to_string(),
            user_id: user_id.to_string(),
            podcast_id: "pod1".to_string(),
            feedback_type: FeedbackType::Like,
            rating: Some(4.0),
            categories: vec!["technology".to_string()],
            podcast_style: Some(PodcastStyle::Interview),
            created_at_ms,
            is_processed: false,
        }
    }

    #[test]
    fn test_feedback_roundtrip() {
        let (store, _tmp) = create_test_store();
        store.insert_feedback(&make_feedback("f1", "user1", 1000)).unwrap();

        let rows = store.get_feedback_for_user("user1").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].feedback_type, FeedbackType::Like);
        assert_eq!(rows[0].podcast_style, Some(PodcastStyle::Interview));
        assert_eq!(rows[0].categories, vec!["technology".to_string()]);
        assert!(!rows[0].is_processed);
    }

    #[test]
    fn test_unprocessed_queue_ordering_and_limit() {
        let (store, _tmp) = create_test_store();
        store.insert_feedback(&make_feedback("f3", "user1", 3000)).unwrap();
        store.insert_feedback(&make_feedback("f1", "user1", 1000)).unwrap();
        store.insert_feedback(&make_feedback("f2", "user1", 2000)).unwrap();

        let rows = store.get_unprocessed_feedback(2).unwrap();
        assert_eq!(rows.len(), 2);
        // Oldest first
        assert_eq!(rows[0].id, "f1");
        assert_eq!(rows[1].id, "f2");
    }

    #[test]
    fn test_mark_processed_removes_from_queue() {
        let (store, _tmp) = create_test_store();
        store.insert_feedback(&make_feedback("f1", "user1", 1000)).unwrap();
        store.insert_feedback(&make_feedback("f2", "user1", 2000)).unwrap();

        store.mark_feedback_processed("f1").unwrap();

        let rows = store.get_unprocessed_feedback(10).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "f2");

        // Processed rows are still part of the user's history
        let history = store.get_feedback_for_user("user1").unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].is_processed);
    }

    #[test]
    fn test_mark_processed_unknown_id_fails() {
        let (store, _tmp) = create_test_store();
        assert!(store.mark_feedback_processed("nope").is_err());
    }

    #[test]
    fn test_feedback_for_podcast() {
        let (store, _tmp) = create_test_store();
        store.insert_feedback(&make_feedback("f1", "user1", 1000)).unwrap();
        let mut other = make_feedback("f2", "user2", 2000);
        other.podcast_id = "pod2".to_string();
        store.insert_feedback(&other).unwrap();

        let rows = store.get_feedback_for_podcast("pod1").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_id, "user1");
    }

    #[test]
    fn test_engagement_roundtrip() {
        let (store, _tmp) = create_test_store();
        let engagement = PodcastEngagement {
            podcast_id: "pod1".to_string(),
            total_feedback: 10,
            likes: 4,
            dislikes: 1,
            saves: 2,
            listens: 2,
            completions: 1,
            average_rating: Some(4.2),
            updated_at: 1700000000,
        };
        store.upsert_engagement(&engagement).unwrap();

        let result = store.get_engagement("pod1").unwrap().unwrap();
        assert_eq!(result.total_feedback, 10);
        assert_eq!(result.likes, 4);
        assert!((result.average_rating.unwrap() - 4.2).abs() < f64::EPSILON);

        assert!(store.get_engagement("nonexistent").unwrap().is_none());
    }

    #[test]
    fn test_feedback_stats() {
        let (store, _tmp) = create_test_store();
        store.insert_feedback(&make_feedback("f1", "user1", 1000)).unwrap();
        store.insert_feedback(&make_feedback("f2", "user1", 2000)).unwrap();
        store.mark_feedback_processed("f1").unwrap();

        let stats = store.get_feedback_stats().unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.unprocessed, 1);
    }

    #[test]
    fn test_feedback_without_optional_fields() {
        let (store, _tmp) = create_test_store();
        let feedback = FeedbackDetails {
            id: "f1".to_string(),
            user_id: "user1".to_string(),
            podcast_id: "pod1".to_string(),
            feedback_type: FeedbackType::Listen,
            rating: None,
            categories: vec![],
            podcast_style: None,
            created_at_ms: 1000,
            is_processed: false,
        };
        store.insert_feedback(&feedback).unwrap();

        let rows = store.get_feedback_for_user("user1").unwrap();
        assert!(rows[0].rating.is_none());
        assert!(rows[0].podcast_style.is_none());
        assert!(rows[0].categories.is_empty());
    }
}
