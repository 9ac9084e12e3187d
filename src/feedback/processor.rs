//! Consumes the feedback log and derives adjusted preference weights.
//!
//! Weights are always recomputed from a user's entire feedback history, so
//! processing the same rows twice converges on the same stored state. One
//! bad row is logged and skipped; the batch keeps going. That is the
//! mirror image of the results processor's fail-fast stance: feedback is
//! user-sourced and must tolerate partial bad data.

use super::clock::Clock;
use crate::author_store::{AuthorStore, PreferenceAdjustment, StyleWeights};
use crate::config::FeedbackSettings;
use crate::feedback_store::{FeedbackDetails, FeedbackStore, PodcastEngagement, PodcastStyle};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Exponential decay time constant: signal loses ~63% of its weight over
/// 30 days, favoring recent interactions.
pub const DECAY_TIME_CONSTANT_MS: f64 = 30.0 * 24.0 * 60.0 * 60.0 * 1000.0;

/// Outcome of one queue-processing run.
#[derive(Debug, Clone, Default)]
pub struct ProcessingStats {
    /// Rows pulled from the unprocessed queue.
    pub pulled: usize,
    pub processed: usize,
    pub failed: usize,
}

/// Background batch processor for feedback.
///
/// Constructed with injected stores, clock and settings; safe to invoke
/// repeatedly and concurrently because every run is a full recompute.
pub struct FeedbackProcessor {
    feedback_store: Arc<dyn FeedbackStore>,
    author_store: Arc<dyn AuthorStore>,
    clock: Arc<dyn Clock>,
    settings: FeedbackSettings,
}

impl FeedbackProcessor {
    pub fn new(
        feedback_store: Arc<dyn FeedbackStore>,
        author_store: Arc<dyn AuthorStore>,
        clock: Arc<dyn Clock>,
        settings: FeedbackSettings,
    ) -> Self {
        Self {
            feedback_store,
            author_store,
            clock,
            settings,
        }
    }

    /// Pull up to the configured batch of unprocessed rows and handle each
    /// one: recompute the user's adjustment, refresh the podcast's
    /// metrics, flag the row processed. Per-item failures are logged and
    /// do not abort the rest of the batch.
    pub fn process_feedback_queue(&self) -> Result<ProcessingStats> {
        let batch = self
            .feedback_store
            .get_unprocessed_feedback(self.settings.batch_size)
            .context("Failed to pull unprocessed feedback")?;

        let mut stats = ProcessingStats {
            pulled: batch.len(),
            ..Default::default()
        };

        for row in &batch {
            match self.process_one(row) {
                Ok(()) => stats.processed += 1,
                Err(e) => {
                    warn!(
                        feedback_id = %row.id,
                        user_id = %row.user_id,
                        "Failed to process feedback row: {:#}", e
                    );
                    stats.failed += 1;
                }
            }
        }

        if stats.pulled > 0 {
            info!(
                "Feedback queue run: {} pulled, {} processed, {} failed",
                stats.pulled, stats.processed, stats.failed
            );
        }
        Ok(stats)
    }

    fn process_one(&self, row: &FeedbackDetails) -> Result<()> {
        let adjustment = self.compute_adjustment(&row.user_id)?;
        self.author_store
            .upsert_adjustment(&adjustment)
            .context("Failed to store adjustment")?;
        self.update_metrics(&row.podcast_id)?;
        self.feedback_store
            .mark_feedback_processed(&row.id)
            .context("Failed to flag feedback processed")?;
        Ok(())
    }

    /// Recompute the full preference adjustment for one user from their
    /// entire feedback history.
    pub fn compute_adjustment(&self, user_id: &str) -> Result<PreferenceAdjustment> {
        let history = self
            .feedback_store
            .get_feedback_for_user(user_id)
            .context("Failed to load feedback history")?;
        let now_ms = self.clock.now().timestamp_millis();

        let topic_weights = topic_weights(&history, now_ms);
        let style_weights = style_weights(&history, now_ms);

        debug!(
            user_id,
            topics = topic_weights.len(),
            "Recomputed preference adjustment"
        );

        Ok(PreferenceAdjustment {
            user_id: user_id.to_string(),
            topic_weights,
            style_weights,
            last_adjusted: self.clock.now().timestamp(),
        })
    }

    /// Recompute aggregate engagement metrics for a podcast from its full
    /// feedback history and upsert them.
    pub fn update_metrics(&self, podcast_id: &str) -> Result<()> {
        let history = self
            .feedback_store
            .get_feedback_for_podcast(podcast_id)
            .context("Failed to load podcast feedback")?;

        let mut engagement = PodcastEngagement {
            podcast_id: podcast_id.to_string(),
            total_feedback: history.len() as u32,
            likes: 0,
            dislikes: 0,
            saves: 0,
            listens: 0,
            completions: 0,
            average_rating: None,
            updated_at: self.clock.now().timestamp(),
        };

        let mut rating_sum = 0.0;
        let mut rating_count = 0u32;
        for row in &history {
            use crate::feedback_store::FeedbackType::*;
            match row.feedback_type {
                Like => engagement.likes += 1,
                Dislike => engagement.dislikes += 1,
                Save => engagement.saves += 1,
                Listen => engagement.listens += 1,
                Complete => engagement.completions += 1,
            }
            if let Some(rating) = row.rating {
                rating_sum += rating;
                rating_count += 1;
            }
        }
        if rating_count > 0 {
            engagement.average_rating = Some(rating_sum / rating_count as f64);
        }

        self.feedback_store
            .upsert_engagement(&engagement)
            .context("Failed to store engagement metrics")
    }
}

fn decay_factor(age_ms: i64) -> f64 {
    (-(age_ms.max(0) as f64) / DECAY_TIME_CONSTANT_MS).exp()
}

/// Decayed positive-interaction weight per topic, normalized to sum to 1
/// over the observed topics.
fn topic_weights(history: &[FeedbackDetails], now_ms: i64) -> HashMap<String, f64> {
    let mut weights: HashMap<String, f64> = HashMap::new();

    for row in history {
        if !row.feedback_type.is_positive() {
            continue;
        }
        let decay = decay_factor(now_ms - row.created_at_ms);
        for category in &row.categories {
            let topic = category.trim().to_lowercase();
            if topic.is_empty() {
                continue;
            }
            *weights.entry(topic).or_insert(0.0) += decay;
        }
    }

    let total: f64 = weights.values().sum();
    if total > 0.0 {
        for weight in weights.values_mut() {
            *weight /= total;
        }
    }
    weights
}

/// Decayed style weights from like/complete events, normalized to sum to
/// 1. Without usable signal every style gets an equal 0.25.
fn style_weights(history: &[FeedbackDetails], now_ms: i64) -> StyleWeights {
    let mut interview = 0.0;
    let mut storytelling = 0.0;
    let mut educational = 0.0;
    let mut debate = 0.0;

    for row in history {
        if !row.feedback_type.is_style_signal() {
            continue;
        }
        let Some(style) = row.podcast_style else {
            continue;
        };
        let decay = decay_factor(now_ms - row.created_at_ms);
        match style {
            PodcastStyle::Interview => interview += decay,
            PodcastStyle::Narrative => storytelling += decay,
            PodcastStyle::Educational => educational += decay,
            PodcastStyle::Debate => debate += decay,
        }
    }

    let total = interview + storytelling + educational + debate;
    if total <= 0.0 {
        return StyleWeights::default();
    }
    StyleWeights {
        interview: interview / total,
        storytelling: storytelling / total,
        educational: educational / total,
        debate: debate / total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::author_store::SqliteAuthorStore;
    use crate::feedback_store::{FeedbackType, SqliteFeedbackStore};
    use chrono::{DateTime, TimeZone, Utc};
    use tempfile::TempDir;

    struct FixedClock {
        now: DateTime<Utc>,
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.now
        }
    }

    const DAY_MS: i64 = 24 * 60 * 60 * 1000;

    fn fixed_now() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
    }

    struct Harness {
        processor: FeedbackProcessor,
        feedback_store: Arc<SqliteFeedbackStore>,
        author_store: Arc<SqliteAuthorStore>,
        _tmp: TempDir,
    }

    fn make_harness() -> Harness {
        let tmp = TempDir::new().unwrap();
        let feedback_store =
            Arc::new(SqliteFeedbackStore::new(tmp.path().join("feedback.db")).unwrap());
        let author_store = Arc::new(SqliteAuthorStore::new(tmp.path().join("author.db")).unwrap());
        let processor = FeedbackProcessor::new(
            feedback_store.clone(),
            author_store.clone(),
            Arc::new(FixedClock { now: fixed_now() }),
            FeedbackSettings::default(),
        );
        Harness {
            processor,
            feedback_store,
            author_store,
            _tmp: tmp,
        }
    }

    fn feedback(
        id: &str,
        feedback_type: FeedbackType,
        categories: &[&str],
        style: Option<PodcastStyle>,
        age_ms: i64,
    ) -> FeedbackDetails {
        FeedbackDetails {
            id: id.to_string(),
            user_id: "user1".to_string(),
            podcast_id: "pod1".to_string(),
            feedback_type,
            rating: None,
            categories: categories.iter().map(|c| c.to_string()).collect(),
            podcast_style: style,
            created_at_ms: fixed_now().timestamp_millis() - age_ms,
            is_processed: false,
        }
    }

    #[test]
    fn test_topic_weights_sum_to_one_for_fresh_entries() {
        let history = vec![
            feedback("f1", FeedbackType::Like, &["technology"], None, 0),
            feedback("f2", FeedbackType::Save, &["business"], None, 0),
            feedback("f3", FeedbackType::Like, &["technology"], None, 0),
        ];
        let weights = topic_weights(&history, fixed_now().timestamp_millis());

        let sum: f64 = weights.values().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        // Two of three positive interactions were technology
        assert!((weights["technology"] - 2.0 / 3.0).abs() < 1e-9);
        assert!((weights["business"] - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_topic_weights_ignore_non_positive_feedback() {
        let history = vec![
            feedback("f1", FeedbackType::Dislike, &["sports"], None, 0),
            feedback("f2", FeedbackType::Listen, &["sports"], None, 0),
            feedback("f3", FeedbackType::Like, &["technology"], None, 0),
        ];
        let weights = topic_weights(&history, fixed_now().timestamp_millis());
        assert!(!weights.contains_key("sports"));
        assert!((weights["technology"] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_older_entry_contributes_strictly_less() {
        let history = vec![
            feedback("f1", FeedbackType::Like, &["technology"], None, 0),
            feedback("f2", FeedbackType::Like, &["business"], None, 60 * DAY_MS),
        ];
        let weights = topic_weights(&history, fixed_now().timestamp_millis());
        assert!(weights["business"] < weights["technology"]);
        // Still normalized
        let sum: f64 = weights.values().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_decay_factor_thirty_day_constant() {
        assert!((decay_factor(0) - 1.0).abs() < 1e-9);
        let one_constant = decay_factor(30 * DAY_MS);
        assert!((one_constant - (-1.0f64).exp()).abs() < 1e-9);
        // Future timestamps never amplify
        assert!((decay_factor(-DAY_MS) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_style_weights_default_without_signal() {
        let history = vec![
            // Save carries no style signal; listen neither
            feedback("f1", FeedbackType::Save, &[], Some(PodcastStyle::Debate), 0),
            feedback("f2", FeedbackType::Listen, &[], Some(PodcastStyle::Debate), 0),
            // Like without style metadata
            feedback("f3", FeedbackType::Like, &[], None, 0),
        ];
        let weights = style_weights(&history, fixed_now().timestamp_millis());
        assert_eq!(weights, StyleWeights::default());
    }

    #[test]
    fn test_style_weights_normalized() {
        let history = vec![
            feedback("f1", FeedbackType::Like, &[], Some(PodcastStyle::Interview), 0),
            feedback("f2", FeedbackType::Complete, &[], Some(PodcastStyle::Interview), 0),
            feedback("f3", FeedbackType::Like, &[], Some(PodcastStyle::Educational), 0),
        ];
        let weights = style_weights(&history, fixed_now().timestamp_millis());
        assert!((weights.sum() - 1.0).abs() < 1e-9);
        assert!((weights.interview - 2.0 / 3.0).abs() < 1e-9);
        assert!((weights.educational - 1.0 / 3.0).abs() < 1e-9);
        assert!(weights.storytelling.abs() < 1e-9);
    }

    #[test]
    fn test_queue_processing_end_to_end() {
        let h = make_harness();
        let mut row = feedback(
            "f1",
            FeedbackType::Like,
            &["technology"],
            Some(PodcastStyle::Interview),
            0,
        );
        row.rating = Some(4.0);
        h.feedback_store.insert_feedback(&row).unwrap();

        let stats = h.processor.process_feedback_queue().unwrap();
        assert_eq!(stats.pulled, 1);
        assert_eq!(stats.processed, 1);
        assert_eq!(stats.failed, 0);

        // Adjustment stored
        let adjustment = h.author_store.get_adjustment("user1").unwrap().unwrap();
        assert!((adjustment.topic_weights["technology"] - 1.0).abs() < 1e-9);
        assert_eq!(adjustment.last_adjusted, fixed_now().timestamp());

        // Metrics stored
        let engagement = h.feedback_store.get_engagement("pod1").unwrap().unwrap();
        assert_eq!(engagement.total_feedback, 1);
        assert_eq!(engagement.likes, 1);
        assert!((engagement.average_rating.unwrap() - 4.0).abs() < 1e-9);

        // Queue drained
        let stats = h.processor.process_feedback_queue().unwrap();
        assert_eq!(stats.pulled, 0);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let h = make_harness();
        h.feedback_store
            .insert_feedback(&feedback(
                "f1",
                FeedbackType::Like,
                &["technology", "business"],
                Some(PodcastStyle::Interview),
                5 * DAY_MS,
            ))
            .unwrap();

        let first = h.processor.compute_adjustment("user1").unwrap();
        let second = h.processor.compute_adjustment("user1").unwrap();
        assert_eq!(first.topic_weights, second.topic_weights);
        assert_eq!(first.style_weights, second.style_weights);
    }

    #[test]
    fn test_per_item_failure_does_not_abort_batch() {
        // An author store that rejects writes for one poisoned user
        struct PoisonedAuthorStore {
            inner: Arc<SqliteAuthorStore>,
        }

        impl AuthorStore for PoisonedAuthorStore {
            fn get_preferences(
                &self,
                user_id: &str,
            ) -> Result<Option<crate::author_store::AuthorPreferences>> {
                self.inner.get_preferences(user_id)
            }
            fn upsert_preferences(
                &self,
                preferences: &crate::author_store::AuthorPreferences,
            ) -> Result<()> {
                self.inner.upsert_preferences(preferences)
            }
            fn get_adjustment(&self, user_id: &str) -> Result<Option<PreferenceAdjustment>> {
                self.inner.get_adjustment(user_id)
            }
            fn upsert_adjustment(&self, adjustment: &PreferenceAdjustment) -> Result<()> {
                if adjustment.user_id == "poisoned" {
                    anyhow::bail!("write rejected");
                }
                self.inner.upsert_adjustment(adjustment)
            }
        }

        let tmp = TempDir::new().unwrap();
        let feedback_store =
            Arc::new(SqliteFeedbackStore::new(tmp.path().join("feedback.db")).unwrap());
        let author_store = Arc::new(SqliteAuthorStore::new(tmp.path().join("author.db")).unwrap());
        let processor = FeedbackProcessor::new(
            feedback_store.clone(),
            Arc::new(PoisonedAuthorStore {
                inner: author_store.clone(),
            }),
            Arc::new(FixedClock { now: fixed_now() }),
            FeedbackSettings::default(),
        );

        let mut bad = feedback("f1", FeedbackType::Like, &["technology"], None, 0);
        bad.user_id = "poisoned".to_string();
        feedback_store.insert_feedback(&bad).unwrap();
        feedback_store
            .insert_feedback(&feedback("f2", FeedbackType::Like, &["technology"], None, 0))
            .unwrap();

        let stats = processor.process_feedback_queue().unwrap();
        assert_eq!(stats.pulled, 2);
        assert_eq!(stats.processed, 1);
        assert_eq!(stats.failed, 1);

        // The good row is done, the bad one stays queued for retry
        let remaining = feedback_store.get_unprocessed_feedback(10).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "f1");
        assert!(author_store.get_adjustment("user1").unwrap().is_some());
    }

    #[test]
    fn test_update_metrics_counts_every_type() {
        let h = make_harness();
        let types = [
            FeedbackType::Like,
            FeedbackType::Dislike,
            FeedbackType::Save,
            FeedbackType::Listen,
            FeedbackType::Complete,
            FeedbackType::Like,
        ];
        for (i, t) in types.iter().enumerate() {
            h.feedback_store
                .insert_feedback(&feedback(&format!("f{}", i), *t, &[], None, 0))
                .unwrap();
        }

        h.processor.update_metrics("pod1").unwrap();
        let engagement = h.feedback_store.get_engagement("pod1").unwrap().unwrap();
        assert_eq!(engagement.total_feedback, 6);
        assert_eq!(engagement.likes, 2);
        assert_eq!(engagement.dislikes, 1);
        assert_eq!(engagement.saves, 1);
        assert_eq!(engagement.listens, 1);
        assert_eq!(engagement.completions, 1);
        assert!(engagement.average_rating.is_none());
    }

    #[test]
    fn test_batch_size_is_respected() {
        let tmp = TempDir::new().unwrap();
        let feedback_store =
            Arc::new(SqliteFeedbackStore::new(tmp.path().join("feedback.db")).unwrap());
        let author_store = Arc::new(SqliteAuthorStore::new(tmp.path().join("author.db")).unwrap());
        let processor = FeedbackProcessor::new(
            feedback_store.clone(),
            author_store,
            Arc::new(FixedClock { now: fixed_now() }),
            FeedbackSettings {
                batch_size: 2,
                interval_minutes: 15,
            },
        );

        for i in 0..5 {
            feedback_store
                .insert_feedback(&feedback(
                    &format!("f{}", i),
                    FeedbackType::Like,
                    &["technology"],
                    None,
                    0,
                ))
                .unwrap();
        }

        let stats = processor.process_feedback_queue().unwrap();
        assert_eq!(stats.pulled, 2);
        assert_eq!(feedback_store.get_feedback_stats().unwrap().unprocessed, 3);
    }
}
