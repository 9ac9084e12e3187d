//! FeedbackStore trait definition.

use super::models::{FeedbackDetails, FeedbackStats, PodcastEngagement};
use anyhow::Result;

/// Trait for feedback storage backends.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait FeedbackStore: Send + Sync {
    // =========================================================================
    // Feedback log
    // =========================================================================

    /// Append a feedback row. Rows are never deleted.
    fn insert_feedback(&self, feedback: &FeedbackDetails) -> Result<()>;

    /// Get up to `limit` unprocessed rows, oldest first.
    fn get_unprocessed_feedback(&self, limit: usize) -> Result<Vec<FeedbackDetails>>;

    /// Flag a single row as processed.
    fn mark_feedback_processed(&self, feedback_id: &str) -> Result<()>;

    /// Full feedback history for a user, oldest first.
    fn get_feedback_for_user(&self, user_id: &str) -> Result<Vec<FeedbackDetails>>;

    /// Full feedback history for a podcast, oldest first.
    fn get_feedback_for_podcast(&self, podcast_id: &str) -> Result<Vec<FeedbackDetails>>;

    // =========================================================================
    // Engagement metrics
    // =========================================================================

    /// Insert or replace aggregate engagement metrics for a podcast.
    fn upsert_engagement(&self, engagement: &PodcastEngagement) -> Result<()>;

    /// Get aggregate engagement metrics for a podcast.
    fn get_engagement(&self, podcast_id: &str) -> Result<Option<PodcastEngagement>>;

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Get summary statistics for the feedback database.
    fn get_feedback_stats(&self) -> Result<FeedbackStats>;
}
