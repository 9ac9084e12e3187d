//! Feedback queue processing job.
//!
//! Runs the feedback processor on an interval and whenever new feedback
//! arrives, deriving adjusted preference weights for future matching runs.

use crate::background_jobs::{
    context::JobContext,
    job::{BackgroundJob, HookEvent, JobError, JobSchedule, ShutdownBehavior},
};
use crate::config::FeedbackSettings;
use crate::feedback::FeedbackProcessor;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub struct FeedbackProcessingJob {
    settings: FeedbackSettings,
}

impl FeedbackProcessingJob {
    pub fn new() -> Self {
        Self::from_settings(&FeedbackSettings::default())
    }

    pub fn from_settings(settings: &FeedbackSettings) -> Self {
        Self {
            settings: settings.clone(),
        }
    }
}

impl Default for FeedbackProcessingJob {
    fn default() -> Self {
        Self::new()
    }
}

impl BackgroundJob for FeedbackProcessingJob {
    fn id(&self) -> &'static str {
        "feedback_processing"
    }

    fn name(&self) -> &'static str {
        "Feedback Processing"
    }

    fn description(&self) -> &'static str {
        "Derive preference adjustments and engagement metrics from new feedback"
    }

    fn schedule(&self) -> JobSchedule {
        JobSchedule::Combined {
            interval: Some(Duration::from_secs(self.settings.interval_minutes * 60)),
            hooks: vec![HookEvent::OnFeedbackReceived],
        }
    }

    fn shutdown_behavior(&self) -> ShutdownBehavior {
        // A processed prefix of the batch is durable; the rest is picked
        // up by the next run.
        ShutdownBehavior::Cancellable
    }

    fn execute(&self, ctx: &JobContext) -> Result<(), JobError> {
        if ctx.is_cancelled() {
            return Err(JobError::Cancelled);
        }

        let processor = FeedbackProcessor::new(
            Arc::clone(&ctx.feedback_store),
            Arc::clone(&ctx.author_store),
            Arc::clone(&ctx.clock),
            self.settings.clone(),
        );

        let stats = processor
            .process_feedback_queue()
            .map_err(|e| JobError::ExecutionFailed(format!("Queue processing failed: {:#}", e)))?;

        if stats.pulled == 0 {
            info!("No unprocessed feedback");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::author_store::SqliteAuthorStore;
    use crate::catalog_store::NullCatalogStore;
    use crate::feature_store::SqliteFeatureStore;
    use crate::feedback::SystemClock;
    use crate::feedback_store::{
        FeedbackDetails, FeedbackStore, FeedbackType, SqliteFeedbackStore,
    };
    use tempfile::TempDir;
    use tokio_util::sync::CancellationToken;

    #[test]
    fn test_job_metadata() {
        let job = FeedbackProcessingJob::new();
        assert_eq!(job.id(), "feedback_processing");
        assert!(!job.description().is_empty());
        assert_eq!(job.shutdown_behavior(), ShutdownBehavior::Cancellable);
    }

    #[test]
    fn test_job_schedule() {
        let job = FeedbackProcessingJob::new();
        match job.schedule() {
            JobSchedule::Combined { interval, hooks } => {
                assert_eq!(interval, Some(Duration::from_secs(15 * 60)));
                assert_eq!(hooks, vec![HookEvent::OnFeedbackReceived]);
            }
            _ => panic!("Expected Combined schedule"),
        }
    }

    #[test]
    fn test_execute_processes_queue() {
        let tmp = TempDir::new().unwrap();
        let feedback_store =
            Arc::new(SqliteFeedbackStore::new(tmp.path().join("feedback.db")).unwrap());
        let author_store = Arc::new(SqliteAuthorStore::new(tmp.path().join("author.db")).unwrap());

        feedback_store
            .insert_feedback(&FeedbackDetails {
                id: "f1".to_string(),
                user_id: "user1".to_string(),
                podcast_id: "pod1".to_string(),
                feedback_type: FeedbackType::Like,
                rating: None,
                categories: vec!["technology".to_string()],
                podcast_style: None,
                created_at_ms: 1000,
                is_processed: false,
            })
            .unwrap();

        let ctx = JobContext::new(
            CancellationToken::new(),
            Arc::new(NullCatalogStore),
            Arc::new(SqliteFeatureStore::new(tmp.path().join("features.db")).unwrap()),
            author_store.clone(),
            feedback_store.clone(),
            Arc::new(SystemClock),
        );

        FeedbackProcessingJob::new().execute(&ctx).unwrap();

        assert_eq!(feedback_store.get_feedback_stats().unwrap().unprocessed, 0);
        assert!(crate::author_store::AuthorStore::get_adjustment(&*author_store, "user1")
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_execute_respects_cancellation() {
        let tmp = TempDir::new().unwrap();
        let token = CancellationToken::new();
        token.cancel();
        let ctx = JobContext::new(
            token,
            Arc::new(NullCatalogStore),
            Arc::new(SqliteFeatureStore::new(tmp.path().join("features.db")).unwrap()),
            Arc::new(SqliteAuthorStore::new(tmp.path().join("author.db")).unwrap()),
            Arc::new(SqliteFeedbackStore::new(tmp.path().join("feedback.db")).unwrap()),
            Arc::new(SystemClock),
        );

        let result = FeedbackProcessingJob::new().execute(&ctx);
        assert!(matches!(result, Err(JobError::Cancelled)));
    }
}
