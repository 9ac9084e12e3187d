//! Stale feature cache pruning job.
//!
//! Deletes feature rows past the freshness window so the next matching run
//! recomputes them instead of scoring against outdated descriptions.

use crate::background_jobs::{
    context::JobContext,
    job::{BackgroundJob, JobError, JobSchedule, ShutdownBehavior},
};
use crate::config::MatchingSettings;
use std::time::Duration;
use tracing::info;

pub struct StaleFeaturePruningJob {
    max_feature_age_days: u64,
    interval_hours: u64,
}

impl StaleFeaturePruningJob {
    pub fn new() -> Self {
        Self::from_settings(&MatchingSettings::default())
    }

    pub fn from_settings(settings: &MatchingSettings) -> Self {
        Self {
            max_feature_age_days: settings.max_feature_age_days,
            interval_hours: 24,
        }
    }
}

impl Default for StaleFeaturePruningJob {
    fn default() -> Self {
        Self::new()
    }
}

impl BackgroundJob for StaleFeaturePruningJob {
    fn id(&self) -> &'static str {
        "stale_feature_pruning"
    }

    fn name(&self) -> &'static str {
        "Stale Feature Pruning"
    }

    fn description(&self) -> &'static str {
        "Drop cached podcast features past the freshness window"
    }

    fn schedule(&self) -> JobSchedule {
        JobSchedule::Interval(Duration::from_secs(self.interval_hours * 60 * 60))
    }

    fn shutdown_behavior(&self) -> ShutdownBehavior {
        ShutdownBehavior::Cancellable
    }

    fn execute(&self, ctx: &JobContext) -> Result<(), JobError> {
        if ctx.is_cancelled() {
            return Err(JobError::Cancelled);
        }

        let cutoff =
            ctx.clock.now().timestamp() - (self.max_feature_age_days as i64) * 24 * 60 * 60;
        let deleted = ctx
            .feature_store
            .delete_features_older_than(cutoff)
            .map_err(|e| JobError::ExecutionFailed(format!("Pruning failed: {:#}", e)))?;

        if deleted > 0 {
            info!("Pruned {} stale feature rows", deleted);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::author_store::SqliteAuthorStore;
    use crate::catalog_store::NullCatalogStore;
    use crate::feature_store::{
        ComplexityLevel, FeatureStore, PodcastFeatures, SqliteFeatureStore, UpdateFrequency,
    };
    use crate::feedback::SystemClock;
    use crate::feedback_store::SqliteFeedbackStore;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio_util::sync::CancellationToken;

    #[test]
    fn test_job_metadata() {
        let job = StaleFeaturePruningJob::new();
        assert_eq!(job.id(), "stale_feature_pruning");
        match job.schedule() {
            JobSchedule::Interval(interval) => {
                assert_eq!(interval, Duration::from_secs(24 * 60 * 60));
            }
            _ => panic!("Expected Interval schedule"),
        }
    }

    #[test]
    fn test_execute_prunes_only_stale_rows() {
        let tmp = TempDir::new().unwrap();
        let feature_store =
            Arc::new(SqliteFeatureStore::new(tmp.path().join("features.db")).unwrap());

        let make_features = |id: &str, extracted_at: i64| PodcastFeatures {
            podcast_id: id.to_string(),
            main_topics: vec![],
            content_style: Default::default(),
            complexity_level: ComplexityLevel::Intermediate,
            average_episode_minutes: 0.0,
            update_frequency: UpdateFrequency::Weekly,
            production_quality: 0.0,
            hosting_style: vec![],
            language_complexity: 0.0,
            extracted_at,
        };

        let now = chrono::Utc::now().timestamp();
        feature_store
            .upsert_features(&make_features("stale", now - 40 * 24 * 60 * 60))
            .unwrap();
        feature_store.upsert_features(&make_features("fresh", now)).unwrap();

        let ctx = JobContext::new(
            CancellationToken::new(),
            Arc::new(NullCatalogStore),
            feature_store.clone(),
            Arc::new(SqliteAuthorStore::new(tmp.path().join("author.db")).unwrap()),
            Arc::new(SqliteFeedbackStore::new(tmp.path().join("feedback.db")).unwrap()),
            Arc::new(SystemClock),
        );

        StaleFeaturePruningJob::new().execute(&ctx).unwrap();

        assert!(feature_store.get_features("stale").unwrap().is_none());
        assert!(feature_store.get_features("fresh").unwrap().is_some());
    }
}
