use crate::author_store::AuthorStore;
use crate::catalog_store::CatalogStore;
use crate::feature_store::FeatureStore;
use crate::feedback::Clock;
use crate::feedback_store::FeedbackStore;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Context provided to jobs during execution.
///
/// Contains references to shared resources and a cancellation token for
/// graceful shutdown handling. No process-wide statics; everything a job
/// touches is injected here.
#[derive(Clone)]
pub struct JobContext {
    /// Token to check for cancellation/shutdown requests.
    pub cancellation_token: CancellationToken,

    /// Access to the podcast catalogue.
    pub catalog_store: Arc<dyn CatalogStore>,

    /// Access to the feature cache.
    pub feature_store: Arc<dyn FeatureStore>,

    /// Access to author preferences and adjustments.
    pub author_store: Arc<dyn AuthorStore>,

    /// Access to the feedback log and engagement metrics.
    pub feedback_store: Arc<dyn FeedbackStore>,

    /// Clock used by jobs, injectable for tests.
    pub clock: Arc<dyn Clock>,
}

impl JobContext {
    pub fn new(
        cancellation_token: CancellationToken,
        catalog_store: Arc<dyn CatalogStore>,
        feature_store: Arc<dyn FeatureStore>,
        author_store: Arc<dyn AuthorStore>,
        feedback_store: Arc<dyn FeedbackStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cancellation_token,
            catalog_store,
            feature_store,
            author_store,
            feedback_store,
            clock,
        }
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }
}
