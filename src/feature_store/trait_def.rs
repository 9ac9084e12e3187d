//! FeatureStore trait definition.

use super::models::{FeatureCacheStats, PodcastFeatures};
use anyhow::Result;

/// Trait for feature cache backends.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait FeatureStore: Send + Sync {
    /// Get cached features for a podcast by ID.
    fn get_features(&self, podcast_id: &str) -> Result<Option<PodcastFeatures>>;

    /// Insert or replace cached features for a podcast.
    fn upsert_features(&self, features: &PodcastFeatures) -> Result<()>;

    /// Delete features extracted before `cutoff_epoch`. Returns the number
    /// of rows removed.
    fn delete_features_older_than(&self, cutoff_epoch: i64) -> Result<usize>;

    /// Get summary statistics for the cache.
    fn get_feature_stats(&self) -> Result<FeatureCacheStats>;
}
