//! Local matching tier over the cached catalogue.

use super::scorer::{MatchScorer, PodcastMatch};
use crate::author_store::{AuthorPreferences, PreferenceAdjustment};
use crate::catalog_store::{CatalogStore, Podcast};
use crate::config::MatchingSettings;
use crate::feature_store::{FeatureStore, PodcastFeatures};
use crate::features::FeatureExtractor;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, warn};

/// Scores the known catalogue against one author's preferences.
///
/// Candidates get fresh features on cache miss or staleness. Remote-tier
/// candidates run through [`LocalMatcher::score_candidates`] too, so both
/// tiers share one scoring code path.
pub struct LocalMatcher {
    catalog_store: Arc<dyn CatalogStore>,
    feature_store: Arc<dyn FeatureStore>,
    extractor: FeatureExtractor,
    scorer: MatchScorer,
    settings: MatchingSettings,
}

impl LocalMatcher {
    pub fn new(
        catalog_store: Arc<dyn CatalogStore>,
        feature_store: Arc<dyn FeatureStore>,
        extractor: FeatureExtractor,
        settings: MatchingSettings,
    ) -> Self {
        Self {
            catalog_store,
            feature_store,
            extractor,
            scorer: MatchScorer::new(),
            settings,
        }
    }

    /// Score the whole catalogue, keep viable matches, best first.
    pub async fn find_local_matches(
        &self,
        preferences: &AuthorPreferences,
        adjustment: Option<&PreferenceAdjustment>,
    ) -> Result<Vec<PodcastMatch>> {
        let catalogue = self.catalog_store.get_all_podcasts()?;
        debug!(
            user_id = %preferences.user_id,
            candidates = catalogue.len(),
            "Scoring local catalogue"
        );
        let scored = self
            .score_candidates(&catalogue, preferences, adjustment)
            .await?;
        Ok(self.rank_viable(scored))
    }

    /// Score an arbitrary candidate list with the same pipeline the local
    /// tier uses: ensure fresh features, then run the scorer.
    pub async fn score_candidates(
        &self,
        candidates: &[Podcast],
        preferences: &AuthorPreferences,
        adjustment: Option<&PreferenceAdjustment>,
    ) -> Result<Vec<PodcastMatch>> {
        let mut matches = Vec::with_capacity(candidates.len());
        for podcast in candidates {
            let features = match self.ensure_features(podcast).await? {
                Some(features) => features,
                None => continue,
            };
            matches.push(self.scorer.score(preferences, adjustment, podcast, &features));
        }
        Ok(matches)
    }

    /// Drop matches under the viability threshold and sort best first.
    pub fn rank_viable(&self, mut matches: Vec<PodcastMatch>) -> Vec<PodcastMatch> {
        matches.retain(|m| m.overall_score >= self.settings.min_viability_score);
        matches.sort_by(|a, b| {
            b.overall_score
                .partial_cmp(&a.overall_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.podcast_id.cmp(&b.podcast_id))
        });
        matches
    }

    /// Return fresh features for a podcast, recomputing when the cache is
    /// missing or stale. On extraction failure a stale cache entry is
    /// better than nothing; with no cache at all the candidate is skipped.
    async fn ensure_features(&self, podcast: &Podcast) -> Result<Option<PodcastFeatures>> {
        let cached = self.feature_store.get_features(&podcast.id)?;
        let max_age = self.settings.max_feature_age().as_secs() as i64;
        let now = chrono::Utc::now().timestamp();

        if let Some(features) = &cached {
            if now - features.extracted_at < max_age {
                return Ok(Some(features.clone()));
            }
        }

        match self.extractor.extract_features(podcast).await {
            Ok(features) => {
                self.feature_store.upsert_features(&features)?;
                Ok(Some(features))
            }
            Err(e) => match cached {
                Some(stale) => {
                    warn!(
                        podcast_id = %podcast.id,
                        "Feature extraction failed, using stale cache: {}", e
                    );
                    Ok(Some(stale))
                }
                None => {
                    warn!(
                        podcast_id = %podcast.id,
                        "Feature extraction failed, skipping candidate: {}", e
                    );
                    Ok(None)
                }
            },
        }
    }
}
