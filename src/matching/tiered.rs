//! Tiered matching orchestration: local first, remote expansion when the
//! local tier comes up short.
//!
//! The remote tier is strictly best-effort. Any search capability failure
//! is caught here and the local results are returned as-is; matching never
//! hard-fails because the directory is down, rate limited or misconfigured.
//! Validation failures from result processing are not caught at this layer.

use super::local::LocalMatcher;
use super::scorer::PodcastMatch;
use crate::author_store::{AuthorPreferences, PreferenceAdjustment};
use crate::config::MatchingSettings;
use crate::remote_search::{PodcastSearchProvider, SearchError, SearchQuery, SlidingWindowLimiter};
use anyhow::Result;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Orchestrates the local and remote matching tiers for one request.
pub struct TieredMatcher {
    local: LocalMatcher,
    search_provider: Arc<dyn PodcastSearchProvider>,
    rate_limiter: SlidingWindowLimiter,
    settings: MatchingSettings,
}

impl TieredMatcher {
    pub fn new(
        local: LocalMatcher,
        search_provider: Arc<dyn PodcastSearchProvider>,
        rate_limiter: SlidingWindowLimiter,
        settings: MatchingSettings,
    ) -> Self {
        Self {
            local,
            search_provider,
            rate_limiter,
            settings,
        }
    }

    /// Run one matching request through the tiers.
    pub async fn find_matches(
        &self,
        preferences: &AuthorPreferences,
        adjustment: Option<&PreferenceAdjustment>,
    ) -> Result<Vec<PodcastMatch>> {
        let local_matches = self.local.find_local_matches(preferences, adjustment).await?;

        if self.local_results_sufficient(&local_matches) {
            debug!(
                user_id = %preferences.user_id,
                count = local_matches.len(),
                "Local tier satisfied the request"
            );
            return Ok(local_matches);
        }

        info!(
            user_id = %preferences.user_id,
            local_count = local_matches.len(),
            "Local tier insufficient, expanding via remote search"
        );

        let page = match self.remote_search(preferences).await {
            Ok(page) => page,
            Err(e) => {
                if e.is_auth_failure() {
                    error!("Remote search rejected credentials, serving local-only results: {}", e);
                } else {
                    warn!("Remote search unavailable, serving local-only results: {}", e);
                }
                return Ok(local_matches);
            }
        };

        // Remote candidates go through the exact same extraction and
        // scoring path as local ones.
        let remote_scored = self
            .local
            .score_candidates(&page.results, preferences, adjustment)
            .await?;
        let remote_matches = self.local.rank_viable(remote_scored);

        Ok(self.merge_and_rank(local_matches, remote_matches))
    }

    /// The remote tier is skipped when the local tier returned enough
    /// matches and their top scores clear the quality bar.
    fn local_results_sufficient(&self, matches: &[PodcastMatch]) -> bool {
        if matches.len() < self.settings.min_local_results {
            return false;
        }
        let top = &matches[..self.settings.min_local_results.min(matches.len())];
        let avg = top.iter().map(|m| m.overall_score).sum::<f64>() / top.len() as f64;
        avg >= self.settings.min_top_score
    }

    async fn remote_search(
        &self,
        preferences: &AuthorPreferences,
    ) -> std::result::Result<crate::remote_search::SearchPage, SearchError> {
        if !self.rate_limiter.acquire().await {
            return Err(SearchError::RateLimited);
        }
        let query = build_search_query(preferences, self.settings.max_remote_results);
        self.search_provider.search(&query).await
    }

    /// Merge the tiers, dropping remote entries whose podcast the local
    /// tier already scored. Local results were computed and merged first,
    /// so they win collisions.
    fn merge_and_rank(
        &self,
        local: Vec<PodcastMatch>,
        remote: Vec<PodcastMatch>,
    ) -> Vec<PodcastMatch> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut merged = Vec::with_capacity(local.len() + remote.len());
        for m in local.into_iter().chain(remote) {
            if seen.insert(m.podcast_id.clone()) {
                merged.push(m);
            }
        }
        merged.sort_by(|a, b| {
            b.overall_score
                .partial_cmp(&a.overall_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.podcast_id.cmp(&b.podcast_id))
        });
        merged
    }
}

fn build_search_query(preferences: &AuthorPreferences, max_results: usize) -> SearchQuery {
    let terms: Vec<&str> = preferences.topics.iter().map(|t| t.as_str()).collect();
    SearchQuery::new(terms.join(" "), max_results)
}
