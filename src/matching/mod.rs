//! The matching pipeline: scorer, results processing, local tier, tiered
//! orchestration and the user-facing service.

mod local;
mod results;
mod scorer;
mod tiered;

pub use local::LocalMatcher;
pub use results::{
    ProcessedMatchResult, ProcessedResults, QualityLevel, ResultsError, ResultsProcessor,
};
pub use scorer::{
    MatchBreakdown, MatchScorer, PodcastMatch, PodcastSummary, ScoringWeights, SCORING_WEIGHTS,
};
pub use tiered::TieredMatcher;

use crate::author_store::AuthorStore;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors surfaced by a matching request.
#[derive(Debug, Error)]
pub enum MatchingError {
    #[error("No preferences stored for user {0}")]
    UnknownAuthor(String),

    #[error(transparent)]
    InvalidResults(#[from] ResultsError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Entry point for request-handling code: loads the author's preferences
/// and adjustment, runs the tiers, and processes the result set.
pub struct MatchingService {
    author_store: Arc<dyn AuthorStore>,
    tiered: TieredMatcher,
    results: ResultsProcessor,
}

impl MatchingService {
    pub fn new(
        author_store: Arc<dyn AuthorStore>,
        tiered: TieredMatcher,
        results: ResultsProcessor,
    ) -> Self {
        Self {
            author_store,
            tiered,
            results,
        }
    }

    /// Run one matching request for a user.
    ///
    /// Always returns a ranked list (possibly empty, possibly local-only)
    /// unless the author is unknown or the scorer produced invalid data.
    pub async fn find_matches_for_user(
        &self,
        user_id: &str,
    ) -> Result<ProcessedResults, MatchingError> {
        let preferences = self
            .author_store
            .get_preferences(user_id)?
            .ok_or_else(|| MatchingError::UnknownAuthor(user_id.to_string()))?;
        let adjustment = self.author_store.get_adjustment(user_id)?;

        debug!(user_id, has_adjustment = adjustment.is_some(), "Running matching request");

        let matches = self
            .tiered
            .find_matches(&preferences, adjustment.as_ref())
            .await?;
        Ok(self.results.process(matches)?)
    }
}
