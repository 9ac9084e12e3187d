//! Podcast-search provider trait definition.

use crate::catalog_store::Podcast;
use async_trait::async_trait;
use thiserror::Error;

/// A search request toward the external podcast directory.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub query: String,
    pub language: Option<String>,
    pub max_results: usize,
    pub offset: usize,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>, max_results: usize) -> Self {
        Self {
            query: query.into(),
            language: None,
            max_results,
            offset: 0,
        }
    }
}

/// One page of search results.
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub results: Vec<Podcast>,
    pub total: usize,
    pub count: usize,
    pub next_offset: Option<usize>,
}

/// Errors that can occur when calling the search directory.
///
/// Every variant means "remote tier unavailable" to the orchestrator; the
/// kinds stay distinguishable so callers can log and alert differently.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Rate limited by search directory")]
    RateLimited,

    #[error("Search directory unavailable: {0}")]
    Unavailable(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl SearchError {
    /// Whether the failure points at a credentials problem rather than a
    /// transient outage.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, SearchError::AuthFailed(_))
    }
}

/// Trait for podcast-search backends.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait PodcastSearchProvider: Send + Sync {
    /// Get the provider's name (e.g., "listen-api").
    fn name(&self) -> &str;

    /// Search the directory for podcasts matching the query.
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage, SearchError>;
}
