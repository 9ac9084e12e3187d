//! HTTP client for a Listen-API-shaped podcast directory.

use super::provider::{PodcastSearchProvider, SearchError, SearchPage, SearchQuery};
use crate::catalog_store::Podcast;
use crate::config::RemoteSearchSettings;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Client for the hosted podcast search directory.
pub struct ListenApiSearchProvider {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl ListenApiSearchProvider {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout,
        }
    }

    pub fn from_settings(settings: &RemoteSearchSettings) -> Self {
        Self::new(
            settings.base_url.clone(),
            settings.api_key.clone(),
            Duration::from_secs(settings.timeout_secs),
        )
    }

    fn build_url(&self, query: &SearchQuery) -> String {
        let mut url = format!(
            "{}/search?q={}&type=podcast&offset={}&page_size={}",
            self.base_url,
            urlencoding::encode(&query.query),
            query.offset,
            query.max_results,
        );
        if let Some(language) = &query.language {
            url.push_str(&format!("&language={}", urlencoding::encode(language)));
        }
        url
    }
}

#[async_trait]
impl PodcastSearchProvider for ListenApiSearchProvider {
    fn name(&self) -> &str {
        "listen-api"
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchPage, SearchError> {
        let url = self.build_url(query);

        debug!(query = %query.query, offset = query.offset, "Searching podcast directory");

        let response = self
            .client
            .get(&url)
            .header("X-ListenAPI-Key", &self.api_key)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout
                } else {
                    SearchError::Connection(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                429 => SearchError::RateLimited,
                401 | 403 => SearchError::AuthFailed(body),
                _ => SearchError::Unavailable(format!("status {}: {}", status, body)),
            });
        }

        let body: ApiSearchResponse = response.json().await.map_err(|e| {
            SearchError::InvalidResponse(format!("Failed to parse search response: {}", e))
        })?;

        let results: Vec<Podcast> = body.results.into_iter().map(Podcast::from).collect();
        let count = body.count.unwrap_or(results.len());

        debug!(
            count,
            total = body.total.unwrap_or(0),
            "Podcast directory returned results"
        );

        Ok(SearchPage {
            results,
            total: body.total.unwrap_or(count),
            count,
            next_offset: body.next_offset,
        })
    }
}

// Directory API types

#[derive(Debug, Deserialize)]
struct ApiSearchResponse {
    #[serde(default)]
    results: Vec<ApiPodcast>,
    #[serde(default)]
    total: Option<usize>,
    #[serde(default)]
    count: Option<usize>,
    #[serde(default)]
    next_offset: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ApiPodcast {
    id: String,
    #[serde(default)]
    title_original: String,
    #[serde(default)]
    description_original: String,
    #[serde(default)]
    publisher_original: String,
    #[serde(default)]
    genres: Vec<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    total_episodes: Option<u32>,
    /// Average episode audio length in seconds.
    #[serde(default)]
    audio_length_sec: Option<f64>,
}

impl From<ApiPodcast> for Podcast {
    fn from(api: ApiPodcast) -> Self {
        Podcast {
            id: api.id,
            title: api.title_original,
            description: api.description_original,
            publisher: api.publisher_original,
            categories: api.genres.iter().map(|g| g.to_lowercase()).collect(),
            language: api.language,
            listener_count: None,
            rating: None,
            total_episodes: api.total_episodes,
            avg_episode_minutes: api.audio_length_sec.map(|s| s / 60.0),
            episodes_per_month: None,
        }
    }
}
