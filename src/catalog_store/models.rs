//! Data models for the podcast catalogue.

use serde::{Deserialize, Serialize};

/// A podcast record as known to the catalogue.
///
/// Episode cadence fields come from catalogue metadata and are the inputs
/// for the length/frequency features, which are never taken from text
/// analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Podcast {
    pub id: String,
    pub title: String,
    pub description: String,
    pub publisher: String,
    pub categories: Vec<String>,
    pub language: Option<String>,
    pub listener_count: Option<u64>,
    /// Average listener rating on a 0-5 scale.
    pub rating: Option<f64>,
    pub total_episodes: Option<u32>,
    pub avg_episode_minutes: Option<f64>,
    pub episodes_per_month: Option<f64>,
}

impl Podcast {
    /// Primary category, if any.
    pub fn category(&self) -> Option<&str> {
        self.categories.first().map(|s| s.as_str())
    }
}
