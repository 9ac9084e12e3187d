//! Configuration for the matching engine.
//!
//! Settings are resolved from an optional TOML file merged over built-in
//! defaults. Every subsystem gets its own settings struct so components can
//! be constructed with just the section they need.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Thresholds governing the matching pipeline.
#[derive(Debug, Clone)]
pub struct MatchingSettings {
    /// Matches scoring below this are dropped by the local matcher.
    pub min_viability_score: f64,
    /// Minimum number of local matches before the remote tier is skipped.
    pub min_local_results: usize,
    /// Minimum average score of the top local matches before the remote
    /// tier is skipped.
    pub min_top_score: f64,
    /// Confidence at or above this marks a result as high quality.
    pub high_confidence_threshold: f64,
    /// Cached podcast features older than this are recomputed.
    pub max_feature_age_days: u64,
    /// Cap on candidates requested from the remote search tier.
    pub max_remote_results: usize,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            min_viability_score: 0.35,
            min_local_results: 3,
            min_top_score: 0.55,
            high_confidence_threshold: 0.7,
            max_feature_age_days: 30,
            max_remote_results: 10,
        }
    }
}

impl MatchingSettings {
    pub fn max_feature_age(&self) -> Duration {
        Duration::from_secs(self.max_feature_age_days * 24 * 60 * 60)
    }
}

/// Settings for the text-analysis capability used by feature extraction.
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.1:8b".to_string(),
            temperature: 0.2,
            timeout_secs: 60,
        }
    }
}

/// Settings for the remote podcast-search capability.
#[derive(Debug, Clone)]
pub struct RemoteSearchSettings {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
    /// Sliding-window request budget toward the search API.
    pub requests_per_window: u32,
    pub window_secs: u64,
    /// Upper bound on how long a caller waits for a free request slot.
    pub max_wait_secs: u64,
}

impl Default for RemoteSearchSettings {
    fn default() -> Self {
        Self {
            base_url: "https://listen-api.listennotes.com/api/v2".to_string(),
            api_key: String::new(),
            timeout_secs: 10,
            requests_per_window: 60,
            window_secs: 60,
            max_wait_secs: 30,
        }
    }
}

/// Settings for the feedback processing job.
#[derive(Debug, Clone)]
pub struct FeedbackSettings {
    /// Maximum unprocessed feedback rows pulled per run.
    pub batch_size: usize,
    pub interval_minutes: u64,
}

impl Default for FeedbackSettings {
    fn default() -> Self {
        Self {
            batch_size: 100,
            interval_minutes: 15,
        }
    }
}

/// Raw TOML file configuration. All fields optional; missing values fall
/// back to defaults during [`AppConfig::resolve`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub db_dir: Option<String>,
    pub matching: Option<MatchingFileConfig>,
    pub analysis: Option<AnalysisFileConfig>,
    pub remote_search: Option<RemoteSearchFileConfig>,
    pub feedback: Option<FeedbackFileConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchingFileConfig {
    pub min_viability_score: Option<f64>,
    pub min_local_results: Option<usize>,
    pub min_top_score: Option<f64>,
    pub high_confidence_threshold: Option<f64>,
    pub max_feature_age_days: Option<u64>,
    pub max_remote_results: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisFileConfig {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteSearchFileConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
    pub requests_per_window: Option<u32>,
    pub window_secs: Option<u64>,
    pub max_wait_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedbackFileConfig {
    pub batch_size: Option<usize>,
    pub interval_minutes: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file {:?}", path))
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub db_dir: Option<String>,
    pub matching: MatchingSettings,
    pub analysis: AnalysisSettings,
    pub remote_search: RemoteSearchSettings,
    pub feedback: FeedbackSettings,
}

impl AppConfig {
    /// Merge file configuration over the built-in defaults.
    pub fn resolve(file: Option<FileConfig>) -> Self {
        let file = file.unwrap_or_default();

        let m = file.matching.unwrap_or_default();
        let matching_defaults = MatchingSettings::default();
        let matching = MatchingSettings {
            min_viability_score: m
                .min_viability_score
                .unwrap_or(matching_defaults.min_viability_score),
            min_local_results: m
                .min_local_results
                .unwrap_or(matching_defaults.min_local_results),
            min_top_score: m.min_top_score.unwrap_or(matching_defaults.min_top_score),
            high_confidence_threshold: m
                .high_confidence_threshold
                .unwrap_or(matching_defaults.high_confidence_threshold),
            max_feature_age_days: m
                .max_feature_age_days
                .unwrap_or(matching_defaults.max_feature_age_days),
            max_remote_results: m
                .max_remote_results
                .unwrap_or(matching_defaults.max_remote_results),
        };

        let a = file.analysis.unwrap_or_default();
        let analysis_defaults = AnalysisSettings::default();
        let analysis = AnalysisSettings {
            base_url: a.base_url.unwrap_or(analysis_defaults.base_url),
            model: a.model.unwrap_or(analysis_defaults.model),
            temperature: a.temperature.unwrap_or(analysis_defaults.temperature),
            timeout_secs: a.timeout_secs.unwrap_or(analysis_defaults.timeout_secs),
        };

        let r = file.remote_search.unwrap_or_default();
        let remote_defaults = RemoteSearchSettings::default();
        let remote_search = RemoteSearchSettings {
            base_url: r.base_url.unwrap_or(remote_defaults.base_url),
            api_key: r.api_key.unwrap_or(remote_defaults.api_key),
            timeout_secs: r.timeout_secs.unwrap_or(remote_defaults.timeout_secs),
            requests_per_window: r
                .requests_per_window
                .unwrap_or(remote_defaults.requests_per_window),
            window_secs: r.window_secs.unwrap_or(remote_defaults.window_secs),
            max_wait_secs: r.max_wait_secs.unwrap_or(remote_defaults.max_wait_secs),
        };

        let f = file.feedback.unwrap_or_default();
        let feedback_defaults = FeedbackSettings::default();
        let feedback = FeedbackSettings {
            batch_size: f.batch_size.unwrap_or(feedback_defaults.batch_size),
            interval_minutes: f
                .interval_minutes
                .unwrap_or(feedback_defaults.interval_minutes),
        };

        Self {
            db_dir: file.db_dir,
            matching,
            analysis,
            remote_search,
            feedback,
        }
    }
}
