//! Derives normalized podcast features from metadata via text analysis.
//!
//! The extractor builds a structured prompt from the podcast record,
//! delegates to the text-analysis capability, and parses the JSON-shaped
//! answer with defensive defaults for every field. Episode length and
//! update frequency are computed from catalogue metadata and always
//! overwrite whatever the model produced for them.

use crate::analysis::{AnalysisError, CompletionOptions, TextAnalysisProvider};
use crate::catalog_store::Podcast;
use crate::config::AnalysisSettings;
use crate::feature_store::{ComplexityLevel, ContentStyle, PodcastFeatures, UpdateFrequency};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors from feature extraction.
///
/// Partial or missing fields in an otherwise parseable response never
/// error; they fall back to per-field defaults.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Text analysis call failed")]
    Provider(#[from] AnalysisError),

    #[error("Unparseable analysis response: {0}")]
    UnparseableResponse(String),
}

/// Computes [`PodcastFeatures`] for catalogue and remote podcasts.
pub struct FeatureExtractor {
    provider: Arc<dyn TextAnalysisProvider>,
    options: CompletionOptions,
}

impl FeatureExtractor {
    pub fn new(provider: Arc<dyn TextAnalysisProvider>, options: CompletionOptions) -> Self {
        Self { provider, options }
    }

    pub fn from_settings(
        provider: Arc<dyn TextAnalysisProvider>,
        settings: &AnalysisSettings,
    ) -> Self {
        Self::new(
            provider,
            CompletionOptions {
                temperature: settings.temperature,
                timeout: Duration::from_secs(settings.timeout_secs),
            },
        )
    }

    /// Extract features for one podcast.
    pub async fn extract_features(
        &self,
        podcast: &Podcast,
    ) -> Result<PodcastFeatures, ExtractionError> {
        let prompt = build_prompt(podcast);
        let response = self.provider.complete(&prompt, &self.options).await?;

        debug!(
            podcast_id = %podcast.id,
            provider = self.provider.name(),
            "Parsing analysis response"
        );

        let parsed = parse_response(&response)?;
        Ok(features_from_parsed(podcast, parsed))
    }
}

fn build_prompt(podcast: &Podcast) -> String {
    format!(
        "Analyze this podcast and answer with a single JSON object, nothing else.\n\
         \n\
         Title: {}\n\
         Publisher: {}\n\
         Categories: {}\n\
         Description: {}\n\
         \n\
         The JSON object must have these fields:\n\
         - \"mainTopics\": up to 5 topic words, most prominent first\n\
         - \"contentStyle\": object with boolean fields \"interview\", \"storytelling\", \"educational\", \"debate\"\n\
         - \"complexityLevel\": one of \"beginner\", \"intermediate\", \"advanced\"\n\
         - \"productionQuality\": number between 0 and 1\n\
         - \"hostingStyle\": list of tags such as \"conversational\", \"panel\", \"solo\", \"narrative\"\n\
         - \"languageComplexity\": number between 0 and 1",
        podcast.title,
        podcast.publisher,
        podcast.categories.join(", "),
        podcast.description,
    )
}

/// Loosely typed shape of the model's answer. The upstream output format is
/// not contractually guaranteed, so every field is optional and defaulted.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ParsedFeatures {
    main_topics: Option<Vec<String>>,
    content_style: Option<ParsedContentStyle>,
    complexity_level: Option<String>,
    production_quality: Option<f64>,
    hosting_style: Option<Vec<String>>,
    language_complexity: Option<f64>,
    // Sometimes produced by the model; always discarded in favor of
    // catalogue metadata.
    average_episode_length: Option<f64>,
    update_frequency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ParsedContentStyle {
    interview: Option<bool>,
    storytelling: Option<bool>,
    educational: Option<bool>,
    debate: Option<bool>,
}

/// Pull the first JSON object out of the raw model output, tolerating code
/// fences and prose around it.
fn parse_response(raw: &str) -> Result<ParsedFeatures, ExtractionError> {
    let start = raw.find('{');
    let end = raw.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &raw[start..=end],
        _ => {
            return Err(ExtractionError::UnparseableResponse(
                "no JSON object in response".to_string(),
            ))
        }
    };

    serde_json::from_str(json).map_err(|e| ExtractionError::UnparseableResponse(e.to_string()))
}

fn features_from_parsed(podcast: &Podcast, parsed: ParsedFeatures) -> PodcastFeatures {
    let style = parsed.content_style.unwrap_or_default();

    // Length and frequency come from catalogue metadata, overwriting
    // whatever the parser produced.
    let _ = parsed.average_episode_length;
    let _ = parsed.update_frequency;

    PodcastFeatures {
        podcast_id: podcast.id.clone(),
        main_topics: parsed
            .main_topics
            .unwrap_or_default()
            .into_iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect(),
        content_style: ContentStyle {
            interview: style.interview.unwrap_or(false),
            storytelling: style.storytelling.unwrap_or(false),
            educational: style.educational.unwrap_or(false),
            debate: style.debate.unwrap_or(false),
        },
        complexity_level: parsed
            .complexity_level
            .as_deref()
            .map(ComplexityLevel::parse_lenient)
            .unwrap_or_default(),
        average_episode_minutes: podcast.avg_episode_minutes.unwrap_or(0.0),
        update_frequency: UpdateFrequency::from_episodes_per_month(podcast.episodes_per_month),
        production_quality: parsed.production_quality.unwrap_or(0.0).clamp(0.0, 1.0),
        hosting_style: parsed
            .hosting_style
            .unwrap_or_default()
            .into_iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect(),
        language_complexity: parsed.language_complexity.unwrap_or(0.0).clamp(0.0, 1.0),
        extracted_at: chrono::Utc::now().timestamp(),
    }
}
