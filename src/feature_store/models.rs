//! Data models for the feature cache.

use serde::{Deserialize, Serialize};

/// Content style flags describing how a podcast presents its material.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentStyle {
    pub interview: bool,
    pub storytelling: bool,
    pub educational: bool,
    pub debate: bool,
}

/// How demanding a podcast's content is for its audience.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl ComplexityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplexityLevel::Beginner => "beginner",
            ComplexityLevel::Intermediate => "intermediate",
            ComplexityLevel::Advanced => "advanced",
        }
    }

    /// Parse from free text, falling back to the default on anything
    /// unrecognized.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "beginner" | "basic" | "introductory" => ComplexityLevel::Beginner,
            "advanced" | "expert" | "technical" => ComplexityLevel::Advanced,
            _ => ComplexityLevel::Intermediate,
        }
    }
}

/// Release cadence of a podcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateFrequency {
    Daily,
    #[default]
    Weekly,
    Biweekly,
    Monthly,
    Irregular,
}

impl UpdateFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateFrequency::Daily => "daily",
            UpdateFrequency::Weekly => "weekly",
            UpdateFrequency::Biweekly => "biweekly",
            UpdateFrequency::Monthly => "monthly",
            UpdateFrequency::Irregular => "irregular",
        }
    }

    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "daily" => UpdateFrequency::Daily,
            "weekly" => UpdateFrequency::Weekly,
            "biweekly" | "fortnightly" => UpdateFrequency::Biweekly,
            "monthly" => UpdateFrequency::Monthly,
            "irregular" | "sporadic" => UpdateFrequency::Irregular,
            _ => UpdateFrequency::Weekly,
        }
    }

    /// Bucket a catalogue cadence figure into a frequency.
    pub fn from_episodes_per_month(episodes_per_month: Option<f64>) -> Self {
        match episodes_per_month {
            Some(n) if n >= 20.0 => UpdateFrequency::Daily,
            Some(n) if n >= 3.5 => UpdateFrequency::Weekly,
            Some(n) if n >= 1.8 => UpdateFrequency::Biweekly,
            Some(n) if n >= 0.8 => UpdateFrequency::Monthly,
            Some(_) => UpdateFrequency::Irregular,
            None => UpdateFrequency::Weekly,
        }
    }
}

/// Normalized descriptive features for one podcast.
///
/// Derived from text analysis plus catalogue metadata; always replaced as a
/// whole, never mutated field by field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodcastFeatures {
    pub podcast_id: String,
    /// Topics in descending prominence.
    pub main_topics: Vec<String>,
    pub content_style: ContentStyle,
    pub complexity_level: ComplexityLevel,
    /// Computed from catalogue metadata, not text analysis.
    pub average_episode_minutes: f64,
    /// Computed from catalogue metadata, not text analysis.
    pub update_frequency: UpdateFrequency,
    /// 0.0-1.0 production quality estimate.
    pub production_quality: f64,
    pub hosting_style: Vec<String>,
    /// 0.0-1.0 language difficulty estimate.
    pub language_complexity: f64,
    /// Epoch seconds when these features were computed.
    pub extracted_at: i64,
}

/// Summary statistics for the feature cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureCacheStats {
    pub cached_podcasts: usize,
    pub oldest_extracted_at: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complexity_parse_lenient() {
        assert_eq!(
            ComplexityLevel::parse_lenient("Beginner"),
            ComplexityLevel::Beginner
        );
        assert_eq!(
            ComplexityLevel::parse_lenient("expert"),
            ComplexityLevel::Advanced
        );
        assert_eq!(
            ComplexityLevel::parse_lenient("whatever"),
            ComplexityLevel::Intermediate
        );
    }

    #[test]
    fn test_frequency_from_episodes_per_month() {
        assert_eq!(
            UpdateFrequency::from_episodes_per_month(Some(30.0)),
            UpdateFrequency::Daily
        );
        assert_eq!(
            UpdateFrequency::from_episodes_per_month(Some(4.0)),
            UpdateFrequency::Weekly
        );
        assert_eq!(
            UpdateFrequency::from_episodes_per_month(Some(2.0)),
            UpdateFrequency::Biweekly
        );
        assert_eq!(
            UpdateFrequency::from_episodes_per_month(Some(1.0)),
            UpdateFrequency::Monthly
        );
        assert_eq!(
            UpdateFrequency::from_episodes_per_month(Some(0.3)),
            UpdateFrequency::Irregular
        );
        assert_eq!(
            UpdateFrequency::from_episodes_per_month(None),
            UpdateFrequency::Weekly
        );
    }
}
