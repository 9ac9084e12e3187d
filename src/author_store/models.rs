//! Data models for author preferences and derived adjustments.

use crate::feature_store::ComplexityLevel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Subject areas an author can select in their preference form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Technology,
    Business,
    Health,
    Science,
    Education,
    Entertainment,
    Sports,
    Politics,
    Arts,
    Finance,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Technology => "technology",
            Topic::Business => "business",
            Topic::Health => "health",
            Topic::Science => "science",
            Topic::Education => "education",
            Topic::Entertainment => "entertainment",
            Topic::Sports => "sports",
            Topic::Politics => "politics",
            Topic::Arts => "arts",
            Topic::Finance => "finance",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "technology" => Some(Topic::Technology),
            "business" => Some(Topic::Business),
            "health" => Some(Topic::Health),
            "science" => Some(Topic::Science),
            "education" => Some(Topic::Education),
            "entertainment" => Some(Topic::Entertainment),
            "sports" => Some(Topic::Sports),
            "politics" => Some(Topic::Politics),
            "arts" => Some(Topic::Arts),
            "finance" => Some(Topic::Finance),
            _ => None,
        }
    }
}

/// Episode length bucket an author prefers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferredLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl PreferredLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreferredLength::Short => "short",
            PreferredLength::Medium => "medium",
            PreferredLength::Long => "long",
        }
    }

    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "short" => PreferredLength::Short,
            "long" => PreferredLength::Long,
            _ => PreferredLength::Medium,
        }
    }

    /// Bucket an episode length in minutes the same way the form buckets
    /// the author's choice: under 20 short, 20-45 medium, over 45 long.
    pub fn from_minutes(minutes: f64) -> Self {
        if minutes < 20.0 {
            PreferredLength::Short
        } else if minutes <= 45.0 {
            PreferredLength::Medium
        } else {
            PreferredLength::Long
        }
    }

    pub fn bucket_index(&self) -> usize {
        match self {
            PreferredLength::Short => 0,
            PreferredLength::Medium => 1,
            PreferredLength::Long => 2,
        }
    }
}

/// Style flags an author toggles in the preference form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StylePreferences {
    pub interview: bool,
    pub storytelling: bool,
    pub educational: bool,
    pub debate: bool,
}

/// Explicit preferences owned by the author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorPreferences {
    pub user_id: String,
    /// 1-5 topics selected in the preference form.
    pub topics: Vec<Topic>,
    pub preferred_length: PreferredLength,
    pub style_preferences: StylePreferences,
    /// How deep the author can go on their subject.
    pub expertise_level: ComplexityLevel,
    pub updated_at: i64,
}

/// Normalized style weights, summing to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StyleWeights {
    pub interview: f64,
    pub storytelling: f64,
    pub educational: f64,
    pub debate: f64,
}

impl Default for StyleWeights {
    /// Equal weights when there is no usable signal.
    fn default() -> Self {
        Self {
            interview: 0.25,
            storytelling: 0.25,
            educational: 0.25,
            debate: 0.25,
        }
    }
}

impl StyleWeights {
    pub fn sum(&self) -> f64 {
        self.interview + self.storytelling + self.educational + self.debate
    }
}

/// Advisory weights derived from an author's feedback history.
///
/// Fully recomputed each processing cycle; informs scoring without ever
/// replacing the explicit [`AuthorPreferences`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceAdjustment {
    pub user_id: String,
    /// Topic slug -> normalized weight over observed positive topics.
    pub topic_weights: HashMap<String, f64>,
    pub style_weights: StyleWeights,
    pub last_adjusted: i64,
}
