//! Data models for the feedback database.

use serde::{Deserialize, Serialize};

/// Kind of user interaction recorded as feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackType {
    Like,
    Dislike,
    Save,
    Listen,
    Complete,
}

impl FeedbackType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackType::Like => "like",
            FeedbackType::Dislike => "dislike",
            FeedbackType::Save => "save",
            FeedbackType::Listen => "listen",
            FeedbackType::Complete => "complete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "like" => Some(FeedbackType::Like),
            "dislike" => Some(FeedbackType::Dislike),
            "save" => Some(FeedbackType::Save),
            "listen" => Some(FeedbackType::Listen),
            "complete" => Some(FeedbackType::Complete),
            _ => None,
        }
    }

    /// Interactions that count as a positive topic signal.
    pub fn is_positive(&self) -> bool {
        matches!(self, FeedbackType::Like | FeedbackType::Save)
    }

    /// Interactions that count as a style signal.
    pub fn is_style_signal(&self) -> bool {
        matches!(self, FeedbackType::Like | FeedbackType::Complete)
    }
}

/// Style label attached to feedback metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PodcastStyle {
    Interview,
    Narrative,
    Educational,
    Debate,
}

impl PodcastStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            PodcastStyle::Interview => "interview",
            PodcastStyle::Narrative => "narrative",
            PodcastStyle::Educational => "educational",
            PodcastStyle::Debate => "debate",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "interview" => Some(PodcastStyle::Interview),
            "narrative" => Some(PodcastStyle::Narrative),
            "educational" => Some(PodcastStyle::Educational),
            "debate" => Some(PodcastStyle::Debate),
            _ => None,
        }
    }
}

/// One recorded user interaction with a podcast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackDetails {
    pub id: String,
    pub user_id: String,
    pub podcast_id: String,
    pub feedback_type: FeedbackType,
    /// Optional explicit rating on a 0-5 scale.
    pub rating: Option<f64>,
    /// Topics the interaction was about.
    pub categories: Vec<String>,
    pub podcast_style: Option<PodcastStyle>,
    /// Epoch milliseconds; the decay math works in milliseconds.
    pub created_at_ms: i64,
    pub is_processed: bool,
}

/// Aggregate engagement metrics for a podcast, recomputed from its full
/// feedback history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodcastEngagement {
    pub podcast_id: String,
    pub total_feedback: u32,
    pub likes: u32,
    pub dislikes: u32,
    pub saves: u32,
    pub listens: u32,
    pub completions: u32,
    pub average_rating: Option<f64>,
    pub updated_at: i64,
}

/// Summary statistics for the feedback database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackStats {
    pub total: usize,
    pub unprocessed: usize,
}
