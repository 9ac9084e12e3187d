//! Multi-factor compatibility scoring between an author and a podcast.
//!
//! Scoring is a pure function of the author's preferences (plus the
//! optional derived adjustment) and the podcast's features. Same inputs,
//! same scores; the only non-deterministic output is the ephemeral match id.

use crate::author_store::{AuthorPreferences, PreferenceAdjustment, PreferredLength, StyleWeights};
use crate::catalog_store::Podcast;
use crate::feature_store::{ComplexityLevel, PodcastFeatures, UpdateFrequency};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Relative importance of each factor in the overall score.
///
/// The weights are fixed by design and sum to 1.0 (checked by a test).
/// Topic fit dominates, style and the two depth factors carry the middle,
/// and reach/format/quality refine the tail.
#[derive(Debug, Clone)]
pub struct ScoringWeights {
    pub topic: f64,
    pub expertise: f64,
    pub style: f64,
    pub audience: f64,
    pub format: f64,
    pub length: f64,
    pub complexity: f64,
    pub quality: f64,
}

pub const SCORING_WEIGHTS: ScoringWeights = ScoringWeights {
    topic: 0.30,
    expertise: 0.10,
    style: 0.15,
    audience: 0.08,
    format: 0.07,
    length: 0.10,
    complexity: 0.10,
    quality: 0.10,
};

/// Share of the topic and style scores driven by the derived adjustment
/// weights when an adjustment is present.
const ADJUSTMENT_BLEND: f64 = 0.3;

/// Per-factor subscores with human-readable explanations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchBreakdown {
    pub topic_score: f64,
    pub expertise_score: f64,
    pub style_score: f64,
    pub audience_score: f64,
    pub format_score: f64,
    pub length_score: f64,
    pub complexity_score: f64,
    pub quality_score: f64,
    pub explanations: Vec<String>,
}

impl MatchBreakdown {
    pub fn subscores(&self) -> [f64; 8] {
        [
            self.topic_score,
            self.expertise_score,
            self.style_score,
            self.audience_score,
            self.format_score,
            self.length_score,
            self.complexity_score,
            self.quality_score,
        ]
    }
}

/// Denormalized podcast summary carried on each match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodcastSummary {
    pub title: String,
    pub category: Option<String>,
    pub description: String,
    pub listener_count: Option<u64>,
    pub rating: Option<f64>,
    pub update_frequency: UpdateFrequency,
}

/// A scored pairing of one author against one podcast. Ephemeral;
/// recomputed per matching run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodcastMatch {
    pub id: String,
    pub podcast_id: String,
    pub overall_score: f64,
    /// How complete the input data was, independent of the score.
    pub confidence: f64,
    pub breakdown: MatchBreakdown,
    /// Podcast topics the author did not list; conversation starters.
    pub suggested_topics: Vec<String>,
    pub podcast: PodcastSummary,
}

/// Pure match scorer. No side effects, no I/O.
#[derive(Debug, Clone, Default)]
pub struct MatchScorer;

impl MatchScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score one author/podcast pairing.
    pub fn score(
        &self,
        preferences: &AuthorPreferences,
        adjustment: Option<&PreferenceAdjustment>,
        podcast: &Podcast,
        features: &PodcastFeatures,
    ) -> PodcastMatch {
        let topic_score = topic_score(preferences, adjustment, features);
        let expertise_score = expertise_score(preferences.expertise_level, features.complexity_level);
        let style_score = style_score(preferences, adjustment.map(|a| &a.style_weights), features);
        let audience_score = audience_score(podcast);
        let format_score = format_score(preferences, features);
        let length_score = length_score(preferences.preferred_length, features);
        let complexity_score = complexity_score(preferences.expertise_level, features);
        let quality_score = features.production_quality.clamp(0.0, 1.0);

        let w = &SCORING_WEIGHTS;
        let overall_score = (w.topic * topic_score
            + w.expertise * expertise_score
            + w.style * style_score
            + w.audience * audience_score
            + w.format * format_score
            + w.length * length_score
            + w.complexity * complexity_score
            + w.quality * quality_score)
            .clamp(0.0, 1.0);

        let confidence = confidence(podcast, features);

        let mut breakdown = MatchBreakdown {
            topic_score,
            expertise_score,
            style_score,
            audience_score,
            format_score,
            length_score,
            complexity_score,
            quality_score,
            explanations: vec![],
        };
        breakdown.explanations = explanations(&breakdown, confidence);

        PodcastMatch {
            id: Uuid::new_v4().to_string(),
            podcast_id: podcast.id.clone(),
            overall_score,
            confidence,
            breakdown,
            suggested_topics: suggested_topics(preferences, features),
            podcast: PodcastSummary {
                title: podcast.title.clone(),
                category: podcast.category().map(|s| s.to_string()),
                description: podcast.description.clone(),
                listener_count: podcast.listener_count,
                rating: podcast.rating,
                update_frequency: features.update_frequency,
            },
        }
    }
}

/// Set-intersection ratio between author topics and podcast topics,
/// blended with the adjustment's learned topic weights when present.
fn topic_score(
    preferences: &AuthorPreferences,
    adjustment: Option<&PreferenceAdjustment>,
    features: &PodcastFeatures,
) -> f64 {
    if preferences.topics.is_empty() {
        return 0.0;
    }

    let overlap = preferences
        .topics
        .iter()
        .filter(|t| features.main_topics.iter().any(|m| m.as_str() == t.as_str()))
        .count();
    let base = overlap as f64 / preferences.topics.len() as f64;

    let learned = adjustment.map(|adj| {
        features
            .main_topics
            .iter()
            .filter_map(|topic| adj.topic_weights.get(topic))
            .sum::<f64>()
            .clamp(0.0, 1.0)
    });

    match learned {
        Some(learned) => (1.0 - ADJUSTMENT_BLEND) * base + ADJUSTMENT_BLEND * learned,
        None => base,
    }
    .clamp(0.0, 1.0)
}

/// Agreement between the author's style toggles and the podcast's style
/// flags, blended with the learned style weights when present.
fn style_score(
    preferences: &AuthorPreferences,
    learned: Option<&StyleWeights>,
    features: &PodcastFeatures,
) -> f64 {
    let prefs = &preferences.style_preferences;
    let style = &features.content_style;

    let agreements = [
        prefs.interview == style.interview,
        prefs.storytelling == style.storytelling,
        prefs.educational == style.educational,
        prefs.debate == style.debate,
    ]
    .iter()
    .filter(|&&a| a)
    .count();
    let base = agreements as f64 / 4.0;

    match learned {
        Some(weights) => {
            // How much of the learned taste the podcast's styles cover.
            let covered = [
                (style.interview, weights.interview),
                (style.storytelling, weights.storytelling),
                (style.educational, weights.educational),
                (style.debate, weights.debate),
            ]
            .iter()
            .filter(|(present, _)| *present)
            .map(|(_, weight)| weight)
            .sum::<f64>()
            .clamp(0.0, 1.0);
            (1.0 - ADJUSTMENT_BLEND) * base + ADJUSTMENT_BLEND * covered
        }
        None => base,
    }
    .clamp(0.0, 1.0)
}

/// Closeness of the podcast's episode length bucket to the preferred one.
fn length_score(preferred: PreferredLength, features: &PodcastFeatures) -> f64 {
    if features.average_episode_minutes <= 0.0 {
        return 0.5;
    }
    let podcast_bucket = PreferredLength::from_minutes(features.average_episode_minutes);
    match preferred
        .bucket_index()
        .abs_diff(podcast_bucket.bucket_index())
    {
        0 => 1.0,
        1 => 0.6,
        _ => 0.25,
    }
}

fn level_index(level: ComplexityLevel) -> usize {
    match level {
        ComplexityLevel::Beginner => 0,
        ComplexityLevel::Intermediate => 1,
        ComplexityLevel::Advanced => 2,
    }
}

/// Closeness of the author's expertise to the podcast's content depth.
fn expertise_score(expertise: ComplexityLevel, complexity: ComplexityLevel) -> f64 {
    match level_index(expertise).abs_diff(level_index(complexity)) {
        0 => 1.0,
        1 => 0.6,
        _ => 0.2,
    }
}

/// How well the podcast's language difficulty sits for the author's level.
fn complexity_score(expertise: ComplexityLevel, features: &PodcastFeatures) -> f64 {
    if features.language_complexity <= 0.0 {
        return 0.5;
    }
    let target = match expertise {
        ComplexityLevel::Beginner => 0.3,
        ComplexityLevel::Intermediate => 0.5,
        ComplexityLevel::Advanced => 0.7,
    };
    (1.0 - (features.language_complexity - target).abs()).clamp(0.0, 1.0)
}

/// Audience reach and reception, neutral when the catalogue knows neither.
fn audience_score(podcast: &Podcast) -> f64 {
    let reach = podcast
        .listener_count
        .map(|listeners| (((listeners + 1) as f64).log10() / 6.0).clamp(0.0, 1.0));
    let reception = podcast.rating.map(|rating| (rating / 5.0).clamp(0.0, 1.0));

    match (reach, reception) {
        (Some(reach), Some(reception)) => (reach + reception) / 2.0,
        (Some(one), None) | (None, Some(one)) => one,
        (None, None) => 0.5,
    }
}

/// Hosting-style tags each author style preference welcomes.
const INTERVIEW_TAGS: &[&str] = &["interview", "conversational", "panel"];
const STORYTELLING_TAGS: &[&str] = &["narrative", "storytelling", "documentary"];
const EDUCATIONAL_TAGS: &[&str] = &["educational", "solo", "monologue", "lecture"];
const DEBATE_TAGS: &[&str] = &["debate", "panel", "roundtable"];

/// Fraction of the podcast's hosting tags the author's enabled styles
/// welcome; neutral when either side has nothing to say.
fn format_score(preferences: &AuthorPreferences, features: &PodcastFeatures) -> f64 {
    if features.hosting_style.is_empty() {
        return 0.5;
    }

    let prefs = &preferences.style_preferences;
    let mut welcome: Vec<&str> = vec![];
    if prefs.interview {
        welcome.extend_from_slice(INTERVIEW_TAGS);
    }
    if prefs.storytelling {
        welcome.extend_from_slice(STORYTELLING_TAGS);
    }
    if prefs.educational {
        welcome.extend_from_slice(EDUCATIONAL_TAGS);
    }
    if prefs.debate {
        welcome.extend_from_slice(DEBATE_TAGS);
    }
    if welcome.is_empty() {
        return 0.5;
    }

    let matched = features
        .hosting_style
        .iter()
        .filter(|tag| welcome.contains(&tag.as_str()))
        .count();
    matched as f64 / features.hosting_style.len() as f64
}

/// Confidence is the fraction of input data points that were present,
/// independent of how well the podcast scored.
fn confidence(podcast: &Podcast, features: &PodcastFeatures) -> f64 {
    let present = [
        !features.main_topics.is_empty(),
        !features.hosting_style.is_empty(),
        features.production_quality > 0.0,
        features.language_complexity > 0.0,
        features.average_episode_minutes > 0.0,
        podcast.listener_count.is_some(),
        podcast.rating.is_some(),
        !podcast.description.is_empty(),
    ]
    .iter()
    .filter(|&&p| p)
    .count();
    present as f64 / 8.0
}

// Thresholds above which a factor earns an explanation string.
const STRONG_TOPIC_THRESHOLD: f64 = 0.7;
const TOPIC_THRESHOLD: f64 = 0.4;
const STYLE_THRESHOLD: f64 = 0.75;
const QUALITY_THRESHOLD: f64 = 0.7;
const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.7;

fn explanations(breakdown: &MatchBreakdown, confidence: f64) -> Vec<String> {
    let mut reasons = vec![];
    if breakdown.topic_score > STRONG_TOPIC_THRESHOLD {
        reasons.push("Strong topic alignment".to_string());
    } else if breakdown.topic_score >= TOPIC_THRESHOLD {
        reasons.push("Topic match".to_string());
    }
    if breakdown.style_score >= STYLE_THRESHOLD {
        reasons.push("Style match".to_string());
    }
    if breakdown.length_score >= 1.0 {
        reasons.push("Preferred episode length".to_string());
    }
    if breakdown.expertise_score >= 1.0 {
        reasons.push("Expertise level match".to_string());
    }
    if breakdown.quality_score >= QUALITY_THRESHOLD {
        reasons.push("High production quality".to_string());
    }
    if confidence >= HIGH_CONFIDENCE_THRESHOLD {
        reasons.push("High confidence match".to_string());
    }
    reasons
}

fn suggested_topics(preferences: &AuthorPreferences, features: &PodcastFeatures) -> Vec<String> {
    features
        .main_topics
        .iter()
        .filter(|topic| !preferences.topics.iter().any(|t| t.as_str() == topic.as_str()))
        .take(3)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::author_store::{StylePreferences, Topic};
    use crate::feature_store::ContentStyle;
    use std::collections::HashMap;

    fn make_preferences() -> AuthorPreferences {
        AuthorPreferences {
            user_id: "user1".to_string(),
            topics: vec![Topic::Technology, Topic::Business],
            preferred_length: PreferredLength::Medium,
            style_preferences: StylePreferences {
                interview: true,
                storytelling: false,
                educational: true,
                debate: false,
            },
            expertise_level: ComplexityLevel::Advanced,
            updated_at: 0,
        }
    }

    fn make_podcast() -> Podcast {
        Podcast {
            id: "pod1".to_string(),
            title: "Tech Talks".to_string(),
            description: "Engineering interviews".to_string(),
            publisher: "TT".to_string(),
            categories: vec!["technology".to_string()],
            language: Some("en".to_string()),
            listener_count: Some(50000),
            rating: Some(4.5),
            total_episodes: Some(100),
            avg_episode_minutes: Some(35.0),
            episodes_per_month: Some(4.0),
        }
    }

    fn make_features() -> PodcastFeatures {
        PodcastFeatures {
            podcast_id: "pod1".to_string(),
            main_topics: vec!["technology".to_string(), "startups".to_string()],
            content_style: ContentStyle {
                interview: true,
                storytelling: false,
                educational: true,
                debate: false,
            },
            complexity_level: ComplexityLevel::Advanced,
            average_episode_minutes: 35.0,
            update_frequency: UpdateFrequency::Weekly,
            production_quality: 0.8,
            hosting_style: vec!["conversational".to_string()],
            language_complexity: 0.7,
            extracted_at: 0,
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        let w = &SCORING_WEIGHTS;
        let sum = w.topic + w.expertise + w.style + w.audience + w.format + w.length
            + w.complexity + w.quality;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_all_fields_within_bounds() {
        let scorer = MatchScorer::new();
        // Sweep a few degenerate feature shapes
        let feature_variants = vec![
            make_features(),
            PodcastFeatures {
                main_topics: vec![],
                hosting_style: vec![],
                production_quality: 0.0,
                language_complexity: 0.0,
                average_episode_minutes: 0.0,
                ..make_features()
            },
            PodcastFeatures {
                production_quality: 1.0,
                language_complexity: 1.0,
                average_episode_minutes: 300.0,
                ..make_features()
            },
        ];
        let podcast_variants = vec![
            make_podcast(),
            Podcast {
                listener_count: None,
                rating: None,
                description: String::new(),
                ..make_podcast()
            },
        ];

        for features in &feature_variants {
            for podcast in &podcast_variants {
                let result = scorer.score(&make_preferences(), None, podcast, features);
                assert!((0.0..=1.0).contains(&result.overall_score));
                assert!((0.0..=1.0).contains(&result.confidence));
                for subscore in result.breakdown.subscores() {
                    assert!((0.0..=1.0).contains(&subscore), "subscore {}", subscore);
                }
            }
        }
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let scorer = MatchScorer::new();
        let prefs = make_preferences();
        let podcast = make_podcast();
        let features = make_features();

        let a = scorer.score(&prefs, None, &podcast, &features);
        let b = scorer.score(&prefs, None, &podcast, &features);
        assert_eq!(a.overall_score, b.overall_score);
        assert_eq!(a.confidence, b.confidence);
        assert_eq!(a.breakdown.subscores(), b.breakdown.subscores());
        assert_eq!(a.breakdown.explanations, b.breakdown.explanations);
    }

    #[test]
    fn test_topic_overlap_ratio() {
        let prefs = make_preferences();
        // One of two author topics present
        let score = topic_score(&prefs, None, &make_features());
        assert!((score - 0.5).abs() < f64::EPSILON);

        // Both present
        let mut features = make_features();
        features.main_topics.push("business".to_string());
        let score = topic_score(&prefs, None, &features);
        assert!((score - 1.0).abs() < f64::EPSILON);

        // None present
        features.main_topics = vec!["sports".to_string()];
        let score = topic_score(&prefs, None, &features);
        assert!(score.abs() < f64::EPSILON);
    }

    #[test]
    fn test_topic_score_blends_adjustment() {
        let prefs = make_preferences();
        let mut topic_weights = HashMap::new();
        topic_weights.insert("technology".to_string(), 1.0);
        let adjustment = PreferenceAdjustment {
            user_id: "user1".to_string(),
            topic_weights,
            style_weights: StyleWeights::default(),
            last_adjusted: 0,
        };

        let with = topic_score(&prefs, Some(&adjustment), &make_features());
        let without = topic_score(&prefs, None, &make_features());
        // Learned weight fully on an overlapping topic pulls the score up
        assert!(with > without);
    }

    #[test]
    fn test_style_agreement() {
        let prefs = make_preferences();
        // Exact agreement on all four axes
        let score = style_score(&prefs, None, &make_features());
        assert!((score - 1.0).abs() < f64::EPSILON);

        let mut features = make_features();
        features.content_style = ContentStyle {
            interview: false,
            storytelling: true,
            educational: false,
            debate: true,
        };
        let score = style_score(&prefs, None, &features);
        assert!(score.abs() < f64::EPSILON);
    }

    #[test]
    fn test_length_buckets() {
        let features_short = PodcastFeatures {
            average_episode_minutes: 10.0,
            ..make_features()
        };
        let features_unknown = PodcastFeatures {
            average_episode_minutes: 0.0,
            ..make_features()
        };

        assert!((length_score(PreferredLength::Medium, &make_features()) - 1.0).abs() < f64::EPSILON);
        assert!((length_score(PreferredLength::Medium, &features_short) - 0.6).abs() < f64::EPSILON);
        assert!((length_score(PreferredLength::Long, &features_short) - 0.25).abs() < f64::EPSILON);
        assert!((length_score(PreferredLength::Medium, &features_unknown) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_expertise_distance() {
        assert!((expertise_score(ComplexityLevel::Advanced, ComplexityLevel::Advanced) - 1.0).abs() < f64::EPSILON);
        assert!((expertise_score(ComplexityLevel::Advanced, ComplexityLevel::Intermediate) - 0.6).abs() < f64::EPSILON);
        assert!((expertise_score(ComplexityLevel::Advanced, ComplexityLevel::Beginner) - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_audience_neutral_when_unknown() {
        let podcast = Podcast {
            listener_count: None,
            rating: None,
            ..make_podcast()
        };
        assert!((audience_score(&podcast) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_confidence_reflects_data_completeness() {
        let full = confidence(&make_podcast(), &make_features());
        assert!((full - 1.0).abs() < f64::EPSILON);

        let sparse_podcast = Podcast {
            listener_count: None,
            rating: None,
            description: String::new(),
            ..make_podcast()
        };
        let sparse = confidence(&sparse_podcast, &make_features());
        assert!(sparse < full);
        // 5 of 8 data points remain
        assert!((sparse - 5.0 / 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_confidence_independent_of_score() {
        let scorer = MatchScorer::new();
        // A podcast that scores terribly but has complete data
        let mut features = make_features();
        features.main_topics = vec!["sports".to_string()];
        features.content_style = ContentStyle {
            interview: false,
            storytelling: true,
            educational: false,
            debate: true,
        };
        let result = scorer.score(&make_preferences(), None, &make_podcast(), &features);
        assert!(result.overall_score < 0.6);
        assert!((result.confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_explanations_fire_at_thresholds() {
        let scorer = MatchScorer::new();
        let mut features = make_features();
        features.main_topics = vec!["technology".to_string(), "business".to_string()];
        let result = scorer.score(&make_preferences(), None, &make_podcast(), &features);

        let explanations = &result.breakdown.explanations;
        assert!(explanations.contains(&"Strong topic alignment".to_string()));
        assert!(explanations.contains(&"Style match".to_string()));
        assert!(explanations.contains(&"Preferred episode length".to_string()));
        assert!(explanations.contains(&"High production quality".to_string()));
        assert!(explanations.contains(&"High confidence match".to_string()));
    }

    #[test]
    fn test_suggested_topics_exclude_author_topics() {
        let scorer = MatchScorer::new();
        let result = scorer.score(&make_preferences(), None, &make_podcast(), &make_features());
        assert_eq!(result.suggested_topics, vec!["startups".to_string()]);
    }
}
