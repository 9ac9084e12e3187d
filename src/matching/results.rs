//! Validation, ranking and annotation of raw match scores.
//!
//! Validation is strict: matches are an internally computed artifact, so a
//! single malformed record fails the whole batch instead of being skipped.
//! The feedback pipeline takes the opposite stance; the asymmetry is
//! deliberate.

use super::scorer::PodcastMatch;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::config::MatchingSettings;

/// Errors from result processing.
#[derive(Debug, Error)]
pub enum ResultsError {
    /// The generic message is the contract; details go to the log. A batch
    /// hitting this indicates a bug in the upstream scorer.
    #[error("Invalid match data")]
    InvalidMatchData,
}

/// Quality tier assigned from the confidence of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityLevel {
    High,
    Low,
}

/// A validated, ranked match ready for presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedMatchResult {
    pub podcast_match: PodcastMatch,
    /// 1-based position after ranking.
    pub rank: usize,
    pub quality_level: QualityLevel,
    /// Blend of score and confidence, within [0, 1].
    pub match_strength: f64,
    pub display_reasons: Vec<String>,
}

/// The full processed result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedResults {
    /// Deduplicated union of every match's reasons, in first-seen order.
    pub applied_filters: Vec<String>,
    pub results: Vec<ProcessedMatchResult>,
}

/// Turns raw scorer output into a presentable, ranked result set.
#[derive(Debug, Clone)]
pub struct ResultsProcessor {
    high_confidence_threshold: f64,
}

/// Weight of the raw score (vs. confidence) in match strength.
const STRENGTH_SCORE_WEIGHT: f64 = 0.8;

impl ResultsProcessor {
    pub fn new(high_confidence_threshold: f64) -> Self {
        Self {
            high_confidence_threshold,
        }
    }

    pub fn from_settings(settings: &MatchingSettings) -> Self {
        Self::new(settings.high_confidence_threshold)
    }

    /// Validate, rank and annotate a batch of matches.
    ///
    /// Any single invalid record rejects the entire batch.
    pub fn process(&self, matches: Vec<PodcastMatch>) -> Result<ProcessedResults, ResultsError> {
        for m in &matches {
            validate_match(m)?;
        }

        let mut applied_filters: Vec<String> = vec![];
        for m in &matches {
            for reason in &m.breakdown.explanations {
                if !applied_filters.contains(reason) {
                    applied_filters.push(reason.clone());
                }
            }
        }

        let mut sorted = matches;
        sorted.sort_by(|a, b| {
            b.overall_score
                .partial_cmp(&a.overall_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.podcast_id.cmp(&b.podcast_id))
        });

        let results = sorted
            .into_iter()
            .enumerate()
            .map(|(index, m)| {
                let quality_level = if m.confidence >= self.high_confidence_threshold {
                    QualityLevel::High
                } else {
                    QualityLevel::Low
                };
                let match_strength = (STRENGTH_SCORE_WEIGHT * m.overall_score
                    + (1.0 - STRENGTH_SCORE_WEIGHT) * m.confidence)
                    .clamp(0.0, 1.0);
                let display_reasons = m.breakdown.explanations.clone();
                ProcessedMatchResult {
                    podcast_match: m,
                    rank: index + 1,
                    quality_level,
                    match_strength,
                    display_reasons,
                }
            })
            .collect();

        Ok(ProcessedResults {
            applied_filters,
            results,
        })
    }
}

fn in_unit_range(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

fn validate_match(m: &PodcastMatch) -> Result<(), ResultsError> {
    if m.podcast_id.is_empty() {
        warn!("Match {} rejected: empty podcast id", m.id);
        return Err(ResultsError::InvalidMatchData);
    }
    if !in_unit_range(m.overall_score) || !in_unit_range(m.confidence) {
        warn!(
            "Match {} rejected: score {} confidence {} out of range",
            m.id, m.overall_score, m.confidence
        );
        return Err(ResultsError::InvalidMatchData);
    }
    for subscore in m.breakdown.subscores() {
        if !in_unit_range(subscore) {
            warn!("Match {} rejected: subscore {} out of range", m.id, subscore);
            return Err(ResultsError::InvalidMatchData);
        }
    }
    Ok(())
}
