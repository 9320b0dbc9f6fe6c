//! Fixed failure-type to severity mapping

use crate::types::{FailureType, MAX_SEVERITY, MIN_SEVERITY};
use indexmap::IndexMap;

/// Severity lookup table with a fallback for unknown labels
///
/// Scoring never fails. All scores are clamped into `1..=5`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeverityTable {
    scores: IndexMap<String, u8>,
    fallback: u8,
}

impl SeverityTable {
    /// Create empty table with the lowest severity as fallback
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            scores: IndexMap::new(),
            fallback: MIN_SEVERITY,
        }
    }

    /// The standard table: Hallucination 5 down to Tool Misuse 1
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .with_score(FailureType::Hallucination.as_str(), 5)
            .with_score(FailureType::DataDrift.as_str(), 4)
            .with_score(FailureType::RetrievalFailure.as_str(), 3)
            .with_score(FailureType::PromptDesignFailure.as_str(), 2)
            .with_score(FailureType::ToolMisuse.as_str(), 1)
    }

    /// Set score for a label
    #[inline]
    #[must_use]
    pub fn with_score(mut self, label: impl Into<String>, score: u8) -> Self {
        self.scores.insert(label.into(), clamp(score));
        self
    }

    /// Set score for unknown labels
    #[inline]
    #[must_use]
    pub fn with_fallback(mut self, score: u8) -> Self {
        self.fallback = clamp(score);
        self
    }

    /// Severity for `failure_type`
    #[inline]
    #[must_use]
    pub fn score(&self, failure_type: &str) -> u8 {
        self.scores.get(failure_type).copied().unwrap_or(self.fallback)
    }

    /// Whether `failure_type` has an explicit entry
    #[inline]
    #[must_use]
    pub fn recognizes(&self, failure_type: &str) -> bool {
        self.scores.contains_key(failure_type)
    }

    /// Known labels in insertion order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.scores.keys().map(String::as_str)
    }
}

impl Default for SeverityTable {
    fn default() -> Self {
        Self::standard()
    }
}

fn clamp(score: u8) -> u8 {
    score.clamp(MIN_SEVERITY, MAX_SEVERITY)
}
