//! Core types for the autopsy pipeline
//!
//! Defines:
//! - Incident reports (raw input)
//! - Classification records (persisted output)
//! - The recognised failure taxonomy
//! - Per-incident skip diagnostics

use crate::error::FailureStage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// One reported AI failure, as free text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentReport {
    id: String,
    text: String,
}

impl IncidentReport {
    /// Create incident from id and description
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    /// Create incident keyed by the file stem of `path`
    ///
    /// Returns `None` when the path has no usable stem.
    #[must_use]
    pub fn from_path(path: &Path, text: impl Into<String>) -> Option<Self> {
        let stem = path.file_stem()?.to_str()?;
        if stem.is_empty() {
            return None;
        }
        Some(Self::new(stem, text))
    }

    /// Incident identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Raw incident description
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Structured classification of one incident
///
/// `severity_score` is always derived from `failure_type` through a
/// [`SeverityTable`](crate::severity::SeverityTable), never taken from the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    pub incident_id: String,
    pub failure_type: String,
    pub confidence: f64,
    pub recommended_fix: String,
    pub severity_score: u8,
    /// Monitored AI system the incident came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Unix seconds when the record was produced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

impl ClassificationRecord {
    /// Monitored system, or [`DEFAULT_SOURCE_MODEL`] for records without one
    #[must_use]
    pub fn model_name(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_SOURCE_MODEL)
    }

    /// `timestamp` as a UTC instant, millisecond precision
    #[must_use]
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        let secs = self.timestamp.filter(|t| t.is_finite())?;
        #[allow(clippy::cast_possible_truncation)]
        let millis = (secs * 1000.0).round() as i64;
        DateTime::from_timestamp_millis(millis)
    }

    /// Parsed failure category, if the label is one we recognise
    #[must_use]
    pub fn category(&self) -> Option<FailureType> {
        self.failure_type.parse().ok()
    }

    /// Severity at or above the high-risk cut-off
    #[inline]
    #[must_use]
    pub fn is_high_severity(&self) -> bool {
        self.severity_score >= HIGH_SEVERITY
    }
}

/// Monitored system assumed for records that do not name one
pub const DEFAULT_SOURCE_MODEL: &str = "CustomerSupportBot-v1";

/// Unix seconds with millisecond precision
#[must_use]
pub fn unix_seconds(at: DateTime<Utc>) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let millis = at.timestamp_millis() as f64;
    millis / 1000.0
}

/// Lowest severity, also the fallback for unknown labels
pub const MIN_SEVERITY: u8 = 1;

/// Highest severity
pub const MAX_SEVERITY: u8 = 5;

/// Severity from which an incident counts as high risk
pub const HIGH_SEVERITY: u8 = 4;

/// Recognised failure categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FailureType {
    #[serde(rename = "Hallucination")]
    Hallucination,
    #[serde(rename = "Data Drift")]
    DataDrift,
    #[serde(rename = "Retrieval Failure")]
    RetrievalFailure,
    #[serde(rename = "Prompt Design Failure")]
    PromptDesignFailure,
    #[serde(rename = "Tool Misuse")]
    ToolMisuse,
}

impl FailureType {
    /// Every category, most severe first
    pub const ALL: [FailureType; 5] = [
        FailureType::Hallucination,
        FailureType::DataDrift,
        FailureType::RetrievalFailure,
        FailureType::PromptDesignFailure,
        FailureType::ToolMisuse,
    ];

    /// Label as emitted by the model
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureType::Hallucination => "Hallucination",
            FailureType::DataDrift => "Data Drift",
            FailureType::RetrievalFailure => "Retrieval Failure",
            FailureType::PromptDesignFailure => "Prompt Design Failure",
            FailureType::ToolMisuse => "Tool Misuse",
        }
    }
}

impl std::fmt::Display for FailureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown failure label
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown failure type: '{0}'")]
pub struct UnknownFailureType(pub String);

impl FromStr for FailureType {
    type Err = UnknownFailureType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FailureType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownFailureType(s.to_string()))
    }
}

/// Incident dropped from a batch, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedIncident {
    pub incident_id: String,
    pub stage: FailureStage,
    pub message: String,
}

impl SkippedIncident {
    /// Create skip entry
    #[inline]
    #[must_use]
    pub fn new(incident_id: impl Into<String>, stage: FailureStage, message: impl Into<String>) -> Self {
        Self {
            incident_id: incident_id.into(),
            stage,
            message: message.into(),
        }
    }
}
