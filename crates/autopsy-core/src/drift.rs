//! Dominant-failure-type drift monitor
//!
//! Counts failure types over every stored record, picks the dominant one and
//! fires the remediation trigger when its share is strictly above the
//! threshold.
//!
//! # Tie-break
//!
//! When several types share the highest count, the lexicographically smallest
//! label wins. The result does not depend on record order.

use crate::classifier::BatchSummary;
use crate::error::AutopsyResult;
use crate::remediation::RemediationTrigger;
use crate::store::RecordStore;
use crate::types::ClassificationRecord;
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;

/// Default drift threshold (exclusive)
pub const DEFAULT_DRIFT_THRESHOLD: f64 = 0.6;

/// Failure-type distribution for one monitor run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriftReport {
    /// Count per failure type, in order of first appearance
    pub counts: IndexMap<String, usize>,
    /// Records considered
    pub total: usize,
    /// Most frequent failure type
    pub dominant: String,
    /// Records with the dominant type
    pub dominant_count: usize,
    /// `dominant_count / total`
    pub ratio: f64,
    /// Threshold the ratio was compared against
    pub threshold: f64,
    /// `ratio > threshold`
    pub drift_detected: bool,
}

impl std::fmt::Display for DriftReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Failure Drift Monitor Report")?;
        writeln!(f, "============================")?;
        for (failure_type, count) in &self.counts {
            writeln!(f, "{failure_type}: {count}")?;
        }
        writeln!(f, "----------------------------")?;
        writeln!(f, "Dominant Failure Type: {}", self.dominant)?;
        writeln!(f, "Ratio: {}/{} ({:.2})", self.dominant_count, self.total, self.ratio)?;
        if self.drift_detected {
            write!(f, "Drift detected (ratio > {})", self.threshold)
        } else {
            write!(f, "No significant drift detected")
        }
    }
}

/// Result of [`DriftMonitor::run`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DriftOutcome {
    /// No records stored yet
    NoData,
    /// Distribution below threshold
    Stable {
        /// Distribution that was evaluated
        report: DriftReport,
    },
    /// Drift detected and the trigger was invoked
    Remediated {
        /// Distribution that was evaluated
        report: DriftReport,
        /// What the repair pass managed to do
        repairs: BatchSummary,
    },
}

impl DriftOutcome {
    /// Report, unless there was no data
    #[must_use]
    pub fn report(&self) -> Option<&DriftReport> {
        match self {
            Self::NoData => None,
            Self::Stable { report } | Self::Remediated { report, .. } => Some(report),
        }
    }
}

/// Drift decision over the record store
pub struct DriftMonitor {
    threshold: f64,
    trigger: Arc<dyn RemediationTrigger>,
}

impl std::fmt::Debug for DriftMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriftMonitor")
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

impl DriftMonitor {
    /// Monitor with the default threshold
    #[inline]
    #[must_use]
    pub fn new(trigger: Arc<dyn RemediationTrigger>) -> Self {
        Self {
            threshold: DEFAULT_DRIFT_THRESHOLD,
            trigger,
        }
    }

    /// Override the threshold
    #[inline]
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Threshold in use
    #[inline]
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Compute the drift report; `None` when `records` is empty
    ///
    /// Pure: the same records always give the same report.
    #[must_use]
    pub fn evaluate(&self, records: &[ClassificationRecord]) -> Option<DriftReport> {
        evaluate(records, self.threshold)
    }

    /// Snapshot the store, evaluate, and trigger remediation once on drift
    ///
    /// # Errors
    /// Store read failure, or remediation failure when drift was detected.
    pub async fn run(&self, store: &dyn RecordStore) -> AutopsyResult<DriftOutcome> {
        let records = store.get_all()?;

        let Some(report) = self.evaluate(&records) else {
            tracing::info!("no classification data yet");
            return Ok(DriftOutcome::NoData);
        };

        tracing::info!(
            dominant = %report.dominant,
            ratio = report.ratio,
            total = report.total,
            "drift evaluated"
        );

        if !report.drift_detected {
            return Ok(DriftOutcome::Stable { report });
        }

        tracing::warn!(dominant = %report.dominant, ratio = report.ratio, "drift detected, triggering remediation");
        let repairs = self.trigger.trigger_repair().await?;
        if repairs.persisted.is_empty() {
            tracing::warn!(skipped = repairs.skipped.len(), "remediation produced no repairs");
        }
        Ok(DriftOutcome::Remediated { report, repairs })
    }
}

/// Drift report for `records` against `threshold`
#[must_use]
pub fn evaluate(records: &[ClassificationRecord], threshold: f64) -> Option<DriftReport> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for record in records {
        *counts.entry(record.failure_type.clone()).or_insert(0) += 1;
    }

    let (dominant, dominant_count) = counts
        .iter()
        .max_by(|(a_label, a_count), (b_label, b_count)| {
            a_count.cmp(b_count).then_with(|| b_label.cmp(a_label))
        })
        .map(|(label, count)| (label.clone(), *count))?;

    let total = records.len();
    #[allow(clippy::cast_precision_loss)]
    let ratio = dominant_count as f64 / total as f64;

    Some(DriftReport {
        counts,
        total,
        dominant,
        dominant_count,
        ratio,
        threshold,
        drift_detected: ratio > threshold,
    })
}
