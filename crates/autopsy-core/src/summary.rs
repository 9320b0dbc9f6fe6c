//! Reliability summary over stored classifications
//!
//! Executive numbers for operators: totals, high-severity count, average
//! severity, a letter grade, the failure distribution, per-model reliability,
//! a daily severity timeline and an incident ranking.

use crate::severity::SeverityTable;
use crate::types::{unix_seconds, ClassificationRecord, HIGH_SEVERITY};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Letter grade from average severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ReliabilityGrade {
    A,
    B,
    C,
    D,
}

impl ReliabilityGrade {
    /// A below 2, B below 3, C below 4, D otherwise
    #[must_use]
    pub fn from_average_severity(avg: f64) -> Self {
        if avg < 2.0 {
            Self::A
        } else if avg < 3.0 {
            Self::B
        } else if avg < 4.0 {
            Self::C
        } else {
            Self::D
        }
    }
}

impl std::fmt::Display for ReliabilityGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        };
        f.write_str(s)
    }
}

/// Share of one failure type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeShare {
    pub failure_type: String,
    pub count: usize,
    /// Percentage of all incidents, 0–100
    pub percent: f64,
}

/// Reliability of one monitored system
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelStats {
    pub model: String,
    pub incidents: usize,
    pub average_severity: f64,
    pub average_confidence: f64,
    /// Same formula as the overall score, over this model's incidents
    pub reliability_score: f64,
}

/// Mean severity of the incidents recorded on one UTC day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySeverity {
    pub date: NaiveDate,
    pub incidents: usize,
    pub average_severity: f64,
}

/// Aggregate view of every stored record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReliabilitySummary {
    pub total: usize,
    pub high_severity: usize,
    /// Rounded to two decimals, 0 when empty
    pub average_severity: f64,
    /// Rounded to two decimals, 0 when empty
    pub average_confidence: f64,
    pub grade: ReliabilityGrade,
    /// `100 - 15 * average_severity`, clamped to 0..=100
    pub reliability_score: f64,
    /// Most frequent first, ties by label
    pub distribution: Vec<TypeShare>,
    /// Ordered by model name; records without one count as the default model
    pub models: Vec<ModelStats>,
    /// Oldest day first
    pub timeline: Vec<DailySeverity>,
    /// Records without a timestamp, left out of `timeline`
    pub undated: usize,
    /// Highest severity first, ties by incident id
    pub ranked: Vec<ClassificationRecord>,
}

impl ReliabilitySummary {
    /// Summarise `records`
    #[must_use]
    pub fn from_records(records: &[ClassificationRecord]) -> Self {
        let total = records.len();
        let high_severity = records.iter().filter(|r| r.is_high_severity()).count();

        let average_severity = round2(mean(records.iter().map(|r| f64::from(r.severity_score))));
        let average_confidence = round2(mean(records.iter().map(|r| r.confidence)));

        let mut distribution: Vec<TypeShare> = Vec::new();
        for record in records {
            match distribution.iter_mut().find(|s| s.failure_type == record.failure_type) {
                Some(share) => share.count += 1,
                None => distribution.push(TypeShare {
                    failure_type: record.failure_type.clone(),
                    count: 1,
                    percent: 0.0,
                }),
            }
        }
        for share in &mut distribution {
            #[allow(clippy::cast_precision_loss)]
            let pct = share.count as f64 * 100.0 / total as f64;
            share.percent = round2(pct);
        }
        distribution.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.failure_type.cmp(&b.failure_type)));

        let mut by_model: BTreeMap<&str, Vec<&ClassificationRecord>> = BTreeMap::new();
        for record in records {
            by_model.entry(record.model_name()).or_default().push(record);
        }
        let models = by_model
            .into_iter()
            .map(|(model, group)| {
                let average_severity = round2(mean(group.iter().map(|r| f64::from(r.severity_score))));
                ModelStats {
                    model: model.to_string(),
                    incidents: group.len(),
                    average_severity,
                    average_confidence: round2(mean(group.iter().map(|r| r.confidence))),
                    reliability_score: reliability_score(average_severity),
                }
            })
            .collect();

        let mut by_day: BTreeMap<NaiveDate, Vec<u8>> = BTreeMap::new();
        let mut undated = 0;
        for record in records {
            match record.recorded_at() {
                Some(at) => by_day.entry(at.date_naive()).or_default().push(record.severity_score),
                None => undated += 1,
            }
        }
        let timeline = by_day
            .into_iter()
            .map(|(date, scores)| DailySeverity {
                date,
                incidents: scores.len(),
                average_severity: round2(mean(scores.iter().copied().map(f64::from))),
            })
            .collect();

        let mut ranked = records.to_vec();
        ranked.sort_by(|a, b| {
            b.severity_score
                .cmp(&a.severity_score)
                .then_with(|| a.incident_id.cmp(&b.incident_id))
        });

        Self {
            total,
            high_severity,
            average_severity,
            average_confidence,
            grade: ReliabilityGrade::from_average_severity(average_severity),
            reliability_score: reliability_score(average_severity),
            distribution,
            models,
            timeline,
            undated,
            ranked,
        }
    }

    /// Whether any incident is at or above the high-severity cut-off
    #[inline]
    #[must_use]
    pub fn has_high_severity(&self) -> bool {
        self.high_severity > 0
    }
}

impl std::fmt::Display for ReliabilitySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Executive Summary")?;
        writeln!(f, "=================")?;
        writeln!(f, "Total Incidents:   {}", self.total)?;
        writeln!(f, "High Severity:     {} (severity >= {HIGH_SEVERITY})", self.high_severity)?;
        writeln!(f, "Avg Severity:      {:.2}", self.average_severity)?;
        writeln!(f, "Avg Confidence:    {:.2}", self.average_confidence)?;
        writeln!(f, "Reliability Grade: {}", self.grade)?;
        writeln!(f, "Reliability Score: {:.1}", self.reliability_score)?;

        if self.total == 0 {
            return write!(f, "\nNo classification data yet.");
        }

        writeln!(f, "\nFailure Distribution")?;
        for share in &self.distribution {
            writeln!(f, "  {:<24} {:>4}  {:>6.2}%", share.failure_type, share.count, share.percent)?;
        }

        writeln!(f, "\nModel Reliability")?;
        for stats in &self.models {
            writeln!(
                f,
                "  {:<24} {:>4} incidents  avg sev {:.2}  avg conf {:.2}  score {:.1}",
                stats.model, stats.incidents, stats.average_severity, stats.average_confidence, stats.reliability_score
            )?;
        }

        if !self.timeline.is_empty() {
            writeln!(f, "\nSeverity Timeline")?;
            for day in &self.timeline {
                writeln!(f, "  {}  {:.2} ({} incidents)", day.date, day.average_severity, day.incidents)?;
            }
        }

        writeln!(f, "\nIncidents by Severity")?;
        for record in &self.ranked {
            writeln!(
                f,
                "  [{}] {:<20} {:<24} conf {:.2}",
                record.severity_score, record.incident_id, record.failure_type, record.confidence
            )?;
        }
        Ok(())
    }
}

/// Build a synthetic incident record for `model`
///
/// The id is `sim_<unix seconds>_<microseconds>`, so injections within the
/// same second get distinct ids.
#[must_use]
pub fn simulate_record(
    failure_type: &str,
    confidence: f64,
    model: &str,
    severity: &SeverityTable,
    now: DateTime<Utc>,
) -> ClassificationRecord {
    ClassificationRecord {
        incident_id: format!("sim_{}_{:06}", now.timestamp(), now.timestamp_subsec_micros()),
        failure_type: failure_type.to_string(),
        confidence,
        recommended_fix: "Auto-generated mitigation plan".to_string(),
        severity_score: severity.score(failure_type),
        model: Some(model.to_string()),
        timestamp: Some(unix_seconds(now)),
    }
}

fn reliability_score(average_severity: f64) -> f64 {
    (100.0 - average_severity * 15.0).clamp(0.0, 100.0)
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0u32), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / f64::from(n)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn record(id: &str, failure_type: &str, severity: u8, confidence: f64) -> ClassificationRecord {
        ClassificationRecord {
            incident_id: id.into(),
            failure_type: failure_type.into(),
            confidence,
            recommended_fix: String::new(),
            severity_score: severity,
            model: None,
            timestamp: None,
        }
    }

    fn stamped(record: ClassificationRecord, model: &str, at: DateTime<Utc>) -> ClassificationRecord {
        ClassificationRecord {
            model: Some(model.into()),
            timestamp: Some(unix_seconds(at)),
            ..record
        }
    }

    #[test]
    fn grades_follow_average_severity() {
        assert_eq!(ReliabilityGrade::from_average_severity(0.0), ReliabilityGrade::A);
        assert_eq!(ReliabilityGrade::from_average_severity(1.99), ReliabilityGrade::A);
        assert_eq!(ReliabilityGrade::from_average_severity(2.0), ReliabilityGrade::B);
        assert_eq!(ReliabilityGrade::from_average_severity(3.5), ReliabilityGrade::C);
        assert_eq!(ReliabilityGrade::from_average_severity(4.0), ReliabilityGrade::D);
    }

    #[test]
    fn empty_summary() {
        let summary = ReliabilitySummary::from_records(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.average_severity, 0.0);
        assert_eq!(summary.grade, ReliabilityGrade::A);
        assert_eq!(summary.reliability_score, 100.0);
        assert!(summary.to_string().contains("No classification data yet."));
    }

    #[test]
    fn summary_aggregates_records() {
        let records = vec![
            record("b", "Hallucination", 5, 0.9),
            record("a", "Hallucination", 5, 0.8),
            record("c", "Tool Misuse", 1, 0.7),
        ];
        let summary = ReliabilitySummary::from_records(&records);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.high_severity, 2);
        assert_eq!(summary.average_severity, 3.67);
        assert_eq!(summary.average_confidence, 0.8);
        assert_eq!(summary.grade, ReliabilityGrade::C);
        assert!((summary.reliability_score - 44.95).abs() < 1e-9);

        assert_eq!(
            summary.distribution,
            vec![
                TypeShare { failure_type: "Hallucination".into(), count: 2, percent: 66.67 },
                TypeShare { failure_type: "Tool Misuse".into(), count: 1, percent: 33.33 },
            ]
        );
        let ranked: Vec<_> = summary.ranked.iter().map(|r| r.incident_id.as_str()).collect();
        assert_eq!(ranked, ["a", "b", "c"]);
    }

    #[test]
    fn simulated_record_is_scored() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let record = simulate_record("Data Drift", 0.75, "CheckoutAssistant", &SeverityTable::standard(), now);
        assert_eq!(record.incident_id, "sim_1700000000_000000");
        assert_eq!(record.severity_score, 4);
        assert_eq!(record.recommended_fix, "Auto-generated mitigation plan");
        assert_eq!(record.model.as_deref(), Some("CheckoutAssistant"));
        assert_eq!(record.recorded_at(), Some(now));
    }

    #[test]
    fn simulations_in_the_same_second_get_distinct_ids() {
        let table = SeverityTable::standard();
        let first = Utc.timestamp_opt(1_700_000_000, 1_000).unwrap();
        let second = Utc.timestamp_opt(1_700_000_000, 2_000).unwrap();
        let a = simulate_record("Hallucination", 0.9, "bot", &table, first);
        let b = simulate_record("Hallucination", 0.9, "bot", &table, second);
        assert_eq!(a.incident_id, "sim_1700000000_000001");
        assert_eq!(b.incident_id, "sim_1700000000_000002");
    }

    #[test]
    fn per_model_stats_group_and_score() {
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let records = vec![
            stamped(record("a", "Hallucination", 5, 0.9), "BillingAgent-v2", at),
            stamped(record("b", "Data Drift", 4, 0.7), "BillingAgent-v2", at),
            stamped(record("c", "Tool Misuse", 1, 0.6), "CheckoutAssistant", at),
            record("d", "Retrieval Failure", 3, 0.8),
        ];
        let summary = ReliabilitySummary::from_records(&records);

        assert_eq!(
            summary.models,
            vec![
                ModelStats {
                    model: "BillingAgent-v2".into(),
                    incidents: 2,
                    average_severity: 4.5,
                    average_confidence: 0.8,
                    reliability_score: 32.5,
                },
                ModelStats {
                    model: "CheckoutAssistant".into(),
                    incidents: 1,
                    average_severity: 1.0,
                    average_confidence: 0.6,
                    reliability_score: 85.0,
                },
                ModelStats {
                    model: crate::types::DEFAULT_SOURCE_MODEL.into(),
                    incidents: 1,
                    average_severity: 3.0,
                    average_confidence: 0.8,
                    reliability_score: 55.0,
                },
            ]
        );
    }

    #[test]
    fn model_score_is_clamped() {
        let records = vec![record("a", "Hallucination", 5, 1.0); 3];
        let summary = ReliabilitySummary::from_records(&records);
        assert_eq!(summary.models[0].reliability_score, 25.0);
        assert_eq!(reliability_score(7.0), 0.0);
        assert_eq!(reliability_score(0.0), 100.0);
    }

    #[test]
    fn timeline_averages_by_day() {
        let monday = Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap();
        let monday_late = Utc.with_ymd_and_hms(2026, 3, 2, 23, 59, 0).unwrap();
        let tuesday = Utc.with_ymd_and_hms(2026, 3, 3, 0, 5, 0).unwrap();
        let records = vec![
            stamped(record("c", "Tool Misuse", 1, 0.9), "bot", tuesday),
            stamped(record("a", "Hallucination", 5, 0.9), "bot", monday),
            stamped(record("b", "Retrieval Failure", 3, 0.9), "bot", monday_late),
            record("undated", "Data Drift", 4, 0.9),
        ];
        let summary = ReliabilitySummary::from_records(&records);

        assert_eq!(
            summary.timeline,
            vec![
                DailySeverity {
                    date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
                    incidents: 2,
                    average_severity: 4.0,
                },
                DailySeverity {
                    date: NaiveDate::from_ymd_opt(2026, 3, 3).unwrap(),
                    incidents: 1,
                    average_severity: 1.0,
                },
            ]
        );
        assert_eq!(summary.undated, 1);
        let text = summary.to_string();
        assert!(text.contains("Severity Timeline"));
        assert!(text.contains("2026-03-02  4.00 (2 incidents)"));
    }
}
