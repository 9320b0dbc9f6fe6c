//! Command dispatch and console output

use crate::cli::Command;
use crate::pipeline::Pipeline;
use anyhow::{ensure, Context, Result};
use autopsy_core::{BatchSummary, DriftOutcome};
use rand::Rng;
use std::io::Write;

/// Run `command` against `pipeline`, writing human output to `out`
///
/// # Errors
/// Any pipeline failure, or invalid `inject` arguments.
pub async fn execute(pipeline: &Pipeline, command: &Command, out: &mut impl Write) -> Result<()> {
    match command {
        Command::Classify => {
            let batch = pipeline.classify().await.context("classification failed")?;
            print_batch(out, "Classified", &batch)?;
        }
        Command::Drift => {
            let outcome = pipeline.drift().await.context("drift check failed")?;
            print_drift(out, &outcome)?;
        }
        Command::Repair => {
            let batch = pipeline.repair().await.context("repair generation failed")?;
            print_batch(out, "Repaired", &batch)?;
        }
        Command::Run => {
            let report = pipeline.run().await.context("pipeline run failed")?;
            print_batch(out, "Classified", &report.batch)?;
            print_drift(out, &report.drift)?;
        }
        Command::Summary { json } => {
            let summary = pipeline.summary().context("reading classifications failed")?;
            if *json {
                writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?;
            } else {
                write!(out, "{summary}")?;
            }
        }
        Command::Inject {
            failure_type,
            confidence,
        } => {
            let confidence = match confidence {
                Some(c) => {
                    ensure!((0.0..=1.0).contains(c), "confidence must be within [0, 1], got {c}");
                    *c
                }
                None => random_confidence(),
            };
            let record = pipeline
                .inject(failure_type, confidence, chrono::Utc::now())
                .context("storing simulated incident failed")?;
            writeln!(
                out,
                "Injected {} ({} on {}, severity {}, confidence {:.2})",
                record.incident_id,
                record.failure_type,
                record.model_name(),
                record.severity_score,
                record.confidence
            )?;
        }
    }
    Ok(())
}

fn random_confidence() -> f64 {
    let value: f64 = rand::rng().random_range(0.6..=1.0);
    (value * 100.0).round() / 100.0
}

fn print_batch(out: &mut impl Write, verb: &str, batch: &BatchSummary) -> Result<()> {
    if batch.is_empty() {
        writeln!(out, "No incidents found.")?;
        return Ok(());
    }
    writeln!(
        out,
        "{verb} {} of {} incidents",
        batch.persisted.len(),
        batch.total()
    )?;
    for skipped in &batch.skipped {
        writeln!(
            out,
            "  skipped {} at {}: {}",
            skipped.incident_id, skipped.stage, skipped.message
        )?;
    }
    Ok(())
}

fn print_drift(out: &mut impl Write, outcome: &DriftOutcome) -> Result<()> {
    match outcome {
        DriftOutcome::NoData => writeln!(out, "No classification data available.")?,
        DriftOutcome::Stable { report } => {
            writeln!(out, "{report}")?;
        }
        DriftOutcome::Remediated { report, repairs } => {
            writeln!(out, "{report}")?;
            if repairs.persisted.is_empty() && !repairs.skipped.is_empty() {
                writeln!(out, "Repair pass failed for all {} incidents.", repairs.total())?;
            }
            print_batch(out, "Repaired", repairs)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_confidence_stays_in_range() {
        for _ in 0..200 {
            let c = random_confidence();
            assert!((0.6..=1.0).contains(&c), "{c}");
            assert_eq!((c * 100.0).round() / 100.0, c);
        }
    }

    #[test]
    fn empty_batch_prints_no_incidents() {
        let mut out = Vec::new();
        print_batch(&mut out, "classified", &BatchSummary::default()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No incidents found.\n");
    }

    #[test]
    fn no_data_prints_message() {
        let mut out = Vec::new();
        print_drift(&mut out, &DriftOutcome::NoData).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No classification data available.\n");
    }
}
