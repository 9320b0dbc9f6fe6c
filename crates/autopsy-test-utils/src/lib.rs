//! Testing utilities for the autopsy workspace
//!
//! Shared fakes, fixtures, and helpers.

#![allow(missing_docs)]

use async_trait::async_trait;
use autopsy_core::{
    BatchSummary, ClassificationRecord, IncidentReport, ProviderError, RemediationError, RemediationTrigger,
    SeverityTable, TextCompletionProvider,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Provider that answers by incident id found in the prompt
///
/// Prompts are matched on the `Incident ID: <id>` line of the classification
/// prompt; anything else gets the fallback answer.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    by_incident: Mutex<HashMap<String, Result<String, String>>>,
    fallback: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `response` for `incident_id`
    pub fn respond(self, incident_id: &str, response: impl Into<String>) -> Self {
        self.by_incident
            .lock()
            .insert(incident_id.to_string(), Ok(response.into()));
        self
    }

    /// Fail with `ProviderError::Unavailable` for `incident_id`
    pub fn fail(self, incident_id: &str, message: impl Into<String>) -> Self {
        self.by_incident
            .lock()
            .insert(incident_id.to_string(), Err(message.into()));
        self
    }

    /// Answer for prompts that match no incident
    pub fn with_fallback(mut self, response: impl Into<String>) -> Self {
        self.fallback = Some(response.into());
        self
    }

    /// Every prompt received, in order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl TextCompletionProvider for ScriptedProvider {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        self.prompts.lock().push(prompt.to_string());

        let incident_id = prompt
            .lines()
            .find_map(|line| line.strip_prefix("Incident ID: "))
            .map(str::trim);

        let scripted = incident_id.and_then(|id| self.by_incident.lock().get(id).cloned());
        match scripted {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(ProviderError::Unavailable(message)),
            None => self
                .fallback
                .clone()
                .ok_or_else(|| ProviderError::InvalidResponse("no scripted response".to_string())),
        }
    }
}

/// Trigger that only counts invocations
#[derive(Debug, Default)]
pub struct RecordingTrigger {
    calls: AtomicUsize,
}

impl RecordingTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemediationTrigger for RecordingTrigger {
    async fn trigger_repair(&self) -> Result<BatchSummary, RemediationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(BatchSummary::default())
    }
}

/// Well-formed model answer for `incident_id`, wrapped in chatty prose
pub fn model_answer(incident_id: &str, failure_type: &str, confidence: f64) -> String {
    let body = serde_json::json!({
        "incident_id": incident_id,
        "failure_type": failure_type,
        "confidence": confidence,
        "recommended_fix": format!("Mitigate {failure_type}")
    });
    format!("Here is my classification:\n{body:#}\nHope this helps!")
}

/// Record scored with the standard table
pub fn record(incident_id: &str, failure_type: &str) -> ClassificationRecord {
    ClassificationRecord {
        incident_id: incident_id.to_string(),
        failure_type: failure_type.to_string(),
        confidence: 0.9,
        recommended_fix: format!("Mitigate {failure_type}"),
        severity_score: SeverityTable::standard().score(failure_type),
        model: None,
        timestamp: None,
    }
}

/// `count` records per failure type, ids `<type>-<n>`
pub fn records_with_counts(counts: &[(&str, usize)]) -> Vec<ClassificationRecord> {
    counts
        .iter()
        .flat_map(|(failure_type, count)| {
            (0..*count).map(move |i| record(&format!("{}-{i}", failure_type.replace(' ', "_")), failure_type))
        })
        .collect()
}

pub fn incident(id: &str) -> IncidentReport {
    IncidentReport::new(id, format!("Incident {id}: the assistant misbehaved in production."))
}

/// Write `<id>.txt` incident files into `dir`
pub fn write_incident_files(dir: &Path, incidents: &[IncidentReport]) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    for incident in incidents {
        std::fs::write(dir.join(format!("{}.txt", incident.id())), incident.text())?;
    }
    Ok(())
}
