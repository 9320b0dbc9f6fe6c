//! Sequential batch classification
//!
//! Each incident goes model → enricher → store on its own. Any failure skips
//! that incident and the batch carries on with the next one.

use crate::enricher::ClassificationEnricher;
use crate::error::{AutopsyError, AutopsyResult};
use crate::prompt::PromptBuilder;
use crate::provider::TextCompletionProvider;
use crate::store::RecordStore;
use crate::types::{unix_seconds, ClassificationRecord, IncidentReport, SkippedIncident};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Outcome of one classification batch
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    /// Ids of incidents whose record was written
    pub persisted: Vec<String>,
    /// Incidents dropped, with stage and reason
    pub skipped: Vec<SkippedIncident>,
}

impl BatchSummary {
    /// Incidents seen
    #[inline]
    #[must_use]
    pub fn total(&self) -> usize {
        self.persisted.len() + self.skipped.len()
    }

    /// No incidents were offered at all
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Classifies incidents and persists their records
pub struct IncidentClassifier {
    provider: Arc<dyn TextCompletionProvider>,
    store: Arc<dyn RecordStore>,
    enricher: ClassificationEnricher,
    prompts: PromptBuilder,
    source_model: Option<String>,
    clock: fn() -> DateTime<Utc>,
}

impl std::fmt::Debug for IncidentClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IncidentClassifier")
            .field("enricher", &self.enricher)
            .field("prompts", &self.prompts)
            .field("source_model", &self.source_model)
            .finish_non_exhaustive()
    }
}

impl IncidentClassifier {
    /// Create classifier with the standard schema, severity table and prompts
    #[must_use]
    pub fn new(provider: Arc<dyn TextCompletionProvider>, store: Arc<dyn RecordStore>) -> Self {
        Self {
            provider,
            store,
            enricher: ClassificationEnricher::default(),
            prompts: PromptBuilder::default(),
            source_model: None,
            clock: Utc::now,
        }
    }

    /// Tag every record with the monitored system that produced the incidents
    #[inline]
    #[must_use]
    pub fn with_source_model(mut self, model: impl Into<String>) -> Self {
        self.source_model = Some(model.into());
        self
    }

    /// Time source for record timestamps
    #[inline]
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Use a custom enricher
    #[inline]
    #[must_use]
    pub fn with_enricher(mut self, enricher: ClassificationEnricher) -> Self {
        self.enricher = enricher;
        self
    }

    /// Use custom prompts
    #[inline]
    #[must_use]
    pub fn with_prompts(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }

    /// Classify one incident and overwrite its stored record
    ///
    /// # Errors
    /// Provider, classification or store failure for this incident.
    pub async fn classify_incident(
        &self,
        incident: &IncidentReport,
    ) -> AutopsyResult<ClassificationRecord> {
        let prompt = self.prompts.classification(incident);
        let response = self.provider.complete(&prompt).await?;
        let mut record = self.enricher.enrich(incident.id(), &response)?;
        record.model.clone_from(&self.source_model);
        record.timestamp = Some(unix_seconds((self.clock)()));
        self.store.put(record.clone())?;
        Ok(record)
    }

    /// Classify every incident in order, skipping the ones that fail
    pub async fn classify_batch(&self, incidents: &[IncidentReport]) -> BatchSummary {
        let mut summary = BatchSummary::default();

        if incidents.is_empty() {
            tracing::info!("no incidents to classify");
            return summary;
        }

        for incident in incidents {
            match self.classify_incident(incident).await {
                Ok(record) => {
                    tracing::info!(
                        incident_id = incident.id(),
                        failure_type = %record.failure_type,
                        severity = record.severity_score,
                        "classification saved"
                    );
                    summary.persisted.push(record.incident_id);
                }
                Err(e) => {
                    tracing::warn!(incident_id = incident.id(), error = %e, "skipping incident");
                    summary.skipped.push(skip_entry(incident, &e));
                }
            }
        }

        tracing::info!(
            persisted = summary.persisted.len(),
            skipped = summary.skipped.len(),
            "classification batch finished"
        );
        summary
    }
}

fn skip_entry(incident: &IncidentReport, error: &AutopsyError) -> SkippedIncident {
    let stage = error
        .stage()
        .unwrap_or(crate::error::FailureStage::Completion);
    SkippedIncident::new(incident.id(), stage, error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FailureStage, ProviderError};
    use crate::provider::MockTextCompletionProvider;
    use crate::store::InMemoryRecordStore;

    fn response(id: &str, failure_type: &str) -> String {
        format!(
            r#"{{"incident_id": "{id}", "failure_type": "{failure_type}", "confidence": 0.9, "recommended_fix": "Add guardrails"}}"#
        )
    }

    fn fixed_clock() -> DateTime<Utc> {
        use chrono::TimeZone;
        Utc.with_ymd_and_hms(2026, 3, 2, 14, 30, 0).unwrap()
    }

    fn classifier(
        provider: MockTextCompletionProvider,
        store: Arc<InMemoryRecordStore>,
    ) -> IncidentClassifier {
        IncidentClassifier::new(Arc::new(provider), store).with_clock(fixed_clock)
    }

    #[tokio::test]
    async fn batch_skips_invalid_and_continues() {
        let mut provider = MockTextCompletionProvider::new();
        provider.expect_complete().returning(|prompt| {
            if prompt.contains("Incident ID: bad_prose") {
                Ok("I am unable to classify this.".to_string())
            } else if prompt.contains("Incident ID: bad_schema") {
                Ok(r#"{"incident_id": "bad_schema", "failure_type": "Hallucination"}"#.to_string())
            } else if prompt.contains("Incident ID: offline") {
                Err(ProviderError::Unavailable("connection refused".into()))
            } else if prompt.contains("Incident ID: good_1") {
                Ok(response("good_1", "Hallucination"))
            } else {
                Ok(response("good_2", "Tool Misuse"))
            }
        });

        let store = Arc::new(InMemoryRecordStore::new());
        let incidents = vec![
            IncidentReport::new("good_1", "a"),
            IncidentReport::new("bad_prose", "b"),
            IncidentReport::new("bad_schema", "c"),
            IncidentReport::new("offline", "d"),
            IncidentReport::new("good_2", "e"),
        ];

        let summary = classifier(provider, store.clone()).classify_batch(&incidents).await;

        assert_eq!(summary.total(), 5);
        assert_eq!(summary.persisted, vec!["good_1".to_string(), "good_2".to_string()]);
        let stages: Vec<_> = summary.skipped.iter().map(|s| s.stage).collect();
        assert_eq!(
            stages,
            vec![FailureStage::Extraction, FailureStage::Schema, FailureStage::Completion]
        );
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("good_2").unwrap().unwrap().severity_score, 1);
    }

    #[tokio::test]
    async fn empty_batch_reports_no_data() {
        let mut provider = MockTextCompletionProvider::new();
        provider.expect_complete().never();

        let store = Arc::new(InMemoryRecordStore::new());
        let summary = classifier(provider, store.clone()).classify_batch(&[]).await;

        assert!(summary.is_empty());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn reclassifying_overwrites_identical_record() {
        let mut provider = MockTextCompletionProvider::new();
        provider
            .expect_complete()
            .times(2)
            .returning(|_| Ok(response("incident_001", "Data Drift")));

        let store = Arc::new(InMemoryRecordStore::new());
        let classifier = classifier(provider, store.clone());
        let incident = IncidentReport::new("incident_001", "Accuracy dropped after the catalog update.");

        let first = classifier.classify_incident(&incident).await.unwrap();
        let second = classifier.classify_incident(&incident).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_all().unwrap(), vec![first]);
    }

    #[tokio::test]
    async fn records_are_stamped_with_source_model_and_time() {
        let mut provider = MockTextCompletionProvider::new();
        provider
            .expect_complete()
            .returning(|_| Ok(response("incident_009", "Hallucination")));

        let store = Arc::new(InMemoryRecordStore::new());
        let classifier = classifier(provider, store.clone()).with_source_model("BillingAgent-v2");
        let record = classifier
            .classify_incident(&IncidentReport::new("incident_009", "Invented an invoice."))
            .await
            .unwrap();

        assert_eq!(record.model.as_deref(), Some("BillingAgent-v2"));
        assert_eq!(record.recorded_at(), Some(fixed_clock()));
        assert_eq!(store.get("incident_009").unwrap(), Some(record));
    }
}
