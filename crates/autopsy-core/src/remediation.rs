//! Remediation trigger and the repair-suggestion engine behind it

use crate::classifier::BatchSummary;
use crate::error::{FailureStage, RemediationError};
use crate::incident::IncidentSource;
use crate::prompt::PromptBuilder;
use crate::provider::TextCompletionProvider;
use crate::store::RepairStore;
use crate::types::SkippedIncident;
use async_trait::async_trait;
use std::sync::Arc;

/// Invoked when drift is detected
///
/// Takes no record data and may be called more than once.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemediationTrigger: Send + Sync {
    /// Start repair generation for all stored incidents
    ///
    /// Returns which incidents got a suggestion and which were skipped.
    async fn trigger_repair(&self) -> Result<BatchSummary, RemediationError>;
}

/// Asks the model for a repair suggestion per incident and stores it
pub struct RepairEngine {
    provider: Arc<dyn TextCompletionProvider>,
    source: Arc<dyn IncidentSource>,
    store: Arc<dyn RepairStore>,
    prompts: PromptBuilder,
}

impl std::fmt::Debug for RepairEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepairEngine")
            .field("prompts", &self.prompts)
            .finish_non_exhaustive()
    }
}

impl RepairEngine {
    /// Create repair engine
    #[must_use]
    pub fn new(
        provider: Arc<dyn TextCompletionProvider>,
        source: Arc<dyn IncidentSource>,
        store: Arc<dyn RepairStore>,
    ) -> Self {
        Self {
            provider,
            source,
            store,
            prompts: PromptBuilder::default(),
        }
    }

    /// Use custom prompts
    #[inline]
    #[must_use]
    pub fn with_prompts(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }

    /// Generate and store a suggestion for every incident
    ///
    /// Incidents whose completion or write fails are skipped.
    ///
    /// # Errors
    /// `RemediationError::Source` if incidents cannot be listed.
    pub async fn generate(&self) -> Result<BatchSummary, RemediationError> {
        let incidents = self.source.incidents()?;
        let mut summary = BatchSummary::default();

        for incident in &incidents {
            let prompt = self.prompts.repair(incident);
            let suggestion = match self.provider.complete(&prompt).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(incident_id = incident.id(), error = %e, "repair generation failed");
                    summary.skipped.push(SkippedIncident::new(
                        incident.id(),
                        FailureStage::Completion,
                        e.to_string(),
                    ));
                    continue;
                }
            };

            if let Err(e) = self.store.put(incident.id(), &suggestion) {
                tracing::warn!(incident_id = incident.id(), error = %e, "repair could not be saved");
                summary.skipped.push(SkippedIncident::new(
                    incident.id(),
                    FailureStage::Persist,
                    e.to_string(),
                ));
                continue;
            }

            tracing::info!(incident_id = incident.id(), "repair saved");
            summary.persisted.push(incident.id().to_string());
        }

        Ok(summary)
    }
}

#[async_trait]
impl RemediationTrigger for RepairEngine {
    async fn trigger_repair(&self) -> Result<BatchSummary, RemediationError> {
        let summary = self.generate().await?;
        tracing::info!(
            repaired = summary.persisted.len(),
            skipped = summary.skipped.len(),
            "self-healing pass finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::provider::MockTextCompletionProvider;
    use crate::store::InMemoryRepairStore;
    use crate::types::IncidentReport;

    fn incidents() -> Arc<dyn IncidentSource> {
        Arc::new(vec![
            IncidentReport::new("incident_001", "Chatbot cited a nonexistent policy."),
            IncidentReport::new("incident_002", "Agent called the payments tool twice."),
        ])
    }

    #[tokio::test]
    async fn generates_one_suggestion_per_incident() {
        let mut provider = MockTextCompletionProvider::new();
        provider
            .expect_complete()
            .times(2)
            .returning(|prompt| Ok(format!("Repair for: {}", prompt.lines().last().unwrap_or_default())));

        let store = Arc::new(InMemoryRepairStore::new());
        let engine = RepairEngine::new(Arc::new(provider), incidents(), store.clone());
        let summary = engine.generate().await.unwrap();

        assert_eq!(summary.persisted, vec!["incident_001", "incident_002"]);
        let repairs = store.get_all().unwrap();
        assert_eq!(repairs.len(), 2);
        assert_eq!(repairs[0].text, "Repair for: Chatbot cited a nonexistent policy.");
    }

    #[tokio::test]
    async fn provider_failure_skips_incident() {
        let mut provider = MockTextCompletionProvider::new();
        provider.expect_complete().returning(|prompt| {
            if prompt.contains("payments") {
                Err(ProviderError::Timeout { timeout_secs: 30 })
            } else {
                Ok("Add citation checks".to_string())
            }
        });

        let store = Arc::new(InMemoryRepairStore::new());
        let engine = RepairEngine::new(Arc::new(provider), incidents(), store.clone());
        let summary = engine.trigger_repair().await.unwrap();

        assert_eq!(summary.persisted, vec!["incident_001"]);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].incident_id, "incident_002");
        assert_eq!(summary.skipped[0].stage, FailureStage::Completion);

        let repairs = store.get_all().unwrap();
        assert_eq!(repairs.len(), 1);
        assert_eq!(repairs[0].incident_id, "incident_001");
    }

    #[tokio::test]
    async fn repeated_triggers_overwrite() {
        let mut provider = MockTextCompletionProvider::new();
        provider
            .expect_complete()
            .times(4)
            .returning(|_| Ok("same advice".to_string()));

        let store = Arc::new(InMemoryRepairStore::new());
        let engine = RepairEngine::new(Arc::new(provider), incidents(), store.clone());
        engine.trigger_repair().await.unwrap();
        engine.trigger_repair().await.unwrap();

        assert_eq!(store.get_all().unwrap().len(), 2);
    }
}
