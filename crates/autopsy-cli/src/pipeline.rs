//! Directory-backed pipeline wiring
//!
//! Binds the core components to the configured directories and a single
//! completion provider. Every command in the binary goes through here.

use autopsy_core::prelude::*;
use autopsy_core::{simulate_record, ReliabilitySummary, SeverityTable};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Result of a full `run`: the classification batch and the drift check after it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// Classification batch outcome
    pub batch: BatchSummary,
    /// Drift check over all stored records
    pub drift: DriftOutcome,
}

/// Pipeline over the configured directories
pub struct Pipeline {
    config: AutopsyConfig,
    provider: Arc<dyn TextCompletionProvider>,
    source: Arc<DirectoryIncidentSource>,
    records: Arc<FileRecordStore>,
    repairs: Arc<FileRepairStore>,
    severity: SeverityTable,
}

impl Pipeline {
    /// Wire the pipeline for `config` around `provider`
    pub fn new(config: AutopsyConfig, provider: Arc<dyn TextCompletionProvider>) -> Self {
        let source = Arc::new(DirectoryIncidentSource::new(&config.failures_dir));
        let records = Arc::new(FileRecordStore::new(&config.classifications_dir));
        let repairs = Arc::new(FileRepairStore::new(&config.repairs_dir));
        Self {
            config,
            provider,
            source,
            records,
            repairs,
            severity: SeverityTable::standard(),
        }
    }

    /// Active config
    #[must_use]
    pub fn config(&self) -> &AutopsyConfig {
        &self.config
    }

    /// Classification record store
    #[must_use]
    pub fn records(&self) -> &FileRecordStore {
        &self.records
    }

    /// Repair suggestion store
    #[must_use]
    pub fn repairs(&self) -> &FileRepairStore {
        &self.repairs
    }

    fn repair_engine(&self) -> RepairEngine {
        RepairEngine::new(self.provider.clone(), self.source.clone(), self.repairs.clone())
    }

    fn drift_monitor(&self) -> DriftMonitor {
        DriftMonitor::new(Arc::new(self.repair_engine())).with_threshold(self.config.drift_threshold)
    }

    /// Classify every incident in the failures directory
    ///
    /// # Errors
    /// The failures directory exists but cannot be read.
    pub async fn classify(&self) -> AutopsyResult<BatchSummary> {
        let incidents = self.source.incidents()?;
        tracing::info!(
            dir = %self.config.failures_dir.display(),
            incidents = incidents.len(),
            "classifying incidents"
        );
        let classifier = IncidentClassifier::new(self.provider.clone(), self.records.clone())
            .with_source_model(&self.config.source_model);
        Ok(classifier.classify_batch(&incidents).await)
    }

    /// Check stored records for drift, generating repairs when it is found
    ///
    /// # Errors
    /// Records cannot be read, or the triggered repair pass fails.
    pub async fn drift(&self) -> AutopsyResult<DriftOutcome> {
        self.drift_monitor().run(self.records.as_ref()).await
    }

    /// Generate repair suggestions for every incident
    ///
    /// # Errors
    /// The failures directory exists but cannot be read.
    pub async fn repair(&self) -> AutopsyResult<BatchSummary> {
        Ok(self.repair_engine().generate().await?)
    }

    /// Classify, then check for drift
    ///
    /// # Errors
    /// See [`Pipeline::classify`] and [`Pipeline::drift`].
    pub async fn run(&self) -> AutopsyResult<RunReport> {
        let batch = self.classify().await?;
        let drift = self.drift().await?;
        Ok(RunReport { batch, drift })
    }

    /// Reliability summary over every stored record
    ///
    /// # Errors
    /// The classifications directory exists but cannot be read.
    pub fn summary(&self) -> AutopsyResult<ReliabilitySummary> {
        let records = self.records.get_all()?;
        Ok(ReliabilitySummary::from_records(&records))
    }

    /// Store a simulated record for `failure_type`, attributed to the
    /// configured source model
    ///
    /// An id already in the store gets a numeric suffix instead of being
    /// overwritten.
    ///
    /// # Errors
    /// The store cannot be read or the record cannot be written.
    pub fn inject(
        &self,
        failure_type: &str,
        confidence: f64,
        now: DateTime<Utc>,
    ) -> AutopsyResult<ClassificationRecord> {
        let mut record = simulate_record(
            failure_type,
            confidence,
            &self.config.source_model,
            &self.severity,
            now,
        );
        let base_id = record.incident_id.clone();
        let mut suffix = 1;
        while self.records.get(&record.incident_id)?.is_some() {
            record.incident_id = format!("{base_id}_{suffix}");
            suffix += 1;
        }
        self.records.put(record.clone())?;
        tracing::info!(
            incident_id = %record.incident_id,
            failure_type = %record.failure_type,
            model = record.model_name(),
            severity = record.severity_score,
            "simulated incident stored"
        );
        Ok(record)
    }
}
