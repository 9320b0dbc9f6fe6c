//! Autopsy Core - AI failure classification and drift monitoring
//!
//! Turns free-text AI incident reports into scored classification records and
//! watches the failure-type distribution for drift:
//! - Extracts JSON from untrusted model output
//! - Validates it against the record schema
//! - Scores severity from a fixed table
//! - Persists one record per incident, skipping invalid ones
//! - Triggers repair generation when one failure type dominates
//!
//! # Architecture
//!
//! ```text
//! incident text → TextCompletionProvider → parser → schema → severity → RecordStore
//!                                                                          ↓
//!                                       RemediationTrigger ← DriftMonitor ←┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use autopsy_core::prelude::*;
//!
//! # async fn example(provider: Arc<dyn TextCompletionProvider>) -> AutopsyResult<()> {
//! let store = Arc::new(InMemoryRecordStore::new());
//! let classifier = IncidentClassifier::new(provider.clone(), store.clone());
//!
//! let incidents = vec![IncidentReport::new("incident_001", "The bot invented a refund policy.")];
//! let summary = classifier.classify_batch(&incidents).await;
//!
//! let repairs = RepairEngine::new(provider, Arc::new(incidents), Arc::new(InMemoryRepairStore::new()));
//! let outcome = DriftMonitor::new(Arc::new(repairs)).run(store.as_ref()).await?;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod classifier;
pub mod config;
pub mod drift;
pub mod enricher;
pub mod error;
pub mod incident;
pub mod parser;
pub mod prompt;
pub mod provider;
pub mod remediation;
pub mod schema;
pub mod severity;
pub mod store;
pub mod summary;
pub mod types;

// Re-exports for convenience
pub use classifier::{BatchSummary, IncidentClassifier};
pub use config::{AutopsyConfig, LlmConfig};
pub use drift::{DriftMonitor, DriftOutcome, DriftReport, DEFAULT_DRIFT_THRESHOLD};
pub use enricher::ClassificationEnricher;
pub use error::{
    AutopsyError, AutopsyResult, ClassificationError, ConfigError, FailureStage, ProviderError,
    RemediationError, SchemaError, SourceError, StoreError,
};
pub use incident::{DirectoryIncidentSource, IncidentSource};
pub use parser::{extract_json_span, parse_response, JsonObject};
pub use prompt::PromptBuilder;
pub use provider::TextCompletionProvider;
pub use remediation::{RemediationTrigger, RepairEngine};
pub use schema::{FieldKind, RecordSchema};
pub use severity::SeverityTable;
pub use store::{
    FileRecordStore, FileRepairStore, InMemoryRecordStore, InMemoryRepairStore, RecordStore,
    RepairStore, RepairSuggestion,
};
pub use summary::{
    simulate_record, DailySeverity, ModelStats, ReliabilityGrade, ReliabilitySummary, TypeShare,
};
pub use types::{
    ClassificationRecord, FailureType, IncidentReport, SkippedIncident, DEFAULT_SOURCE_MODEL,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for wiring the pipeline
    pub use crate::{
        AutopsyConfig, AutopsyResult, BatchSummary, ClassificationRecord, DirectoryIncidentSource,
        DriftMonitor, DriftOutcome, FileRecordStore, FileRepairStore, InMemoryRecordStore,
        InMemoryRepairStore, IncidentClassifier, IncidentReport, IncidentSource, RecordStore,
        RemediationTrigger, RepairEngine, RepairStore, TextCompletionProvider,
    };
    pub use std::sync::Arc;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
