//! Error types for the autopsy core
//!
//! Provides error handling for:
//! - Response extraction and JSON parsing
//! - Schema validation of classification objects
//! - LLM provider failures
//! - Record, repair and incident storage
//! - Remediation and configuration

use std::path::PathBuf;

/// Per-incident classification failure
///
/// Every variant is recoverable: the incident is skipped and the batch moves on.
#[derive(Debug, thiserror::Error)]
pub enum ClassificationError {
    /// No `{...}` span in the model output
    #[error("no JSON object found in model output")]
    Extraction,

    /// Span found but it is not valid JSON
    #[error("malformed JSON in model output: {0}")]
    Parse(#[from] serde_json::Error),

    /// Parsed object violates the record schema
    #[error("schema violation: {0}")]
    Schema(#[from] SchemaError),
}

impl ClassificationError {
    /// Pipeline stage this error belongs to
    #[inline]
    #[must_use]
    pub fn stage(&self) -> FailureStage {
        match self {
            Self::Extraction => FailureStage::Extraction,
            Self::Parse(_) => FailureStage::Parse,
            Self::Schema(_) => FailureStage::Schema,
        }
    }
}

/// Schema violations, reported for the first offending field only
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Required key absent
    #[error("missing field: {field}")]
    MissingField { field: String },

    /// Key present with the wrong JSON type
    #[error("invalid type for {field}: expected {expected}")]
    InvalidType { field: String, expected: &'static str },
}

impl SchemaError {
    /// Create missing field error
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create invalid type error
    pub fn invalid_type(field: impl Into<String>, expected: &'static str) -> Self {
        Self::InvalidType {
            field: field.into(),
            expected,
        }
    }

    /// Name of the offending field
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::MissingField { field } | Self::InvalidType { field, .. } => field,
        }
    }
}

/// Text completion provider errors
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Backend could not be reached
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// Backend answered with a non-success status
    #[error("provider returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// Backend answered with a body we could not decode
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    /// Request exceeded the configured timeout
    #[error("provider timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

/// Record and repair storage errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Identifier cannot be used as a storage key
    #[error("invalid incident id: '{0}'")]
    InvalidIncidentId(String),

    /// IO failure on the backing directory
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Record could not be encoded
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Incident source errors
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// IO failure while listing or reading incidents
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SourceError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Remediation trigger errors
#[derive(Debug, thiserror::Error)]
pub enum RemediationError {
    /// Incidents could not be listed
    #[error("incident source failed: {0}")]
    Source(#[from] SourceError),

    /// Collaborator-specific failure
    #[error("remediation failed: {0}")]
    Failed(String),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file unreadable
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values parsed but are out of range
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Combined autopsy error
#[derive(Debug, thiserror::Error)]
pub enum AutopsyError {
    #[error("classification error: {0}")]
    Classification(#[from] ClassificationError),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("source error: {0}")]
    Source(#[from] SourceError),

    #[error("remediation error: {0}")]
    Remediation(#[from] RemediationError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl AutopsyError {
    /// Stage at which a single incident failed, if the error is per-incident
    #[must_use]
    pub fn stage(&self) -> Option<FailureStage> {
        match self {
            Self::Classification(e) => Some(e.stage()),
            Self::Provider(_) => Some(FailureStage::Completion),
            Self::Store(_) => Some(FailureStage::Persist),
            _ => None,
        }
    }
}

/// Pipeline stage where an incident was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// LLM call failed
    Completion,
    /// No JSON span in the output
    Extraction,
    /// JSON span did not parse
    Parse,
    /// Schema validation failed
    Schema,
    /// Record could not be written
    Persist,
}

impl std::fmt::Display for FailureStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Completion => "completion",
            Self::Extraction => "extraction",
            Self::Parse => "parse",
            Self::Schema => "schema",
            Self::Persist => "persist",
        };
        f.write_str(s)
    }
}

/// Result type alias for autopsy operations
pub type AutopsyResult<T> = Result<T, AutopsyError>;
