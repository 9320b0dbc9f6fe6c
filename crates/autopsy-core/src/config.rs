//! Pipeline configuration
//!
//! Loaded from an optional TOML file; every field has a default so an empty
//! file (or no file) gives the standard local layout.

use crate::drift::DEFAULT_DRIFT_THRESHOLD;
use crate::error::ConfigError;
use crate::types::DEFAULT_SOURCE_MODEL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Autopsy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AutopsyConfig {
    /// Directory of `*.txt` incident reports
    pub failures_dir: PathBuf,
    /// Directory of `<incident_id>.json` classification records
    pub classifications_dir: PathBuf,
    /// Directory of `<incident_id>.txt` repair suggestions
    pub repairs_dir: PathBuf,
    /// Dominant-type share above which drift is reported
    pub drift_threshold: f64,
    /// Monitored system that new records are attributed to
    pub source_model: String,
    /// Model backend
    pub llm: LlmConfig,
}

impl AutopsyConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse TOML and validate
    ///
    /// # Errors
    /// `ConfigError::Parse` or `ConfigError::Invalid`.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// `ConfigError::Io`, `ConfigError::Parse` or `ConfigError::Invalid`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let body = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&body)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// `ConfigError::Invalid` naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.drift_threshold > 0.0 && self.drift_threshold < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "drift_threshold must be in (0, 1), got {}",
                self.drift_threshold
            )));
        }
        if self.source_model.trim().is_empty() {
            return Err(ConfigError::Invalid("source_model must not be empty".into()));
        }
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::Invalid("llm.model must not be empty".into()));
        }
        if self.llm.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("llm.base_url must not be empty".into()));
        }
        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::Invalid("llm.timeout_secs must be positive".into()));
        }
        Ok(())
    }

    /// With incident directory
    #[inline]
    #[must_use]
    pub fn with_failures_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.failures_dir = dir.into();
        self
    }

    /// With classification directory
    #[inline]
    #[must_use]
    pub fn with_classifications_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.classifications_dir = dir.into();
        self
    }

    /// With repair directory
    #[inline]
    #[must_use]
    pub fn with_repairs_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.repairs_dir = dir.into();
        self
    }

    /// With drift threshold
    #[inline]
    #[must_use]
    pub fn with_drift_threshold(mut self, threshold: f64) -> Self {
        self.drift_threshold = threshold;
        self
    }

    /// With monitored system name
    #[inline]
    #[must_use]
    pub fn with_source_model(mut self, model: impl Into<String>) -> Self {
        self.source_model = model.into();
        self
    }

    /// With model name
    #[inline]
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.llm.model = model.into();
        self
    }

    /// With model backend URL
    #[inline]
    #[must_use]
    pub fn with_llm_url(mut self, url: impl Into<String>) -> Self {
        self.llm.base_url = url.into();
        self
    }
}

impl Default for AutopsyConfig {
    fn default() -> Self {
        Self {
            failures_dir: PathBuf::from("data/failures"),
            classifications_dir: PathBuf::from("data/classifications"),
            repairs_dir: PathBuf::from("data/repairs"),
            drift_threshold: DEFAULT_DRIFT_THRESHOLD,
            source_model: DEFAULT_SOURCE_MODEL.to_string(),
            llm: LlmConfig::default(),
        }
    }
}

/// Local model backend settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LlmConfig {
    /// Base URL of the model server
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3".to_string(),
            timeout_secs: 120,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = AutopsyConfig::from_toml_str("").unwrap();
        assert_eq!(config, AutopsyConfig::default());
        assert_eq!(config.failures_dir, PathBuf::from("data/failures"));
        assert_eq!(config.llm.model, "llama3");
        assert_eq!(config.drift_threshold, 0.6);
        assert_eq!(config.source_model, "CustomerSupportBot-v1");
    }

    #[test]
    fn blank_source_model_is_rejected() {
        assert!(matches!(
            AutopsyConfig::from_toml_str("source_model = \"  \""),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn partial_toml_overrides() {
        let config = AutopsyConfig::from_toml_str(
            r#"
            classifications_dir = "/var/autopsy/records"
            drift_threshold = 0.75

            [llm]
            model = "mistral"
            "#,
        )
        .unwrap();
        assert_eq!(config.classifications_dir, PathBuf::from("/var/autopsy/records"));
        assert_eq!(config.drift_threshold, 0.75);
        assert_eq!(config.llm.model, "mistral");
        assert_eq!(config.llm.base_url, "http://localhost:11434");
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        for bad in ["drift_threshold = 0.0", "drift_threshold = 1.0", "drift_threshold = -2.5"] {
            assert!(matches!(AutopsyConfig::from_toml_str(bad), Err(ConfigError::Invalid(_))));
        }
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(matches!(
            AutopsyConfig::from_toml_str("drift_treshold = 0.7"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autopsy.toml");
        std::fs::write(&path, "[llm]\ntimeout_secs = 5\n").unwrap();

        let config = AutopsyConfig::load(&path).unwrap();
        assert_eq!(config.llm.timeout_secs, 5);

        assert!(matches!(
            AutopsyConfig::load(&dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn builder_methods() {
        let config = AutopsyConfig::new()
            .with_failures_dir("in")
            .with_model("phi3")
            .with_llm_url("http://gpu-box:11434")
            .with_drift_threshold(0.8);
        assert_eq!(config.failures_dir, PathBuf::from("in"));
        assert_eq!(config.llm.model, "phi3");
        assert_eq!(config.llm.base_url, "http://gpu-box:11434");
        assert!(config.validate().is_ok());
    }
}
