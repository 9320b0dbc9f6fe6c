//! Command-line arguments

use autopsy_core::{AutopsyConfig, ConfigError};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// AI failure autopsy: classify incidents, watch for drift, self-heal
#[derive(Debug, Parser)]
#[command(name = "autopsy", version, about)]
pub struct Cli {
    /// TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory of *.txt incident reports
    #[arg(long, global = true)]
    pub failures_dir: Option<PathBuf>,

    /// Directory for classification records
    #[arg(long, global = true)]
    pub classifications_dir: Option<PathBuf>,

    /// Directory for repair suggestions
    #[arg(long, global = true)]
    pub repairs_dir: Option<PathBuf>,

    /// Dominant-type share above which drift is reported
    #[arg(long, global = true)]
    pub drift_threshold: Option<f64>,

    /// Monitored AI system that classified and injected records are attributed to
    #[arg(long, global = true)]
    pub source_model: Option<String>,

    /// Model name
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Model server base URL
    #[arg(long, global = true)]
    pub llm_url: Option<String>,

    /// Log filter when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Pipeline steps
#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Classify every incident and store the records
    Classify,
    /// Check stored records for drift; triggers repairs on drift
    Drift,
    /// Generate repair suggestions for every incident
    Repair,
    /// Classify, then check for drift
    Run,
    /// Print the reliability summary
    Summary {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Store a simulated incident record
    Inject {
        /// Failure type label, e.g. "Hallucination"
        #[arg(long)]
        failure_type: String,
        /// Confidence in [0, 1]; random in [0.6, 1.0] when omitted
        #[arg(long)]
        confidence: Option<f64>,
    },
}

impl Cli {
    /// Config file (or defaults) with command-line overrides applied
    ///
    /// # Errors
    /// Config file unreadable or invalid, or overrides out of range.
    pub fn resolve_config(&self) -> Result<AutopsyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => AutopsyConfig::load(path)?,
            None => AutopsyConfig::default(),
        };

        if let Some(dir) = &self.failures_dir {
            config = config.with_failures_dir(dir);
        }
        if let Some(dir) = &self.classifications_dir {
            config = config.with_classifications_dir(dir);
        }
        if let Some(dir) = &self.repairs_dir {
            config = config.with_repairs_dir(dir);
        }
        if let Some(threshold) = self.drift_threshold {
            config = config.with_drift_threshold(threshold);
        }
        if let Some(source) = &self.source_model {
            config = config.with_source_model(source);
        }
        if let Some(model) = &self.model {
            config = config.with_model(model);
        }
        if let Some(url) = &self.llm_url {
            config = config.with_llm_url(url);
        }

        config.validate()?;
        Ok(config)
    }
}
