//! Prompt templates for classification and repair

use crate::types::{FailureType, IncidentReport};
use serde_json::json;

const CLASSIFY_PREAMBLE: &str = "You are an AI reliability engineer.\n\nClassify the AI failure into ONE category:";
const REPAIR_PREAMBLE: &str = "You are an AI reliability engineer.\n\nPropose a concrete repair to prevent this failure.\nBe specific and actionable.";

/// Builds the prompts sent to the model
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    categories: Vec<String>,
}

impl PromptBuilder {
    /// Prompt builder listing the standard categories
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            categories: FailureType::ALL.iter().map(|t| t.as_str().to_string()).collect(),
        }
    }

    /// Replace the category list
    #[inline]
    #[must_use]
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Classification prompt with a JSON template prefilled with the incident id
    #[must_use]
    pub fn classification(&self, incident: &IncidentReport) -> String {
        let categories: String = self
            .categories
            .iter()
            .map(|c| format!("- {c}\n"))
            .collect();

        let template = json!({
            "incident_id": incident.id(),
            "failure_type": "",
            "confidence": 0.0,
            "recommended_fix": ""
        });
        let template = serde_json::to_string_pretty(&template).unwrap_or_default();

        format!(
            "{CLASSIFY_PREAMBLE}\n{categories}\nReturn ONLY valid JSON.\n\nIncident ID: {id}\n\nFailure Description:\n{text}\n\nJSON format:\n{template}\n",
            id = incident.id(),
            text = incident.text(),
        )
    }

    /// Repair-suggestion prompt
    #[must_use]
    pub fn repair(&self, incident: &IncidentReport) -> String {
        format!("{REPAIR_PREAMBLE}\n\n{}", incident.text())
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}
