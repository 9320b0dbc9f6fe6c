//! Turns raw model output into a scored classification record

use crate::error::{ClassificationError, SchemaError};
use crate::parser::{parse_response, JsonObject};
use crate::schema::RecordSchema;
use crate::severity::SeverityTable;
use crate::types::ClassificationRecord;

/// Parser, schema and severity table composed for one incident at a time
#[derive(Debug, Clone, Default)]
pub struct ClassificationEnricher {
    schema: RecordSchema,
    severity: SeverityTable,
}

impl ClassificationEnricher {
    /// Create enricher with injected schema and severity policy
    #[inline]
    #[must_use]
    pub fn new(schema: RecordSchema, severity: SeverityTable) -> Self {
        Self { schema, severity }
    }

    /// Severity policy in use
    #[inline]
    #[must_use]
    pub fn severity(&self) -> &SeverityTable {
        &self.severity
    }

    /// Build a record for `incident_id` from the model's raw output
    ///
    /// The stored id is always `incident_id`. A model-supplied id that is
    /// empty or different is replaced.
    ///
    /// # Errors
    /// Any extraction, parse or schema failure. Callers skip the incident.
    pub fn enrich(
        &self,
        incident_id: &str,
        raw_response: &str,
    ) -> Result<ClassificationRecord, ClassificationError> {
        let parsed = parse_response(raw_response)?;
        let validated = self.schema.validate(&parsed)?;

        let reported_id = string_field(validated, "incident_id")?;
        if reported_id != incident_id {
            tracing::warn!(
                incident_id,
                reported_id,
                "model returned a different incident id; using source id"
            );
        }

        let failure_type = string_field(validated, "failure_type")?.to_string();
        let severity_score = self.severity.score(&failure_type);
        if !self.severity.recognizes(&failure_type) {
            tracing::debug!(incident_id, %failure_type, "unrecognized failure type, using fallback severity");
        }

        Ok(ClassificationRecord {
            incident_id: incident_id.to_string(),
            failure_type,
            confidence: number_field(validated, "confidence")?,
            recommended_fix: string_field(validated, "recommended_fix")?.to_string(),
            severity_score,
            model: None,
            timestamp: None,
        })
    }
}

fn string_field<'a>(object: &'a JsonObject, name: &str) -> Result<&'a str, SchemaError> {
    object
        .get(name)
        .ok_or_else(|| SchemaError::missing(name))?
        .as_str()
        .ok_or_else(|| SchemaError::invalid_type(name, "string"))
}

fn number_field(object: &JsonObject, name: &str) -> Result<f64, SchemaError> {
    object
        .get(name)
        .ok_or_else(|| SchemaError::missing(name))?
        .as_f64()
        .ok_or_else(|| SchemaError::invalid_type(name, "number"))
}
