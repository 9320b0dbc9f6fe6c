//! Required-field schema for classification objects

use crate::error::SchemaError;
use crate::parser::JsonObject;
use serde_json::Value;

/// Accepted JSON type for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// JSON string
    String,
    /// JSON number, integer or floating-point (booleans are rejected)
    Number,
}

impl FieldKind {
    /// Check a value against this kind
    #[inline]
    #[must_use]
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Number => value.is_number(),
        }
    }

    /// Human-readable name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
        }
    }
}

/// Ordered list of required fields
///
/// Fields are checked in insertion order and validation stops at the first
/// violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSchema {
    fields: Vec<(String, FieldKind)>,
}

impl RecordSchema {
    /// Create empty schema
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Schema for a model classification response
    #[must_use]
    pub fn classification() -> Self {
        Self::new()
            .with_field("incident_id", FieldKind::String)
            .with_field("failure_type", FieldKind::String)
            .with_field("confidence", FieldKind::Number)
            .with_field("recommended_fix", FieldKind::String)
    }

    /// Append a required field
    #[inline]
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push((name.into(), kind));
        self
    }

    /// Required fields in check order
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[(String, FieldKind)] {
        &self.fields
    }

    /// Validate `object`, returning it unchanged on success
    ///
    /// # Errors
    /// `SchemaError` for the first missing or mistyped field.
    pub fn validate<'a>(&self, object: &'a JsonObject) -> Result<&'a JsonObject, SchemaError> {
        for (name, kind) in &self.fields {
            let value = object.get(name).ok_or_else(|| SchemaError::missing(name.as_str()))?;
            if !kind.matches(value) {
                return Err(SchemaError::invalid_type(name.as_str(), kind.as_str()));
            }
        }
        Ok(object)
    }
}

impl Default for RecordSchema {
    fn default() -> Self {
        Self::classification()
    }
}
