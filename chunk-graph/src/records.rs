//! Tabular records → documents with attached metadata.

use std::io::BufRead;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::{Document, Metadata, MetadataValue};
use crate::error::{GraphError, Result};

/// One row of tabular input.
pub type Record = Map<String, Value>;

/// Which record fields become document text, id, and metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSchema {
    /// Field holding the document text.
    pub text_field: String,
    /// Copied into metadata in this order.
    #[serde(default)]
    pub metadata_fields: Vec<String>,
    /// Source of document ids; random UUIDs when unset.
    #[serde(default)]
    pub id_field: Option<String>,
}

impl RecordSchema {
    pub fn new(text_field: impl Into<String>) -> Self {
        Self { text_field: text_field.into(), metadata_fields: Vec::new(), id_field: None }
    }

    pub fn with_metadata_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.metadata_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = Some(field.into());
        self
    }
}

/// Build one document per record.
///
/// # Errors
///
/// Returns [`GraphError::MissingField`] if a record lacks the text, id, or a
/// metadata field, and [`GraphError::InvalidField`] if the text is not a
/// string, the id is not a string or number, or a metadata value is an array
/// or object.
pub fn documents_from_records(records: &[Record], schema: &RecordSchema) -> Result<Vec<Document>> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| document_from_record(index, record, schema))
        .collect()
}

fn document_from_record(index: usize, record: &Record, schema: &RecordSchema) -> Result<Document> {
    let text = match field(index, record, &schema.text_field)? {
        Value::String(text) => text.clone(),
        other => {
            return Err(invalid(index, &schema.text_field, format!("expected string, got {other}")));
        }
    };

    let id = match &schema.id_field {
        Some(id_field) => match field(index, record, id_field)? {
            Value::String(id) => id.clone(),
            Value::Number(n) => n.to_string(),
            other => {
                let message = format!("expected string or number, got {other}");
                return Err(invalid(index, id_field, message));
            }
        },
        None => uuid::Uuid::new_v4().to_string(),
    };

    let mut metadata = Metadata::with_capacity(schema.metadata_fields.len());
    for name in &schema.metadata_fields {
        let value = scalar(index, name, field(index, record, name)?)?;
        metadata.insert(name.clone(), value);
    }

    Ok(Document::new(id, text, metadata))
}

fn field<'r>(index: usize, record: &'r Record, name: &str) -> Result<&'r Value> {
    record
        .get(name)
        .ok_or_else(|| GraphError::MissingField { index, field: name.to_string() })
}

fn scalar(index: usize, name: &str, value: &Value) -> Result<MetadataValue> {
    Ok(match value {
        Value::Null => MetadataValue::Null,
        Value::Bool(b) => MetadataValue::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => MetadataValue::Int(i),
            None => MetadataValue::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => MetadataValue::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => {
            return Err(invalid(index, name, "metadata values must be scalars".to_string()));
        }
    })
}

fn invalid(index: usize, field: &str, message: String) -> GraphError {
    GraphError::InvalidField { index, field: field.to_string(), message }
}

/// Read JSON Lines input, one object per non-blank line.
///
/// # Errors
///
/// Returns [`GraphError::Io`] on read failure and
/// [`GraphError::Serialization`] if a line is not a JSON object.
pub fn read_json_lines<R: BufRead>(reader: R) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}
