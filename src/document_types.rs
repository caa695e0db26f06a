use crate::error::{DocsumoError, Result};
use crate::response::ApiResponse;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One extraction template the account can upload to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentType {
    /// Display title, e.g. "Invoice"
    pub title: String,
    /// Value sent as the upload `type` field, e.g. "invoice"
    pub value: String,
}

/// Lookup table of document types, owned by the client or passed in by the caller.
/// It is only populated explicitly, see [`crate::Docsumo::refresh_document_types`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentTypes {
    entries: Vec<DocumentType>,
}

impl DocumentTypes {
    pub fn new(entries: Vec<DocumentType>) -> Self {
        DocumentTypes { entries }
    }

    /// Build the table from a credit limit body (`data.document_types`).
    /// A missing, null, non-array or empty list is `MissingDocumentTypes`;
    /// entries without a string `title` and `value` are skipped.
    pub fn from_limit_response(body: &Value) -> Result<Self> {
        let types = match ApiResponse::new(body).get("document_types") {
            Some(Value::Array(types)) => types,
            _ => return Err(DocsumoError::MissingDocumentTypes),
        };

        let entries: Vec<DocumentType> = types
            .iter()
            .filter_map(|entry| {
                Some(DocumentType {
                    title: entry.get("title")?.as_str()?.to_string(),
                    value: entry.get("value")?.as_str()?.to_string(),
                })
            })
            .collect();

        if entries.is_empty() {
            return Err(DocsumoError::MissingDocumentTypes);
        }

        Ok(DocumentTypes { entries })
    }

    /// Resolve a label to the value the API expects.
    /// Exact title or value matches win over case-insensitive ones.
    pub fn resolve(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|t| t.title == label || t.value == label)
            .or_else(|| {
                self.entries.iter().find(|t| {
                    t.title.eq_ignore_ascii_case(label) || t.value.eq_ignore_ascii_case(label)
                })
            })
            .map(|t| t.value.as_str())
    }

    /// Resolve a label or fail with the list of supported values
    pub fn require(&self, label: &str) -> Result<String> {
        self.resolve(label)
            .map(str::to_string)
            .ok_or_else(|| DocsumoError::UnsupportedDocumentType {
                label: label.to_string(),
                supported: self.values(),
            })
    }

    pub fn values(&self) -> Vec<String> {
        self.entries.iter().map(|t| t.value.clone()).collect()
    }

    pub fn entries(&self) -> &[DocumentType] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
