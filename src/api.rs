use crate::client::Config;
use crate::document_types::DocumentTypes;
use crate::error::{DocsumoError, Result};
use crate::response::ApiResponse;
use crate::transport::{Form, HttpRequest, HttpTransport, Transport, TransportResponse};
use crate::upload::document_title;
use reqwest::Method;
use serde::Serialize;
use serde_json::{json, Value};
use std::path::Path;

/// Provenance tag sent with every upload
pub const UPLOADED_FROM: &str = "api";

/// Listing order requested from the documents endpoint
pub const DOCUMENTS_SORT_BY: &str = "created_date.desc";

/// Page size used when collecting every document id before a full delete
pub const DELETE_ALL_LIMIT: u32 = 10000;

/// A document the API refused to delete
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotDeleted {
    pub doc_id: String,
    pub err_message: String,
}

/// Outcome of [`Docsumo::delete_documents`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeleteResult {
    #[serde(rename = "deleted_doc")]
    pub deleted: Vec<String>,
    #[serde(rename = "not_deleted_doc")]
    pub not_deleted: Vec<NotDeleted>,
}

/// Client for the Docsumo API
pub struct Docsumo<T: Transport = HttpTransport> {
    /// Configuration
    pub config: Config,
    /// Transport used for every request
    pub transport: T,
    /// Document type table used to validate upload labels
    document_types: Option<DocumentTypes>,
}

impl Docsumo<HttpTransport> {
    /// Create a new client with the default reqwest transport
    pub fn new(config: Config) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(DocsumoError::NoApiKey);
        }
        Ok(Docsumo::with_transport(config, HttpTransport::new()?))
    }

    /// Create a new client configured from `DOCSUMO_API_KEY`
    pub fn from_env() -> Result<Self> {
        Docsumo::new(Config::from_env()?)
    }
}

impl<T: Transport> Docsumo<T> {
    /// Create a new client over a custom transport
    pub fn with_transport(config: Config, transport: T) -> Self {
        Docsumo {
            config,
            transport,
            document_types: None,
        }
    }

    /// Install a caller-provided document type table
    pub fn with_document_types(mut self, types: DocumentTypes) -> Self {
        self.document_types = Some(types);
        self
    }

    /// The installed document type table, if any
    pub fn document_types(&self) -> Option<&DocumentTypes> {
        self.document_types.as_ref()
    }

    /// Drop the installed table; labels are then only case-folded
    pub fn clear_document_types(&mut self) {
        self.document_types = None;
    }

    /// Fetch the account's document types and replace the installed table
    pub fn refresh_document_types(&mut self) -> Result<&DocumentTypes> {
        let response = self.send(HttpRequest::new(Method::GET, self.config.endpoint("limit/")))?;
        if !response.is_success() {
            return Err(DocsumoError::http(response.status, response.body.to_string()));
        }

        let types = DocumentTypes::from_limit_response(&response.body)?;
        tracing::debug!(count = types.entries().len(), "document types refreshed");
        Ok(&*self.document_types.insert(types))
    }

    /// Credit limit information for the account: documents allowed, documents
    /// already uploaded and the document types available for upload.
    ///
    /// The decoded body is returned unmodified.
    pub fn user_detail_credit_limit(&self) -> Result<Value> {
        let response = self.send(HttpRequest::new(Method::GET, self.config.endpoint("limit/")))?;
        Ok(response.body)
    }

    /// List documents, newest first.
    ///
    /// # Arguments
    /// * `offset` - Number of documents to skip
    /// * `limit` - Maximum number of documents returned
    /// * `status` - Only documents in one of these states; empty means any
    pub fn documents_list<S: AsRef<str>>(
        &self,
        offset: u32,
        limit: u32,
        status: &[S],
    ) -> Result<Value> {
        let mut request = HttpRequest::new(Method::GET, self.config.endpoint("documents/"))
            .with_query("offset", offset.to_string())
            .with_query("limit", limit.to_string())
            .with_query("sort_by", DOCUMENTS_SORT_BY);
        for state in status {
            request = request.with_query("status", state.as_ref());
        }

        let response = self.send(request)?;
        Ok(response.body)
    }

    /// Document counts per processing state
    pub fn documents_summary(&self) -> Result<Value> {
        let response = self.send(HttpRequest::new(
            Method::GET,
            self.config.endpoint("documents/summary/"),
        ))?;
        Ok(response.body)
    }

    /// Extracted fields of a processed document
    pub fn extracted_data(&self, doc_id: &str) -> Result<Value> {
        let response = self.send(HttpRequest::new(
            Method::GET,
            self.config.endpoint(&format!("data/{}/", doc_id)),
        ))?;
        Ok(response.body)
    }

    /// OCR output of a processed document
    pub fn extracted_ocr(&self, doc_id: &str) -> Result<Value> {
        let response = self.send(HttpRequest::new(
            Method::GET,
            self.config.endpoint(&format!("ocr/{}/", doc_id)),
        ))?;
        Ok(response.body)
    }

    /// Change the value and position of one extracted field.
    ///
    /// `position` is the bounding box as `[x, y, x1, y1]`.
    pub fn update_item(
        &self,
        doc_id: &str,
        item_id: u64,
        value: &str,
        position: &[i64],
    ) -> Result<Value> {
        let request = HttpRequest::new(
            Method::POST,
            self.config
                .endpoint(&format!("update/item/{}/{}/", doc_id, item_id)),
        )
        .with_json(json!({"value": value, "position": position}));

        let response = self.send(request)?;
        Ok(response.body)
    }

    /// Add a line item to a document; `item` is sent as is
    pub fn add_item(&self, doc_id: &str, item: &Value) -> Result<Value> {
        let request = HttpRequest::new(
            Method::POST,
            self.config.endpoint(&format!("add/item/{}/", doc_id)),
        )
        .with_json(item.clone());

        let response = self.send(request)?;
        Ok(response.body)
    }

    /// Delete documents one request at a time.
    ///
    /// A document the API refuses, or whose request fails, lands in
    /// `not_deleted` and the remaining ids are still sent.
    pub fn delete_documents<S: AsRef<str>>(&self, doc_ids: &[S]) -> Result<DeleteResult> {
        if doc_ids.is_empty() {
            return Err(DocsumoError::NoDocumentIds);
        }

        let mut result = DeleteResult::default();
        for doc_id in doc_ids {
            let doc_id = doc_id.as_ref();
            match self.delete_document(doc_id) {
                Ok(()) => result.deleted.push(doc_id.to_string()),
                Err(e) => {
                    tracing::warn!(doc_id, error = %e, "document not deleted");
                    result.not_deleted.push(NotDeleted {
                        doc_id: doc_id.to_string(),
                        err_message: e.to_string(),
                    });
                }
            }
        }
        Ok(result)
    }

    /// Delete every document of the account, returning the ids that were sent
    pub fn delete_documents_all(&self) -> Result<Vec<String>> {
        let body = self.documents_list::<&str>(0, DELETE_ALL_LIMIT, &[])?;
        let doc_ids: Vec<String> = match ApiResponse::new(&body).get("documents") {
            Some(Value::Array(documents)) => documents
                .iter()
                .filter_map(|doc| doc.get("doc_id").and_then(Value::as_str))
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        };

        if doc_ids.is_empty() {
            return Ok(doc_ids);
        }
        let result = self.delete_documents(&doc_ids)?;
        tracing::info!(
            deleted = result.deleted.len(),
            not_deleted = result.not_deleted.len(),
            "delete all finished"
        );
        Ok(doc_ids)
    }

    fn delete_document(&self, doc_id: &str) -> Result<()> {
        let response = self.send(HttpRequest::new(
            Method::POST,
            self.config.endpoint(&format!("delete/{}/", doc_id)),
        ))?;
        if !response.is_success() {
            let message = ApiResponse::new(&response.body)
                .message()
                .map(str::to_string)
                .unwrap_or_else(|| response.body.to_string());
            return Err(DocsumoError::http(response.status, message));
        }
        Ok(())
    }

    /// Upload one document for processing.
    ///
    /// # Arguments
    /// * `file_path` - Path of the document
    /// * `doc_type` - Document type label, resolved through the installed table when present
    /// * `user_doc_id` - Optional caller-chosen id
    ///
    /// # Returns
    /// The decoded response body, whatever the status code
    pub fn upload_file<P: AsRef<Path>>(
        &self,
        file_path: P,
        doc_type: &str,
        user_doc_id: Option<&str>,
    ) -> Result<Value> {
        let doc_type = self.normalize_document_type(doc_type)?;
        let file_path = file_path.as_ref();
        let content = std::fs::read(file_path)?;

        let mut form = Form::new()
            .file("files", document_title(file_path), content)
            .text("type", doc_type)
            .text("uploaded_from", UPLOADED_FROM);
        if let Some(id) = user_doc_id {
            form = form.text("user_doc_id", id);
        }

        let response = self.send_upload(form)?;
        Ok(response.body)
    }

    /// Resolve a label through the installed table, or case-fold it when none is installed
    pub fn normalize_document_type(&self, label: &str) -> Result<String> {
        match &self.document_types {
            Some(types) => types.require(label),
            None => Ok(label.to_lowercase()),
        }
    }

    pub(crate) fn send_upload(&self, form: Form) -> Result<TransportResponse> {
        self.send(HttpRequest::new(Method::POST, self.config.endpoint("upload/")).with_multipart(form))
    }

    fn send(&self, request: HttpRequest) -> Result<TransportResponse> {
        self.transport
            .send(request.with_headers(self.config.auth_headers()))
    }
}
