use crate::api::{Docsumo, UPLOADED_FROM};
use crate::error::{DocsumoError, Result};
use crate::response::ProviderError;
use crate::transport::{Form, Transport};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Statuses for which the provider returns the documented error body
pub const PROVIDER_ERROR_STATUSES: [u16; 3] = [400, 401, 409];

/// `error` value of a failure whose file could not be read
pub const FILE_UNREADABLE: &str = "file_unreadable";

/// `error` value of a failure whose request never got a response
pub const REQUEST_FAILED: &str = "request_failed";

/// One file of a batch with its optional caller-chosen id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadItem {
    pub path: PathBuf,
    pub user_doc_id: Option<String>,
}

/// Files to upload together under one document type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub doc_type: String,
    pub items: Vec<UploadItem>,
}

impl UploadRequest {
    /// Empty batch for a document type
    pub fn new(doc_type: impl Into<String>) -> Self {
        UploadRequest {
            doc_type: doc_type.into(),
            items: Vec::new(),
        }
    }

    /// Pair paths with ids; fails with `LengthMismatch` when the counts differ
    pub fn from_parts<P, S>(
        file_paths: &[P],
        doc_type: impl Into<String>,
        user_doc_ids: Option<&[S]>,
    ) -> Result<Self>
    where
        P: AsRef<Path>,
        S: AsRef<str>,
    {
        if let Some(ids) = user_doc_ids {
            if ids.len() != file_paths.len() {
                return Err(DocsumoError::LengthMismatch {
                    files: file_paths.len(),
                    ids: ids.len(),
                });
            }
        }

        let items = file_paths
            .iter()
            .enumerate()
            .map(|(i, path)| UploadItem {
                path: path.as_ref().to_path_buf(),
                user_doc_id: user_doc_ids.map(|ids| ids[i].as_ref().to_string()),
            })
            .collect();

        Ok(UploadRequest {
            doc_type: doc_type.into(),
            items,
        })
    }

    /// Append a file
    pub fn file(mut self, path: impl Into<PathBuf>, user_doc_id: Option<String>) -> Self {
        self.items.push(UploadItem {
            path: path.into(),
            user_doc_id,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Correlates a failure back to the caller's input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_doc_id: Option<String>,
    pub title: String,
}

/// Best explanation available for a failed item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FailureReason {
    /// Documented provider error body
    Provider {
        error: String,
        message: String,
        status_code: u16,
    },
    /// Any other non-200 status
    Status { status_code: u16 },
    /// File unreadable or no response received
    Local { error: String, message: String },
}

/// A file that was not uploaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadFailure {
    pub metadata: FailureMetadata,
    #[serde(flatten)]
    pub reason: FailureReason,
}

impl UploadFailure {
    pub fn status_code(&self) -> Option<u16> {
        match &self.reason {
            FailureReason::Provider { status_code, .. } | FailureReason::Status { status_code } => {
                Some(*status_code)
            }
            FailureReason::Local { .. } => None,
        }
    }
}

/// Outcome of one file
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    /// Decoded response body, untouched
    Success(Value),
    Failure(UploadFailure),
}

/// Successes and failures of a batch, each in input order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadBatchResult {
    #[serde(rename = "files_uploaded")]
    pub successes: Vec<Value>,
    #[serde(rename = "files_not_uploaded")]
    pub failures: Vec<UploadFailure>,
}

impl UploadBatchResult {
    fn push(&mut self, outcome: UploadOutcome) {
        match outcome {
            UploadOutcome::Success(body) => self.successes.push(body),
            UploadOutcome::Failure(failure) => self.failures.push(failure),
        }
    }

    /// Number of files processed
    pub fn len(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn all_uploaded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Display title of a file: its last path segment, splitting on both `/` and `\`
pub fn document_title(path: &Path) -> String {
    let raw = path.to_string_lossy();
    raw.rsplit(['/', '\\'])
        .find(|segment| !segment.is_empty())
        .unwrap_or(raw.as_ref())
        .to_string()
}

/// Classify one upload response
fn classify(status: u16, body: Value, metadata: FailureMetadata) -> UploadOutcome {
    if status == 200 {
        return UploadOutcome::Success(body);
    }

    let reason = if PROVIDER_ERROR_STATUSES.contains(&status) {
        match ProviderError::from_body(&body) {
            Some(err) => FailureReason::Provider {
                error: err.error,
                message: err.message,
                status_code: err.status_code,
            },
            None => FailureReason::Status {
                status_code: status,
            },
        }
    } else {
        FailureReason::Status {
            status_code: status,
        }
    };

    UploadOutcome::Failure(UploadFailure { metadata, reason })
}

impl<T: Transport> Docsumo<T> {
    /// Upload several documents, one request per file, in order.
    ///
    /// # Arguments
    /// * `file_paths` - Paths of the documents
    /// * `doc_type` - Document type label shared by all files
    ///
    /// # Returns
    /// Uploaded and not-uploaded files. A file that fails never stops the batch;
    /// only an unsupported document type fails the whole call, before any
    /// request is sent.
    pub fn upload_files<P: AsRef<Path>>(
        &self,
        file_paths: &[P],
        doc_type: &str,
    ) -> Result<UploadBatchResult> {
        let request = UploadRequest::from_parts(file_paths, doc_type, None::<&[&str]>)?;
        self.upload_batch(&request)
    }

    /// Like [`Docsumo::upload_files`], with one caller-chosen id per file.
    /// Fails with `LengthMismatch` before any request when the counts differ.
    pub fn upload_files_with_ids<P, S>(
        &self,
        file_paths: &[P],
        doc_type: &str,
        user_doc_ids: &[S],
    ) -> Result<UploadBatchResult>
    where
        P: AsRef<Path>,
        S: AsRef<str>,
    {
        let request = UploadRequest::from_parts(file_paths, doc_type, Some(user_doc_ids))?;
        self.upload_batch(&request)
    }

    /// Upload every item of a prepared request
    pub fn upload_batch(&self, request: &UploadRequest) -> Result<UploadBatchResult> {
        let doc_type = self.normalize_document_type(&request.doc_type)?;
        let mut result = UploadBatchResult::default();

        for item in &request.items {
            let outcome = self.upload_item(item, &doc_type);
            match &outcome {
                UploadOutcome::Success(_) => {
                    tracing::info!(path = %item.path.display(), "document uploaded");
                }
                UploadOutcome::Failure(failure) => {
                    tracing::warn!(
                        path = %item.path.display(),
                        status_code = ?failure.status_code(),
                        "document not uploaded"
                    );
                }
            }
            result.push(outcome);
        }

        tracing::info!(
            uploaded = result.successes.len(),
            failed = result.failures.len(),
            "batch upload finished"
        );
        Ok(result)
    }

    fn upload_item(&self, item: &UploadItem, doc_type: &str) -> UploadOutcome {
        let title = document_title(&item.path);
        let metadata = FailureMetadata {
            user_doc_id: item.user_doc_id.clone(),
            title: title.clone(),
        };

        let content = match std::fs::read(&item.path) {
            Ok(content) => content,
            Err(err) => {
                return UploadOutcome::Failure(UploadFailure {
                    metadata,
                    reason: FailureReason::Local {
                        error: FILE_UNREADABLE.to_string(),
                        message: err.to_string(),
                    },
                })
            }
        };

        let form = Form::new()
            .file("files", title, content)
            .text("type", doc_type)
            .text("user_doc_id", item.user_doc_id.as_deref().unwrap_or(""))
            .text("uploaded_from", UPLOADED_FROM);

        match self.send_upload(form) {
            Ok(response) => classify(response.status, response.body, metadata),
            Err(err) => UploadOutcome::Failure(UploadFailure {
                metadata,
                reason: FailureReason::Local {
                    error: REQUEST_FAILED.to_string(),
                    message: err.to_string(),
                },
            }),
        }
    }
}
