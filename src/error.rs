use thiserror::Error;

/// Main error type for Docsumo API operations
#[derive(Debug, Error)]
pub enum DocsumoError {
    /// No API key was passed and `DOCSUMO_API_KEY` is unset
    #[error("no API key: pass one explicitly or set `DOCSUMO_API_KEY`")]
    NoApiKey,

    /// User doc ids were supplied for a batch but their count differs from the file count
    #[error("length of file paths ({files}) does not match length of user doc ids ({ids})")]
    LengthMismatch { files: usize, ids: usize },

    /// Document type label not present in the installed document type table
    #[error("{label} document type is not supported, supported types: {supported:?}")]
    UnsupportedDocumentType {
        label: String,
        supported: Vec<String>,
    },

    /// Delete was called with no document ids
    #[error("doc_ids should have at least one doc_id")]
    NoDocumentIds,

    /// Credit limit response carried no `document_types`
    #[error("no document_types in credit limit response")]
    MissingDocumentTypes,

    /// Non-success HTTP status on a call whose body is consumed by the client
    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// URL parsing error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DocsumoError {
    /// Create a new HTTP error
    pub fn http(status: u16, body: String) -> Self {
        DocsumoError::Http { status, body }
    }

    /// Errors caused by caller input, raised before any request is sent
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            DocsumoError::NoApiKey
                | DocsumoError::LengthMismatch { .. }
                | DocsumoError::NoDocumentIds
                | DocsumoError::UnsupportedDocumentType { .. }
        )
    }

    /// Get the HTTP status code if this error carries one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            DocsumoError::Http { status, .. } => Some(*status),
            DocsumoError::Reqwest(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type for Docsumo operations
pub type Result<T> = std::result::Result<T, DocsumoError>;
