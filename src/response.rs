use serde::{Deserialize, Serialize};
use serde_json::Value;

/// ApiResponse wraps a decoded body without imposing a schema on it.
/// Docsumo usually answers with
/// `{"data": ..., "error": "", "error_code": "", "message": "", "status": "success", "status_code": 200}`,
/// but any field may be missing or carry an unexpected type, so each
/// accessor reads only the field it needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<'a> {
    body: &'a Value,
}

impl<'a> ApiResponse<'a> {
    pub fn new(body: &'a Value) -> Self {
        ApiResponse { body }
    }

    /// Get the raw data value from the response
    pub fn raw(&self) -> Option<&'a Value> {
        self.body.get("data").filter(|data| !data.is_null())
    }

    /// `status` field, e.g. "success" or "fail"
    pub fn status(&self) -> Option<&'a str> {
        self.body.get("status").and_then(Value::as_str)
    }

    /// `status_code` field echoed in the body
    pub fn status_code(&self) -> Option<u64> {
        self.body.get("status_code").and_then(Value::as_u64)
    }

    /// `message` field, `None` when absent or empty
    pub fn message(&self) -> Option<&'a str> {
        self.body
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
    }

    /// Unmarshal the response data into the provided type
    pub fn apply<T>(&self) -> Result<T, crate::error::DocsumoError>
    where
        T: serde::de::DeserializeOwned,
    {
        match self.raw() {
            Some(data) => T::deserialize(data).map_err(|e| e.into()),
            None => serde_json::from_value(Value::Null).map_err(|e| e.into()),
        }
    }

    /// Get a value from the response data by a slash-separated path.
    /// For example, "document_types/0/title" reads the first document type's title.
    pub fn get(&self, path: &str) -> Option<&'a Value> {
        let mut current = self.raw()?;

        for part in path.split('/').filter(|s| !s.is_empty()) {
            current = match current {
                Value::Object(map) => map.get(part)?,
                Value::Array(arr) => {
                    let index: usize = part.parse().ok()?;
                    arr.get(index)?
                }
                _ => return None,
            };
        }

        Some(current)
    }

    /// Get a string value from the response data by a slash-separated path
    pub fn get_string(&self, path: &str) -> Option<String> {
        self.get(path).and_then(|v| v.as_str().map(|s| s.to_string()))
    }
}

/// Documented error body returned with 400, 401 and 409
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl ProviderError {
    /// Decode the error shape, `None` when any of the three fields is missing
    pub fn from_body(body: &Value) -> Option<Self> {
        ProviderError::deserialize(body).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_fields() {
        let body = json!({
            "data": {"document_types": [{"title": "Invoice", "value": "invoice"}]},
            "error": "",
            "error_code": "",
            "message": "",
            "status": "success",
            "status_code": 200
        });

        let response = ApiResponse::new(&body);
        assert_eq!(response.status(), Some("success"));
        assert_eq!(response.status_code(), Some(200));
        assert_eq!(response.message(), None);
        assert!(response.raw().is_some());
    }

    #[test]
    fn test_response_tolerates_unexpected_types() {
        let body = json!({
            "data": {"documents": []},
            "error": 0,
            "message": null,
            "status": 1,
            "status_code": "200"
        });

        let response = ApiResponse::new(&body);
        assert_eq!(response.status(), None);
        assert_eq!(response.status_code(), None);
        assert_eq!(response.message(), None);
        assert_eq!(response.get("documents"), Some(&json!([])));
    }

    #[test]
    fn test_response_get() {
        let body = json!({
            "data": {"document_types": [{"title": "Invoice", "value": "invoice"}]}
        });

        let response = ApiResponse::new(&body);
        assert_eq!(
            response.get_string("document_types/0/title"),
            Some("Invoice".to_string())
        );
        assert!(response.get("document_types/3").is_none());
        assert!(response.get("missing").is_none());

        let no_data = json!({"data": null});
        assert!(ApiResponse::new(&no_data).get("").is_none());
    }

    #[test]
    fn test_response_apply() {
        #[derive(Deserialize)]
        struct Limit {
            monthly_doc_limit: u32,
        }

        let body = json!({"data": {"monthly_doc_limit": 500}});
        let limit: Limit = ApiResponse::new(&body).apply().unwrap();
        assert_eq!(limit.monthly_doc_limit, 500);
    }

    #[test]
    fn test_provider_error_shape() {
        let error = ProviderError::from_body(&json!({
            "error": "dup",
            "message": "duplicate",
            "status_code": 409,
            "extra": true
        }));
        assert_eq!(
            error,
            Some(ProviderError {
                error: "dup".to_string(),
                message: "duplicate".to_string(),
                status_code: 409,
            })
        );

        assert_eq!(ProviderError::from_body(&json!({"error": "dup"})), None);
        assert_eq!(ProviderError::from_body(&json!("<html>oops</html>")), None);
    }
}
