use crate::client::create_http_client;
use crate::error::Result;
use reqwest::blocking::{multipart, Client};
use reqwest::Method;
use serde_json::Value;
use std::time::Instant;
use url::Url;

/// A single field of a multipart form
#[derive(Debug, Clone)]
pub enum FormPart {
    /// Plain text field
    Text { name: String, value: String },
    /// File field with its content and filename
    File {
        name: String,
        filename: String,
        content: Vec<u8>,
    },
}

/// Multipart form body, fields kept in insertion order
#[derive(Debug, Clone, Default)]
pub struct Form {
    pub parts: Vec<FormPart>,
}

impl Form {
    pub fn new() -> Self {
        Form::default()
    }

    /// Append a text field
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Append a file field
    pub fn file(
        mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        content: Vec<u8>,
    ) -> Self {
        self.parts.push(FormPart::File {
            name: name.into(),
            filename: filename.into(),
            content,
        });
        self
    }

    /// Value of the first text field with the given name
    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|part| match part {
            FormPart::Text { name: n, value } if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    /// Filename of the first file field with the given name
    pub fn filename(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|part| match part {
            FormPart::File {
                name: n, filename, ..
            } if n == name => Some(filename.as_str()),
            _ => None,
        })
    }

    fn into_reqwest(self) -> multipart::Form {
        self.parts
            .into_iter()
            .fold(multipart::Form::new(), |form, part| match part {
                FormPart::Text { name, value } => form.text(name, value),
                FormPart::File {
                    name,
                    filename,
                    content,
                } => form.part(name, multipart::Part::bytes(content).file_name(filename)),
            })
    }
}

/// Request body variants
#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(Form),
}

/// One HTTP request as seen by a [`Transport`]
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        HttpRequest {
            method,
            url: url.into(),
            headers: Vec::new(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn with_multipart(mut self, form: Form) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    /// The multipart body, if any
    pub fn form(&self) -> Option<&Form> {
        match &self.body {
            RequestBody::Multipart(form) => Some(form),
            _ => None,
        }
    }

    /// The JSON body, if any
    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            RequestBody::Json(body) => Some(body),
            _ => None,
        }
    }
}

/// Status code and decoded body of an HTTP response.
/// Bodies that are not valid JSON are kept as a JSON string of the raw text.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Value,
}

impl TransportResponse {
    pub fn new(status: u16, body: Value) -> Self {
        TransportResponse { status, body }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Sends one HTTP request and returns the status with the decoded body.
/// Non-success statuses are returned as responses, not errors.
pub trait Transport {
    fn send(&self, request: HttpRequest) -> Result<TransportResponse>;
}

/// [`Transport`] backed by a blocking reqwest client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        Ok(HttpTransport {
            client: create_http_client()?,
        })
    }

    /// Use an existing reqwest client
    pub fn with_client(client: Client) -> Self {
        HttpTransport { client }
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: HttpRequest) -> Result<TransportResponse> {
        let HttpRequest {
            method,
            url,
            headers,
            query,
            body,
        } = request;

        let mut url_parsed = Url::parse(&url)?;
        for (key, value) in &query {
            url_parsed.query_pairs_mut().append_pair(key, value);
        }

        let mut builder = self.client.request(method.clone(), url_parsed.as_str());
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(&body),
            RequestBody::Multipart(form) => builder.multipart(form.into_reqwest()),
        };

        let start = Instant::now();
        let http_response = builder.send()?;
        let status = http_response.status().as_u16();
        let bytes = http_response.bytes()?;

        tracing::debug!(
            method = %method,
            url = %url,
            status,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "docsumo request completed"
        );

        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        Ok(TransportResponse { status, body })
    }
}
