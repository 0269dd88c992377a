//! Upload transport
//!
//! `POST <endpoint>` with a multipart body; the server answers with JSON
//! carrying an `id` and either `url` or `file_url`.

use super::FileCandidate;
use crate::config::UploadConfig;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Transport failure for a single file
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("server returned status {0}")]
    Status(u16),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Endpoint response body
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UploadResponse {
    /// String or numeric id
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
}

impl UploadResponse {
    /// Server id as a string, if one was sent
    pub fn id(&self) -> Option<String> {
        match self.id.as_ref()? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// `url`, falling back to `file_url`
    pub fn url(&self) -> Option<&str> {
        self.url
            .as_deref()
            .or(self.file_url.as_deref())
            .filter(|u| !u.is_empty())
    }
}

/// Sends one file to the backend
#[async_trait]
pub trait UploadTransport: Send + Sync {
    async fn upload(&self, file: &FileCandidate) -> Result<UploadResponse, TransportError>;
}

/// Multipart HTTP transport
pub struct HttpUploadTransport {
    client: reqwest::Client,
    endpoint: String,
    field_name: String,
}

impl HttpUploadTransport {
    pub fn new(config: &UploadConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self::with_client(client, config))
    }

    /// Reuse an existing client (shared connection pool, auth headers)
    pub fn with_client(client: reqwest::Client, config: &UploadConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            field_name: config.field_name.clone(),
        }
    }
}

#[async_trait]
impl UploadTransport for HttpUploadTransport {
    async fn upload(&self, file: &FileCandidate) -> Result<UploadResponse, TransportError> {
        let part = reqwest::multipart::Part::bytes(file.bytes().to_vec())
            .file_name(file.name().to_string())
            .mime_str(file.mime_type())
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part(self.field_name.clone(), part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TransportError::Status(response.status().as_u16()));
        }

        response
            .json::<UploadResponse>()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio_test::assert_ok;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer) -> UploadConfig {
        UploadConfig {
            endpoint: format!("{}/uploads", server.uri()),
            ..Default::default()
        }
    }

    #[test]
    fn test_response_url_fallback() {
        let response: UploadResponse =
            serde_json::from_value(json!({"id": 42, "file_url": "https://cdn.example.com/a.pdf"}))
                .unwrap();
        assert_eq!(response.id().as_deref(), Some("42"));
        assert_eq!(response.url(), Some("https://cdn.example.com/a.pdf"));
    }

    #[tokio::test]
    async fn test_multipart_upload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/uploads"))
            .and(body_string_contains("name=\"file\""))
            .and(body_string_contains("licence.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "f-1",
                "url": "https://cdn.example.com/licence.pdf"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpUploadTransport::new(&config(&server)).unwrap();
        let file = FileCandidate::new("licence.pdf", b"%PDF-1.4".to_vec());
        let response = assert_ok!(transport.upload(&file).await);
        assert_eq!(response.id().as_deref(), Some("f-1"));
        assert_eq!(response.url(), Some("https://cdn.example.com/licence.pdf"));
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let transport = HttpUploadTransport::new(&config(&server)).unwrap();
        let file = FileCandidate::new("photo.png", vec![0u8; 16]);
        assert_eq!(
            transport.upload(&file).await,
            Err(TransportError::Status(500))
        );
    }

    #[tokio::test]
    async fn test_non_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let transport = HttpUploadTransport::new(&config(&server)).unwrap();
        let file = FileCandidate::new("photo.png", vec![0u8; 16]);
        assert!(matches!(
            transport.upload(&file).await,
            Err(TransportError::InvalidResponse(_))
        ));
    }
}
