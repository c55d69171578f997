//! reqwest implementation of [`WellApi`]
//!
//! Talks to the well-log backend over HTTP. Every request shares one client
//! and one timeout; non-success answers are turned into
//! [`WellscopeError::Api`] carrying the backend's `detail` message.

use crate::api::{
    ChartData, ChatReply, ChatRequest, HealthStatus, InterpretationResponse, UploadProgress,
    UploadResponse, WellApi, WellDetail, WellId, WellSummary,
};
use crate::config::ApiConfig;
use crate::error::{Result, WellscopeError};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

/// Bytes handed to the transport per progress tick
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// HTTP client for the well-log backend
///
/// # Examples
///
/// ```
/// use wellscope::api::HttpWellApi;
/// use wellscope::config::ApiConfig;
///
/// let api = HttpWellApi::new(&ApiConfig::default()).unwrap();
/// assert_eq!(api.base_url(), "http://localhost:8000/api");
/// ```
#[derive(Debug, Clone)]
pub struct HttpWellApi {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct InterpretBody<'a> {
    curves: &'a [String],
    depth_min: f64,
    depth_max: f64,
}

impl HttpWellApi {
    /// Create a client for the configured backend
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("wellscope/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WellscopeError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized backend client: base_url={}, timeout={}s",
            config.base_url,
            config.timeout_seconds
        );

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are issued against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder, what: &str) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            tracing::error!("{} request failed: {}", what, e);
            WellscopeError::Transport(format!("{} request failed: {}", what, e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = extract_detail(&body);
            tracing::error!("{} returned error {}: {}", what, status, detail);
            return Err(WellscopeError::Api {
                status: status.as_u16(),
                detail,
            }
            .into());
        }

        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
        response.json::<T>().await.map_err(|e| {
            tracing::error!("Failed to parse {} response: {}", what, e);
            WellscopeError::Transport(format!("Failed to parse {} response: {}", what, e)).into()
        })
    }
}

/// Pull FastAPI's `{"detail": ...}` out of an error body
fn extract_detail(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => match value.get("detail") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => body.to_string(),
        },
        Err(_) => body.trim().to_string(),
    }
}

#[async_trait]
impl WellApi for HttpWellApi {
    async fn health(&self) -> Result<HealthStatus> {
        let response = self
            .send(self.client.get(self.url("/health")), "Health check")
            .await?;
        Self::decode(response, "health").await
    }

    async fn list_wells(&self) -> Result<Vec<WellSummary>> {
        tracing::debug!("Fetching well list");
        let response = self
            .send(self.client.get(self.url("/wells")), "Well list")
            .await?;
        Self::decode(response, "well list").await
    }

    async fn get_well(&self, id: WellId) -> Result<WellDetail> {
        tracing::debug!(well_id = id, "Fetching well detail");
        let response = self
            .send(self.client.get(self.url(&format!("/wells/{}", id))), "Well detail")
            .await?;
        Self::decode(response, "well detail").await
    }

    async fn get_data(
        &self,
        id: WellId,
        curves: &[String],
        depth_min: Option<f64>,
        depth_max: Option<f64>,
    ) -> Result<ChartData> {
        let mut query: Vec<(&str, String)> = vec![("curves", curves.join(","))];
        if let Some(min) = depth_min {
            query.push(("depth_min", min.to_string()));
        }
        if let Some(max) = depth_max {
            query.push(("depth_max", max.to_string()));
        }

        tracing::debug!(well_id = id, curves = curves.len(), "Fetching chart data");
        let request = self
            .client
            .get(self.url(&format!("/wells/{}/data", id)))
            .query(&query);
        let response = self.send(request, "Chart data").await?;
        Self::decode(response, "chart data").await
    }

    async fn delete_well(&self, id: WellId) -> Result<()> {
        tracing::debug!(well_id = id, "Deleting well");
        self.send(
            self.client.delete(self.url(&format!("/wells/{}", id))),
            "Delete well",
        )
        .await?;
        Ok(())
    }

    async fn interpret(
        &self,
        id: WellId,
        curves: &[String],
        depth_min: f64,
        depth_max: f64,
    ) -> Result<InterpretationResponse> {
        let body = InterpretBody {
            curves,
            depth_min,
            depth_max,
        };
        tracing::debug!(well_id = id, curves = curves.len(), "Requesting interpretation");
        let request = self
            .client
            .post(self.url(&format!("/wells/{}/interpret", id)))
            .json(&body);
        let response = self.send(request, "Interpretation").await?;
        Self::decode(response, "interpretation").await
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply> {
        tracing::debug!(
            well_id = request.well_id,
            history = request.history.len(),
            detail_level = request.detail_level,
            "Sending chat message"
        );
        let response = self
            .send(self.client.post(self.url("/chat")).json(request), "Chat")
            .await?;
        Self::decode(response, "chat").await
    }

    async fn upload(
        &self,
        path: &Path,
        progress: Option<UploadProgress>,
    ) -> Result<UploadResponse> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| WellscopeError::Validation(format!("Not a file: {}", path.display())))?;
        if !file_name.to_lowercase().ends_with(".las") {
            return Err(
                WellscopeError::Validation("Only .las files are accepted.".to_string()).into(),
            );
        }

        let content = Bytes::from(tokio::fs::read(path).await.map_err(WellscopeError::Io)?);
        let total = content.len() as u64;
        let chunks: Vec<Bytes> = (0..content.len())
            .step_by(UPLOAD_CHUNK_SIZE)
            .map(|start| content.slice(start..(start + UPLOAD_CHUNK_SIZE).min(content.len())))
            .collect();

        let mut sent = 0u64;
        let stream = futures::stream::iter(chunks.into_iter().map(move |chunk| {
            sent += chunk.len() as u64;
            if let Some(report) = &progress {
                report(sent, total);
            }
            Ok::<Bytes, std::io::Error>(chunk)
        }));

        let part = Part::stream_with_length(Body::wrap_stream(stream), total)
            .file_name(file_name.clone())
            .mime_str("application/octet-stream")
            .map_err(WellscopeError::Http)?;
        let form = Form::new().part("file", part);

        tracing::info!(file = %file_name, bytes = total, "Uploading LAS file");
        let response = self
            .send(
                self.client.post(self.url("/wells/upload")).multipart(form),
                "Upload",
            )
            .await?;
        Self::decode(response, "upload").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = ApiConfig {
            base_url: "http://localhost:8000/api/".to_string(),
            ..Default::default()
        };
        let api = HttpWellApi::new(&config).unwrap();
        assert_eq!(api.url("/wells"), "http://localhost:8000/api/wells");
    }

    #[test]
    fn test_extract_detail_from_fastapi_body() {
        assert_eq!(extract_detail(r#"{"detail": "Well not found."}"#), "Well not found.");
    }

    #[test]
    fn test_extract_detail_from_validation_array() {
        let detail = extract_detail(r#"{"detail": [{"msg": "field required"}]}"#);
        assert!(detail.contains("field required"));
    }

    #[test]
    fn test_extract_detail_falls_back_to_body() {
        assert_eq!(extract_detail("Internal Server Error\n"), "Internal Server Error");
        assert_eq!(extract_detail(r#"{"error": "x"}"#), r#"{"error": "x"}"#);
    }

    #[tokio::test]
    async fn test_upload_rejects_non_las_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        let api = HttpWellApi::new(&ApiConfig::default()).unwrap();
        let err = api.upload(&path, None).await.unwrap_err();
        assert_eq!(
            crate::error::user_message_of(&err),
            "Only .las files are accepted."
        );
    }

    #[tokio::test]
    async fn test_upload_of_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.las");

        let api = HttpWellApi::new(&ApiConfig::default()).unwrap();
        let err = api.upload(&path, None).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WellscopeError>(),
            Some(WellscopeError::Io(_))
        ));
        assert!(crate::error::user_message_of(&err).starts_with("IO error"));
    }
}
