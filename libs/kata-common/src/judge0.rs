// Judge0 HTTP client

use crate::config::Config;
use crate::coordinator::{decode_snapshot, ExecutionService};
use crate::error::ExecutionError;
use crate::types::{SubmissionJob, SubmissionRequest};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

#[derive(Debug, Serialize)]
struct CreateSubmission {
    source_code: String,
    language_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stdin: Option<String>,
}

#[derive(Clone)]
pub struct Judge0Client {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    api_host: Option<String>,
    base64: bool,
}

impl Judge0Client {
    pub fn new(config: &Config) -> Self {
        Self {
            http: Client::new(),
            base_url: config.judge0_url.clone(),
            api_key: config.judge0_api_key.clone(),
            api_host: config.judge0_api_host.clone(),
            base64: config.judge0_base64,
        }
    }

    /// Plain client without API headers
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            api_host: None,
            base64: false,
        }
    }

    pub fn base64_encoded(mut self, enabled: bool) -> Self {
        self.base64 = enabled;
        self
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ExecutionError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ExecutionError::Decode(format!("invalid base url {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ExecutionError::Decode(format!("base url {} cannot have a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let mut builder = self.http.request(method, url);
        if let Some(key) = &self.api_key {
            builder = builder.header("x-rapidapi-key", key);
        }
        if let Some(host) = &self.api_host {
            builder = builder.header("x-rapidapi-host", host);
        }
        builder
    }

    fn encode(&self, text: &str) -> String {
        if self.base64 {
            general_purpose::STANDARD.encode(text)
        } else {
            text.to_string()
        }
    }

    fn decode_field(&self, field: Option<String>) -> Result<Option<String>, ExecutionError> {
        match field {
            Some(encoded) if self.base64 => {
                let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
                let bytes = general_purpose::STANDARD
                    .decode(compact)
                    .map_err(|e| ExecutionError::Decode(format!("invalid base64 output: {}", e)))?;
                Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
            }
            other => Ok(other),
        }
    }
}

#[async_trait]
impl ExecutionService for Judge0Client {
    async fn submit(&self, request: &SubmissionRequest) -> Result<String, ExecutionError> {
        let mut url = self.url(&["submissions"])?;
        url.query_pairs_mut()
            .append_pair("base64_encoded", if self.base64 { "true" } else { "false" })
            .append_pair("wait", "false");

        let body = CreateSubmission {
            source_code: self.encode(&request.source_code),
            language_id: request.language_id,
            stdin: request.stdin.as_deref().map(|s| self.encode(s)),
        };

        debug!(
            language_id = request.language_id,
            source_size = request.source_code.len(),
            "Creating submission"
        );

        let response = self.request(Method::POST, url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!(status = status.as_u16(), "Submission rejected");
            return Err(ExecutionError::Submit {
                status: status.as_u16(),
                body: text,
            });
        }

        let token = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|v| v.get("token").and_then(Value::as_str).map(str::to_string))
            .filter(|t| !t.is_empty());

        match token {
            Some(token) => Ok(token),
            None => {
                error!(status = status.as_u16(), "Submission response carried no token");
                Err(ExecutionError::Submit {
                    status: status.as_u16(),
                    body: text,
                })
            }
        }
    }

    async fn status(&self, token: &str) -> Result<Value, ExecutionError> {
        if token.trim().is_empty() {
            return Err(ExecutionError::MissingToken);
        }

        let mut url = self.url(&["submissions", token])?;
        url.query_pairs_mut()
            .append_pair("base64_encoded", if self.base64 { "true" } else { "false" })
            .append_pair("fields", "*");

        let response = self.request(Method::GET, url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ExecutionError::Poll {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| ExecutionError::Decode(e.to_string()))
    }

    async fn poll(&self, token: &str) -> Result<SubmissionJob, ExecutionError> {
        let snapshot = self.status(token).await?;
        let mut job = decode_snapshot(token, &snapshot)?;
        job.stdout = self.decode_field(job.stdout)?;
        job.stderr = self.decode_field(job.stderr)?;
        job.compile_output = self.decode_field(job.compile_output)?;
        job.message = self.decode_field(job.message)?;
        Ok(job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::JobStatus;
    use axum::{
        extract::{Path, Query},
        http::{HeaderMap, StatusCode},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;
    use std::collections::HashMap;
    use tokio::net::TcpListener;

    async fn spawn(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn create(
        headers: HeaderMap,
        Query(query): Query<HashMap<String, String>>,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        assert_eq!(query.get("wait").map(String::as_str), Some("false"));
        if body["language_id"] == json!(999) {
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({"language_id": ["is not valid"]})));
        }
        if body["language_id"] == json!(0) {
            return (StatusCode::CREATED, Json(json!({})));
        }
        let token = if headers.get("x-rapidapi-key").is_some() { "keyed" } else { "tok-1" };
        (StatusCode::CREATED, Json(json!({"token": token})))
    }

    async fn show(
        Path(token): Path<String>,
        Query(query): Query<HashMap<String, String>>,
    ) -> (StatusCode, Json<Value>) {
        if token == "missing" {
            return (StatusCode::NOT_FOUND, Json(json!({"error": "Not found"})));
        }
        let encoded = query.get("base64_encoded").map(String::as_str) == Some("true");
        let stdout = if encoded { "aGVsbG8K" } else { "hello\n" };
        (
            StatusCode::OK,
            Json(json!({
                "token": token,
                "stdout": stdout,
                "stderr": null,
                "compile_output": null,
                "message": null,
                "time": "0.02",
                "memory": 1024,
                "status": {"id": 3, "description": "Accepted"}
            })),
        )
    }

    async fn judge0() -> String {
        let app = Router::new()
            .route("/submissions", post(create))
            .route("/submissions/:token", get(show));
        spawn(app).await
    }

    fn request(language_id: u32) -> SubmissionRequest {
        SubmissionRequest {
            source_code: "print('hello')".to_string(),
            language_id,
            stdin: Some("".to_string()),
        }
    }

    #[tokio::test]
    async fn test_submit_returns_token() {
        let client = Judge0Client::with_base_url(judge0().await);
        assert_eq!(client.submit(&request(71)).await.unwrap(), "tok-1");
    }

    #[tokio::test]
    async fn test_submit_sends_api_headers() {
        let base = judge0().await;
        let config = Config::from_lookup(|key| match key {
            "JUDGE0_URL" => Some(base.clone()),
            "JUDGE0_API_KEY" => Some("secret".to_string()),
            _ => None,
        })
        .unwrap();
        let client = Judge0Client::new(&config);
        assert_eq!(client.submit(&request(71)).await.unwrap(), "keyed");
    }

    #[tokio::test]
    async fn test_submit_rejection_keeps_upstream_body() {
        let client = Judge0Client::with_base_url(judge0().await);
        match client.submit(&request(999)).await.unwrap_err() {
            ExecutionError::Submit { status, body } => {
                assert_eq!(status, 422);
                assert!(body.contains("is not valid"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submit_without_token_is_an_error() {
        let client = Judge0Client::with_base_url(judge0().await);
        match client.submit(&request(0)).await.unwrap_err() {
            ExecutionError::Submit { status, body } => {
                assert_eq!(status, 201);
                assert_eq!(body, "{}");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_poll_decodes_snapshot() {
        let client = Judge0Client::with_base_url(judge0().await);
        let job = client.poll("tok-1").await.unwrap();
        assert_eq!(job.token, "tok-1");
        assert_eq!(job.status, JobStatus::Finished);
        assert_eq!(job.stdout.as_deref(), Some("hello\n"));
        assert_eq!(job.memory, Some(1024));
    }

    #[tokio::test]
    async fn test_poll_base64_fields_are_decoded() {
        let client = Judge0Client::with_base_url(judge0().await).base64_encoded(true);
        let job = client.poll("tok-1").await.unwrap();
        assert_eq!(job.stdout.as_deref(), Some("hello\n"));
        let raw = client.status("tok-1").await.unwrap();
        assert_eq!(raw["stdout"], json!("aGVsbG8K"));
    }

    #[tokio::test]
    async fn test_poll_failure_and_missing_token() {
        let client = Judge0Client::with_base_url(judge0().await);
        match client.poll("missing").await.unwrap_err() {
            ExecutionError::Poll { status, body } => {
                assert_eq!(status, 404);
                assert!(body.contains("Not found"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(matches!(client.poll("").await, Err(ExecutionError::MissingToken)));
    }
}
