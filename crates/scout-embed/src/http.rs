//! Blocking HTTP embedding adapter.
//!
//! Talks to an OpenAI-compatible `/embeddings` endpoint. Requests are sent
//! in configured-size batches; 429 and 5xx responses and transport errors
//! are retried with bounded exponential backoff.

use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::EmbeddingError;
use crate::model::{Embedding, EmbeddingModel, ModelInfo};

/// Configuration for [`HttpEmbedder`].
#[derive(Debug, Clone)]
pub struct HttpEmbedderConfig {
    /// Service base URL, e.g. `https://api.openai.com/v1`
    pub base_url: String,
    /// Bearer token for the service
    pub api_key: SecretString,
    /// Model name requested from the service
    pub model: String,
    /// Expected embedding dimension
    pub dimension: usize,
    /// Maximum texts per request
    pub batch_size: usize,
    /// Per-request timeout
    pub timeout: Duration,
    /// Maximum attempts per batch
    pub max_retries: usize,
}

impl HttpEmbedderConfig {
    pub fn new(
        base_url: impl Into<String>,
        api_key: SecretString,
        model: impl Into<String>,
        dimension: usize,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
            model: model.into(),
            dimension,
            batch_size: 32,
            timeout: Duration::from_secs(30),
            max_retries: 3,
        }
    }

    /// Set the maximum texts per request.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum attempts per batch.
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

/// Blocking embeddings client for OpenAI-compatible endpoints.
pub struct HttpEmbedder {
    client: Client,
    endpoint: String,
    info: ModelInfo,
    batch_size: usize,
    max_retries: usize,
}

impl HttpEmbedder {
    /// Build a client. Missing credentials or an empty model name are fatal
    /// configuration errors.
    pub fn new(config: HttpEmbedderConfig) -> Result<Self, EmbeddingError> {
        if config.api_key.expose_secret().trim().is_empty() {
            return Err(EmbeddingError::Config("missing API key".to_string()));
        }
        if config.model.trim().is_empty() {
            return Err(EmbeddingError::Config("missing model name".to_string()));
        }
        if config.dimension == 0 {
            return Err(EmbeddingError::Config("dimension must be > 0".to_string()));
        }
        if config.batch_size == 0 {
            return Err(EmbeddingError::Config("batch_size must be > 0".to_string()));
        }

        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", config.api_key.expose_secret().trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|_| EmbeddingError::Config("API key is not header-safe".to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        let endpoint = format!("{}/embeddings", config.base_url.trim_end_matches('/'));

        Ok(Self {
            client,
            endpoint,
            info: ModelInfo {
                name: config.model,
                dimension: config.dimension,
            },
            batch_size: config.batch_size,
            max_retries: config.max_retries.max(1),
        })
    }

    /// Send one request for up to `batch_size` texts, with retries.
    fn request_batch(&self, inputs: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        let mut attempt = 0usize;
        loop {
            let request = EmbeddingRequest {
                model: &self.info.name,
                input: inputs,
            };

            match self.client.post(&self.endpoint).json(&request).send() {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        let mut parsed: EmbeddingResponse = resp.json().map_err(|e| {
                            EmbeddingError::InvalidResponse(format!(
                                "failed to parse response body: {}",
                                e
                            ))
                        })?;
                        parsed.data.sort_by_key(|entry| entry.index);
                        if parsed.data.len() != inputs.len() {
                            return Err(EmbeddingError::InvalidResponse(format!(
                                "got {} embeddings for {} inputs",
                                parsed.data.len(),
                                inputs.len()
                            )));
                        }
                        for entry in &parsed.data {
                            if entry.embedding.len() != self.info.dimension {
                                return Err(EmbeddingError::InvalidResponse(format!(
                                    "embedding has dimension {}, expected {}",
                                    entry.embedding.len(),
                                    self.info.dimension
                                )));
                            }
                        }
                        return Ok(parsed
                            .data
                            .into_iter()
                            .map(|entry| Embedding::new(entry.embedding))
                            .collect());
                    }

                    let body = resp
                        .text()
                        .unwrap_or_else(|_| "<body unavailable>".to_string());
                    if retryable_status(status) && attempt + 1 < self.max_retries {
                        attempt += 1;
                        warn!(status = %status, attempt, "Embedding request failed, retrying");
                        thread::sleep(backoff(attempt));
                        continue;
                    }
                    return Err(EmbeddingError::Service {
                        status: status.as_u16(),
                        body,
                    });
                }
                Err(err) => {
                    if retryable_error(&err) && attempt + 1 < self.max_retries {
                        attempt += 1;
                        warn!(error = %err, attempt, "Embedding transport error, retrying");
                        thread::sleep(backoff(attempt));
                        continue;
                    }
                    return Err(err.into());
                }
            }
        }
    }
}

fn retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request() || err.is_body() || err.is_decode()
}

fn backoff(attempt: usize) -> Duration {
    let capped = attempt.min(5) as u32;
    Duration::from_millis(250 * (1 << capped))
}

impl EmbeddingModel for HttpEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut embeddings = Vec::with_capacity(texts.len());
        for group in texts.chunks(self.batch_size) {
            embeddings.extend(self.request_batch(group)?);
        }

        debug!(texts = texts.len(), "Generated embeddings");
        Ok(embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(key: &str, model: &str) -> HttpEmbedderConfig {
        HttpEmbedderConfig::new(
            "http://localhost:9999/v1",
            SecretString::from(key.to_string()),
            model,
            8,
        )
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let result = HttpEmbedder::new(config("  ", "text-embedding-3-small"));
        assert!(matches!(result, Err(EmbeddingError::Config(_))));
    }

    #[test]
    fn test_missing_model_is_config_error() {
        let result = HttpEmbedder::new(config("sk-test", ""));
        assert!(matches!(result, Err(EmbeddingError::Config(_))));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let result = HttpEmbedder::new(config("sk-test", "m").with_batch_size(0));
        assert!(matches!(result, Err(EmbeddingError::Config(_))));
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let embedder =
            HttpEmbedder::new(config("sk-test", "text-embedding-3-small")).unwrap();
        assert_eq!(embedder.endpoint, "http://localhost:9999/v1/embeddings");
        assert_eq!(embedder.info().dimension, 8);
    }

    #[test]
    fn test_empty_batch_short_circuits() {
        let embedder = HttpEmbedder::new(config("sk-test", "m")).unwrap();
        // No texts means no network call, so this succeeds offline.
        assert!(embedder.embed_batch(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_backoff_is_bounded() {
        assert!(backoff(1) < backoff(2));
        assert_eq!(backoff(5), backoff(9));
    }

    /// Serve one canned HTTP response on a loopback socket; returns the
    /// base URL to point the client at.
    fn serve_once(body: String) -> String {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 8192];
                let _ = stream.read(&mut buf);
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{}/v1", addr)
    }

    #[test]
    fn test_response_order_restored_by_index() {
        let body = concat!(
            r#"{"data":[{"embedding":[0.0,1.0,0.0,0.0,0.0,0.0,0.0,0.0],"index":1},"#,
            r#"{"embedding":[1.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0],"index":0}]}"#,
        );
        let base_url = serve_once(body.to_string());
        let embedder = HttpEmbedder::new(HttpEmbedderConfig::new(
            base_url,
            SecretString::from("sk-test".to_string()),
            "m",
            8,
        ))
        .unwrap();

        let embeddings = embedder.embed_batch(&["first", "second"]).unwrap();
        assert_eq!(embeddings.len(), 2);
        assert!((embeddings[0].values[0] - 1.0).abs() < 1e-6);
        assert!((embeddings[1].values[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_wrong_dimension_response_rejected() {
        let body = r#"{"data":[{"embedding":[1.0,0.0],"index":0}]}"#;
        let base_url = serve_once(body.to_string());
        let embedder = HttpEmbedder::new(HttpEmbedderConfig::new(
            base_url,
            SecretString::from("sk-test".to_string()),
            "m",
            8,
        ))
        .unwrap();

        let result = embedder.embed_batch(&["text"]);
        assert!(matches!(result, Err(EmbeddingError::InvalidResponse(_))));
    }

    #[test]
    fn test_count_mismatch_rejected() {
        let body = r#"{"data":[{"embedding":[1.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0],"index":0}]}"#;
        let base_url = serve_once(body.to_string());
        let embedder = HttpEmbedder::new(HttpEmbedderConfig::new(
            base_url,
            SecretString::from("sk-test".to_string()),
            "m",
            8,
        ))
        .unwrap();

        let result = embedder.embed_batch(&["one", "two"]);
        assert!(matches!(result, Err(EmbeddingError::InvalidResponse(_))));
    }
}
