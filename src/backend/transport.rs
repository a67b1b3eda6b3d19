use crate::backend::endpoint::Verb;
use crate::backend::types::{BodyFields, PhysicalRequest, TransportError, TransportResponse};
use crate::config::BackendConfig;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Carries one physical request to the backend.
///
/// Every HTTP status, including 304 and 500, is an `Ok` response here; only
/// failures to obtain a response at all are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: PhysicalRequest) -> Result<TransportResponse, TransportError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(config: &BackendConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;
        Ok(Self::with_client(client, &config.base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        let mut base_url = base_url.to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn request_url(base_url: &str, path: &str) -> String {
    format!("{base_url}{}", path.trim_start_matches('/'))
}

// Python encoders emit these bare tokens for non-finite floats.
const NON_FINITE_TOKENS: [&[u8]; 3] = [b"-Infinity", b"Infinity", b"NaN"];

/// Rewrites non-finite number tokens outside string literals to `null`.
fn null_non_finite(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut index = 0;

    while index < bytes.len() {
        let byte = bytes[index];
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            out.push(byte);
            index += 1;
            continue;
        }

        let rest = &bytes[index..];
        if let Some(token) = NON_FINITE_TOKENS.iter().find(|token| rest.starts_with(token)) {
            out.extend_from_slice(b"null");
            index += token.len();
            continue;
        }
        if byte == b'"' {
            in_string = true;
        }
        out.push(byte);
        index += 1;
    }
    out
}

fn decode_body(status: u16, bytes: &[u8]) -> TransportResponse {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return TransportResponse::empty(status);
    }

    let mut buffer = null_non_finite(bytes);
    match simd_json::serde::from_slice::<Value>(&mut buffer) {
        Ok(value) => TransportResponse::new(status, Some(value)),
        // Plain-text and HTML replies are kept; whether they matter depends on the step.
        Err(error) => {
            tracing::debug!(status, %error, "response body is not JSON, keeping text");
            TransportResponse::text(status, String::from_utf8_lossy(bytes).trim())
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: PhysicalRequest) -> Result<TransportResponse, TransportError> {
        let url = request_url(&self.base_url, &request.path);
        let mut builder = match request.verb {
            Verb::Get => self.client.get(url),
            Verb::Post => self.client.post(url),
            Verb::Put => self.client.put(url),
        };

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if request.verb != Verb::Get {
            builder = builder.json(&request.body.unwrap_or_else(BodyFields::new));
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;

        Ok(decode_body(status, &bytes))
    }
}
