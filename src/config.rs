use crate::error::AppError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "http://localhost:5000/";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_MAX_NOT_MODIFIED_RETRIES: u32 = 5;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 100;
pub const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 2_000;
pub const DEFAULT_MAX_ESCALATIONS: u32 = 6;
pub const MIN_REQUEST_TIMEOUT_MS: u64 = 100;
pub const MAX_REQUEST_TIMEOUT_MS: u64 = 120_000;
pub const MAX_NOT_MODIFIED_RETRIES: u32 = 50;
pub const MAX_RETRY_DELAY_MS: u64 = 60_000;
pub const MIN_ESCALATIONS: u32 = 2;
pub const MAX_ESCALATIONS: u32 = 32;

const ENV_API_URL: &str = "DASHBOARD_API_URL";
const ENV_REQUEST_TIMEOUT_MS: &str = "DASHBOARD_REQUEST_TIMEOUT_MS";
const ENV_MAX_NOT_MODIFIED_RETRIES: &str = "DASHBOARD_MAX_NOT_MODIFIED_RETRIES";

/// Bounds on how long one logical call may keep re-issuing requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_not_modified_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub max_escalations: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_not_modified_retries: DEFAULT_MAX_NOT_MODIFIED_RETRIES,
            base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_RETRY_MAX_DELAY_MS,
            max_escalations: DEFAULT_MAX_ESCALATIONS,
        }
    }
}

impl RetryPolicy {
    /// Delay before the given (zero-based) retry of a 304 answer.
    pub fn backoff_delay_ms(&self, attempt: u32) -> u64 {
        let exponent = attempt.min(16);
        self.base_delay_ms
            .saturating_mul(1_u64 << exponent)
            .min(self.max_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfigArgs {
    pub base_url: Option<String>,
    pub request_timeout_ms: Option<u64>,
    pub max_not_modified_retries: Option<u32>,
    pub retry_base_delay_ms: Option<u64>,
    pub retry_max_delay_ms: Option<u64>,
    pub max_escalations: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
    pub retry: RetryPolicy,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            retry: RetryPolicy::default(),
        }
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Result<Option<T>, AppError> {
    match env_value(name) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::InvalidConfig(format!("{name} is not a valid number: {raw}"))),
        None => Ok(None),
    }
}

impl BackendConfigArgs {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            base_url: env_value(ENV_API_URL),
            request_timeout_ms: env_parsed(ENV_REQUEST_TIMEOUT_MS)?,
            max_not_modified_retries: env_parsed(ENV_MAX_NOT_MODIFIED_RETRIES)?,
            ..Self::default()
        })
    }

    pub fn normalize(self) -> Result<BackendConfig, AppError> {
        let mut base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim()
            .to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(AppError::InvalidConfig(
                "baseUrl must start with http:// or https://".to_string(),
            ));
        }
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        let request_timeout_ms = self
            .request_timeout_ms
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS);
        if !(MIN_REQUEST_TIMEOUT_MS..=MAX_REQUEST_TIMEOUT_MS).contains(&request_timeout_ms) {
            return Err(AppError::InvalidConfig(format!(
                "requestTimeoutMs must be between {MIN_REQUEST_TIMEOUT_MS} and {MAX_REQUEST_TIMEOUT_MS}"
            )));
        }

        let max_not_modified_retries = self
            .max_not_modified_retries
            .unwrap_or(DEFAULT_MAX_NOT_MODIFIED_RETRIES);
        if max_not_modified_retries > MAX_NOT_MODIFIED_RETRIES {
            return Err(AppError::InvalidConfig(format!(
                "maxNotModifiedRetries must be at most {MAX_NOT_MODIFIED_RETRIES}"
            )));
        }

        let base_delay_ms = self
            .retry_base_delay_ms
            .unwrap_or(DEFAULT_RETRY_BASE_DELAY_MS);
        let max_delay_ms = self.retry_max_delay_ms.unwrap_or(DEFAULT_RETRY_MAX_DELAY_MS);
        if max_delay_ms > MAX_RETRY_DELAY_MS || base_delay_ms > max_delay_ms {
            return Err(AppError::InvalidConfig(format!(
                "retry delays must satisfy retryBaseDelayMs <= retryMaxDelayMs <= {MAX_RETRY_DELAY_MS}"
            )));
        }

        let max_escalations = self.max_escalations.unwrap_or(DEFAULT_MAX_ESCALATIONS);
        if !(MIN_ESCALATIONS..=MAX_ESCALATIONS).contains(&max_escalations) {
            return Err(AppError::InvalidConfig(format!(
                "maxEscalations must be between {MIN_ESCALATIONS} and {MAX_ESCALATIONS}"
            )));
        }

        Ok(BackendConfig {
            base_url,
            request_timeout_ms,
            retry: RetryPolicy {
                max_not_modified_retries,
                base_delay_ms,
                max_delay_ms,
                max_escalations,
            },
        })
    }
}

impl BackendConfig {
    pub fn from_env() -> Result<Self, AppError> {
        BackendConfigArgs::from_env()?.normalize()
    }
}
