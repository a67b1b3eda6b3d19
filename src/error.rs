use serde::ser::Serializer;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("request error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("json decode error: {0}")]
    SimdJson(#[from] simd_json::Error),
    #[error("payload decode error: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("backend request failed: {0}")]
    Backend(String),
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
