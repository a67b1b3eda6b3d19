use crate::backend::endpoint::Verb;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

pub type QueryParams = BTreeMap<String, String>;
pub type BodyFields = Map<String, Value>;

pub const HTTP_OK: u16 = 200;
pub const HTTP_NO_CONTENT: u16 = 204;
pub const HTTP_NOT_MODIFIED: u16 = 304;
pub const HTTP_INTERNAL_SERVER_ERROR: u16 = 500;

pub const SYMBOL_FIELD: &str = "symbol";
pub const TIME_DELTA_FIELD: &str = "timeDelta";

/// The only thing a logical call ever hands back to its caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RequestOutcome {
    Ok { data: Value },
    Error,
}

impl RequestOutcome {
    pub fn ok(data: Value) -> Self {
        Self::Ok { data }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    pub fn into_data(self) -> Option<Value> {
        match self {
            Self::Ok { data } => Some(data),
            Self::Error => None,
        }
    }

    pub fn into_result(self, context: &str) -> Result<Value, AppError> {
        self.into_data()
            .ok_or_else(|| AppError::Backend(context.to_string()))
    }
}

/// One HTTP exchange as issued by the pipeline, relative to the configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalRequest {
    pub verb: Verb,
    pub path: String,
    pub query: QueryParams,
    pub body: Option<BodyFields>,
}

/// A physical response. `raw_text` marks a body that was not JSON and is kept
/// verbatim as a string.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Option<Value>,
    pub raw_text: bool,
}

impl TransportResponse {
    pub fn new(status: u16, body: Option<Value>) -> Self {
        Self {
            status,
            body,
            raw_text: false,
        }
    }

    pub fn empty(status: u16) -> Self {
        Self::new(status, None)
    }

    pub fn text(status: u16, text: impl Into<String>) -> Self {
        Self {
            status,
            body: Some(Value::String(text.into())),
            raw_text: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(value: reqwest::Error) -> Self {
        Self::Network(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub title: String,
    pub severity: Severity,
}
