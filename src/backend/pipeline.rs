use crate::backend::endpoint::{symbol_id, Endpoint, Verb, SYMBOLS_PATH};
use crate::backend::notifier::{server_error_title, Notifier};
use crate::backend::transport::{ReqwestTransport, Transport};
use crate::backend::types::{
    BodyFields, PhysicalRequest, QueryParams, RequestOutcome, Severity, TransportResponse,
    HTTP_INTERNAL_SERVER_ERROR, HTTP_NOT_MODIFIED, HTTP_NO_CONTENT, HTTP_OK, SYMBOL_FIELD,
    TIME_DELTA_FIELD,
};
use crate::config::{BackendConfig, RetryPolicy};
use crate::error::AppError;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Current position of a logical call: what is about to be sent, and where.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub verb: Verb,
    pub path: String,
    pub body: Option<BodyFields>,
}

impl Step {
    pub fn new(verb: Verb, path: impl Into<String>, body: Option<BodyFields>) -> Self {
        Self {
            verb,
            path: path.into(),
            body,
        }
    }

    fn physical(&self, query: &QueryParams) -> PhysicalRequest {
        PhysicalRequest {
            verb: self.verb,
            path: self.path.clone(),
            query: query.clone(),
            body: self.body.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Failure {
    Cancelled,
    NotModified,
    ServerError(String),
    Other(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Done(Value),
    Next(Step),
    /// 304: the same logical `get` has to be asked again.
    Retry(Step),
    Fail(Failure),
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn symbol_value(body: Option<&BodyFields>) -> Option<String> {
    match body?.get(SYMBOL_FIELD)? {
        Value::String(symbol) => Some(symbol.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn unexpected(step: &Step, status: u16) -> Transition {
    Transition::Fail(Failure::Other(format!(
        "unexpected status {status} for {} {}",
        step.verb, step.path
    )))
}

/// Escalation rules of the backend, one response at a time.
pub fn transition(step: &Step, response: TransportResponse, query: &QueryParams) -> Transition {
    match response.status {
        HTTP_NOT_MODIFIED => return Transition::Retry(Step::new(Verb::Get, &step.path, None)),
        HTTP_INTERNAL_SERVER_ERROR => {
            return Transition::Fail(Failure::ServerError(server_error_title(
                response.body.as_ref(),
            )))
        }
        _ => {}
    }

    match step.verb {
        Verb::Get => match response.status {
            HTTP_OK if response.raw_text => Transition::Fail(Failure::Other(format!(
                "get {} answered with a non-JSON body",
                step.path
            ))),
            HTTP_OK => Transition::Done(response.body.unwrap_or(Value::Null)),
            // Missing resource: the backend creates it lazily on post.
            HTTP_NO_CONTENT => Transition::Next(Step::new(Verb::Post, &step.path, None)),
            status => unexpected(step, status),
        },
        // Post never echoes the created resource, so it is always read back.
        Verb::Post if is_success(response.status) => {
            match symbol_value(step.body.as_ref()) {
                Some(symbol) => Transition::Next(Step::new(
                    Verb::Get,
                    format!("{}/{symbol}", step.path),
                    None,
                )),
                None => Transition::Next(Step::new(Verb::Get, &step.path, None)),
            }
        }
        Verb::Post => unexpected(step, response.status),
        Verb::Put => match response.status {
            HTTP_OK => Transition::Next(Step::new(Verb::Get, &step.path, None)),
            HTTP_NO_CONTENT => match symbol_id(&step.path) {
                // Symbols are created on the collection, not on their own path.
                Some(id) => {
                    let mut body = BodyFields::new();
                    body.insert(SYMBOL_FIELD.to_string(), Value::String(id.to_string()));
                    if let Some(time_delta) = query.get(TIME_DELTA_FIELD) {
                        body.insert(
                            TIME_DELTA_FIELD.to_string(),
                            Value::String(time_delta.clone()),
                        );
                    }
                    Transition::Next(Step::new(Verb::Post, SYMBOLS_PATH, Some(body)))
                }
                None => Transition::Next(Step::new(Verb::Post, &step.path, None)),
            },
            status => unexpected(step, status),
        },
    }
}

/// Issues logical backend calls and resolves them to a [`RequestOutcome`].
///
/// Transport and notifier are injected; the pipeline holds no per-call state, so one
/// instance can serve any number of concurrent calls.
#[derive(Clone)]
pub struct BackendPipeline {
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn Notifier>,
    retry: RetryPolicy,
}

impl BackendPipeline {
    pub fn new(
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn Notifier>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            notifier,
            retry,
        }
    }

    pub fn from_config(
        config: &BackendConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, AppError> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::new(Arc::new(transport), notifier, config.retry))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Runs one logical call to completion.
    ///
    /// Without a `cancel` token a private one is used, so the caller cannot abort
    /// the chain later. Passing a token cancels every remaining escalation, not
    /// just the request in flight.
    pub async fn request(
        &self,
        endpoint: &str,
        verb: Verb,
        cancel: Option<CancellationToken>,
        body: Option<BodyFields>,
        query: Option<QueryParams>,
    ) -> RequestOutcome {
        let Some(resource) = Endpoint::parse(endpoint) else {
            tracing::warn!(endpoint, "rejected request to unknown endpoint");
            return RequestOutcome::Error;
        };
        if !resource.allows(verb) {
            tracing::warn!(endpoint, %verb, "rejected verb not served by endpoint");
            return RequestOutcome::Error;
        }

        let cancel = cancel.unwrap_or_default();
        let query = query.unwrap_or_default();
        let mut step = Step::new(verb, endpoint, body);
        let mut escalations = 0_u32;
        let mut not_modified_retries = 0_u32;

        loop {
            if cancel.is_cancelled() {
                return self.fail(&step, Failure::Cancelled);
            }

            tracing::debug!(verb = %step.verb, path = %step.path, "sending backend request");
            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => return self.fail(&step, Failure::Cancelled),
                response = self.transport.send(step.physical(&query)) => response,
            };
            let response = match response {
                Ok(response) => response,
                Err(error) => return self.fail(&step, Failure::Other(error.to_string())),
            };
            let status = response.status;

            match transition(&step, response, &query) {
                Transition::Done(data) => {
                    tracing::debug!(path = %step.path, status, "backend request resolved");
                    return RequestOutcome::ok(data);
                }
                Transition::Next(next) => {
                    escalations += 1;
                    if escalations > self.retry.max_escalations {
                        return self.fail(
                            &step,
                            Failure::Other(format!(
                                "gave up after {escalations} escalations"
                            )),
                        );
                    }
                    tracing::debug!(
                        from = %step.verb,
                        to = %next.verb,
                        path = %next.path,
                        status,
                        "escalating backend request"
                    );
                    step = next;
                }
                Transition::Retry(next) => {
                    if not_modified_retries >= self.retry.max_not_modified_retries {
                        return self.fail(&step, Failure::NotModified);
                    }
                    let delay_ms = self.retry.backoff_delay_ms(not_modified_retries);
                    not_modified_retries += 1;
                    tracing::debug!(
                        path = %next.path,
                        attempt = not_modified_retries,
                        delay_ms,
                        "not modified, retrying"
                    );
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return self.fail(&next, Failure::Cancelled),
                        _ = tokio::time::sleep(Duration::from_millis(delay_ms)) => {}
                    }
                    step = next;
                }
                Transition::Fail(failure) => return self.fail(&step, failure),
            }
        }
    }

    fn fail(&self, step: &Step, failure: Failure) -> RequestOutcome {
        match failure {
            Failure::Cancelled => {
                tracing::debug!(verb = %step.verb, path = %step.path, "backend request cancelled");
            }
            Failure::NotModified => {
                tracing::warn!(
                    path = %step.path,
                    retries = self.retry.max_not_modified_retries,
                    "backend kept answering not modified"
                );
            }
            Failure::ServerError(message) => {
                tracing::warn!(verb = %step.verb, path = %step.path, %message, "backend server error");
                self.notifier.show(&message, Severity::Error);
            }
            Failure::Other(reason) => {
                tracing::warn!(verb = %step.verb, path = %step.path, %reason, "backend request failed");
            }
        }
        RequestOutcome::Error
    }
}
