use crate::backend::endpoint::Verb;
use crate::backend::notifier::Notifier;
use crate::backend::transport::Transport;
use crate::backend::types::{
    Notification, PhysicalRequest, Severity, TransportError, TransportResponse,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub enum Scripted {
    Respond(TransportResponse),
    NetworkError,
    Hang,
    CancelThenRespond(CancellationToken, TransportResponse),
    /// Runs the hook once the request has been received, then answers.
    AfterHook(Box<dyn FnOnce() + Send>, TransportResponse),
}

impl Scripted {
    pub fn respond(status: u16, body: Option<Value>) -> Self {
        Self::Respond(TransportResponse::new(status, body))
    }

    pub fn network_error() -> Self {
        Self::NetworkError
    }

    pub fn cancel_then_respond(token: CancellationToken, status: u16, body: Option<Value>) -> Self {
        Self::CancelThenRespond(token, TransportResponse::new(status, body))
    }

    pub fn after_hook(hook: impl FnOnce() + Send + 'static, status: u16, body: Option<Value>) -> Self {
        Self::AfterHook(Box::new(hook), TransportResponse::new(status, body))
    }
}

/// Replays scripted answers and records what was asked.
///
/// Answers registered for a specific verb and path take precedence over the
/// shared in-order script.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    routes: Mutex<HashMap<(Verb, String), VecDeque<Scripted>>>,
    requests: Mutex<Vec<PhysicalRequest>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Self::default()
        }
    }

    pub fn with_route(self, verb: Verb, path: &str, answers: Vec<Scripted>) -> Self {
        self.routes
            .lock()
            .insert((verb, path.to_string()), answers.into());
        self
    }

    pub fn requests(&self) -> Vec<PhysicalRequest> {
        self.requests.lock().clone()
    }

    pub async fn wait_for_requests(&self, count: usize) {
        while self.requests.lock().len() < count {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: PhysicalRequest) -> Result<TransportResponse, TransportError> {
        let routed = self
            .routes
            .lock()
            .get_mut(&(request.verb, request.path.clone()))
            .and_then(VecDeque::pop_front);
        self.requests.lock().push(request);
        let next = routed.or_else(|| self.script.lock().pop_front());
        match next {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::NetworkError) => {
                Err(TransportError::Network("connection refused".to_string()))
            }
            Some(Scripted::Hang) => futures_util::future::pending().await,
            Some(Scripted::CancelThenRespond(token, response)) => {
                token.cancel();
                Ok(response)
            }
            Some(Scripted::AfterHook(hook, response)) => {
                hook();
                Ok(response)
            }
            None => Err(TransportError::Network("script exhausted".to_string())),
        }
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn show(&self, title: &str, severity: Severity) {
        self.notifications.lock().push(Notification {
            title: title.to_string(),
            severity,
        });
    }
}
