use crate::backend::types::{Notification, Severity};
use serde_json::Value;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

pub const DEFAULT_SERVER_ERROR_TITLE: &str = "Internal server error";

/// User-facing notification sink, injected into the pipeline.
pub trait Notifier: Send + Sync {
    fn show(&self, title: &str, severity: Severity);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn show(&self, title: &str, severity: Severity) {
        match severity {
            Severity::Info => tracing::info!(target: "notification", "{title}"),
            Severity::Warning => tracing::warn!(target: "notification", "{title}"),
            Severity::Error => tracing::error!(target: "notification", "{title}"),
        }
    }
}

/// Forwards notifications to whoever drains the paired receiver (usually the UI shell).
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, UnboundedReceiver<Notification>) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Notifier for ChannelNotifier {
    fn show(&self, title: &str, severity: Severity) {
        let notification = Notification {
            title: title.to_string(),
            severity,
        };
        if let Err(error) = self.sender.send(notification) {
            tracing::warn!("notification dropped, receiver closed: {}", error.0.title);
        }
    }
}

/// Picks the message the backend attached to a server error.
pub fn server_error_title(body: Option<&Value>) -> String {
    let message = match body {
        Some(Value::Object(fields)) => fields
            .get("message")
            .or_else(|| fields.get("error"))
            .and_then(Value::as_str),
        Some(Value::String(text)) => Some(text.as_str()),
        _ => None,
    };

    message
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .unwrap_or(DEFAULT_SERVER_ERROR_TITLE)
        .to_string()
}
