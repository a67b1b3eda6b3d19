pub mod endpoint;
pub mod notifier;
pub mod pipeline;
#[cfg(test)]
pub(crate) mod testing;
pub mod transport;
pub mod types;

pub use endpoint::{Endpoint, Verb};
pub use notifier::{ChannelNotifier, Notifier, TracingNotifier};
pub use pipeline::BackendPipeline;
pub use transport::{ReqwestTransport, Transport};
pub use types::{BodyFields, Notification, QueryParams, RequestOutcome, Severity};
