pub mod backend;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod market;
pub mod state;

pub use backend::{
    BackendPipeline, ChannelNotifier, Notifier, RequestOutcome, Severity, TracingNotifier, Verb,
};
pub use config::{BackendConfig, BackendConfigArgs, RetryPolicy};
pub use error::AppError;
pub use market::chart::update_chart_data;
pub use market::clock::{format_countdown, offset_market_time};
pub use state::DashboardState;
