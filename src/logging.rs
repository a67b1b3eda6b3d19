use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_FILTER: &str = "market_dashboard_lib=info";

/// Installs a compact fmt subscriber honouring `RUST_LOG`.
///
/// Returns `false` when a global subscriber was already installed, which is the
/// normal case when the host shell configures tracing itself.
pub fn init_tracing(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .try_init()
        .is_ok()
}
