use crate::backend::endpoint::{Verb, MARKET_PATH};
use crate::backend::pipeline::BackendPipeline;
use crate::error::AppError;
use crate::market::clock::{format_countdown, offset_market_time};
use crate::market::types::{MarketStateEnvelope, MarketStatus};
use crate::state::DashboardState;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MarketCountdown {
    pub exchange: String,
    pub is_market_open: bool,
    pub remaining: String,
}

impl MarketCountdown {
    pub fn from_status(status: &MarketStatus) -> Self {
        Self {
            exchange: status.exchange.clone(),
            is_market_open: status.is_market_open,
            remaining: format_countdown(status.remaining_ms()),
        }
    }
}

/// Replaces the market mirror with the backend's current view.
pub async fn refresh_market(
    state: &DashboardState,
    pipeline: &BackendPipeline,
    cancel: Option<CancellationToken>,
) -> Result<Vec<MarketStatus>, AppError> {
    let payload = pipeline
        .request(MARKET_PATH, Verb::Get, cancel, None, None)
        .await
        .into_result("market state request failed")?;
    let envelope: MarketStateEnvelope = serde_json::from_value(payload)?;
    let markets: Vec<MarketStatus> = envelope.try_into()?;

    *state.markets.write() = markets.clone();
    tracing::debug!(count = markets.len(), "market mirror refreshed");
    Ok(markets)
}

pub fn advance_market_clock(state: &DashboardState, elapsed_ms: i64) -> Vec<MarketCountdown> {
    let mut markets = state.markets.write();
    offset_market_time(&mut markets, elapsed_ms)
        .iter()
        .map(MarketCountdown::from_status)
        .collect()
}

pub fn market_countdowns(state: &DashboardState) -> Vec<MarketCountdown> {
    state
        .markets
        .read()
        .iter()
        .map(MarketCountdown::from_status)
        .collect()
}
