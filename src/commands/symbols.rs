use crate::backend::endpoint::{Endpoint, Verb, SYMBOLS_LIST_PATH};
use crate::backend::pipeline::BackendPipeline;
use crate::backend::types::{BodyFields, QueryParams, SYMBOL_FIELD, TIME_DELTA_FIELD};
use crate::error::AppError;
use crate::market::chart::{update_chart_data, upsert_symbol_stats};
use crate::market::types::{
    validate_symbol, ChartData, ChartSeries, SymbolData, SymbolDataWire, SymbolStats,
    DEFAULT_TIME_DELTA,
};
use crate::state::DashboardState;
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LoadSymbolArgs {
    pub symbol: String,
    pub time_delta: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SymbolsListWire {
    Bare(Vec<String>),
    Wrapped { data: Vec<String> },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartsSnapshot {
    pub series: Vec<ChartSeries>,
    pub stats: Vec<SymbolStats>,
}

/// Fetches (creating on the backend if needed) one symbol and mirrors it into the charts.
///
/// A newer load of the same symbol cancels this one; a cancelled load leaves the
/// mirror untouched.
pub async fn load_symbol(
    state: &DashboardState,
    pipeline: &BackendPipeline,
    args: LoadSymbolArgs,
) -> Result<SymbolData, AppError> {
    let symbol = validate_symbol(&args.symbol)?;
    let time_delta = args
        .time_delta
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_TIME_DELTA.to_string());

    let mut query = QueryParams::new();
    query.insert(TIME_DELTA_FIELD.to_string(), time_delta);
    let mut body = BodyFields::new();
    body.insert(SYMBOL_FIELD.to_string(), Value::String(symbol.clone()));

    let handle = state.begin_symbol_load(&symbol);
    let outcome = pipeline
        .request(
            &Endpoint::Symbol(symbol.clone()).path(),
            Verb::Put,
            Some(handle.cancellation_token.clone()),
            Some(body),
            Some(query),
        )
        .await;
    state.finish_symbol_load(&symbol, handle.generation);

    // A cancel that lands after the chain resolved does not discard the result.
    if !outcome.is_ok() && handle.cancellation_token.is_cancelled() {
        return Err(AppError::Backend(format!("load of {symbol} was cancelled")));
    }

    let payload = outcome.into_result(&format!("symbol {symbol} request failed"))?;
    let wire: SymbolDataWire = serde_json::from_value(payload)?;
    let data = SymbolData::try_from(wire)?;

    update_chart_data(
        &mut state.charts.write(),
        &data.symbol,
        ChartData::Points(data.points.clone()),
    );
    if let Some(stats) = data.stats.clone() {
        upsert_symbol_stats(&mut state.stats.write(), stats);
    }

    tracing::debug!(symbol = %data.symbol, points = data.points.len(), "symbol mirrored");
    Ok(data)
}

/// Loads several symbols as independent concurrent calls, one result per symbol.
pub async fn load_symbols(
    state: &DashboardState,
    pipeline: &BackendPipeline,
    symbols: Vec<String>,
    time_delta: Option<String>,
) -> Vec<Result<SymbolData, AppError>> {
    let loads = symbols.into_iter().map(|symbol| {
        load_symbol(
            state,
            pipeline,
            LoadSymbolArgs {
                symbol,
                time_delta: time_delta.clone(),
            },
        )
    });
    join_all(loads).await
}

pub async fn list_symbols(pipeline: &BackendPipeline) -> Result<Vec<String>, AppError> {
    let payload = pipeline
        .request(SYMBOLS_LIST_PATH, Verb::Get, None, None, None)
        .await
        .into_result("symbols list request failed")?;
    let mut symbols = match serde_json::from_value::<SymbolsListWire>(payload)? {
        SymbolsListWire::Bare(symbols) => symbols,
        SymbolsListWire::Wrapped { data } => data,
    };

    symbols.sort_unstable();
    symbols.dedup();
    Ok(symbols)
}

pub fn cancel_symbol_load(state: &DashboardState, symbol: &str) -> bool {
    state.cancel_symbol_load(symbol)
}

pub fn charts_snapshot(state: &DashboardState) -> ChartsSnapshot {
    ChartsSnapshot {
        series: state.charts.read().clone(),
        stats: state.stats.read().clone(),
    }
}
