use crate::error::AppError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TIME_DELTA: &str = "4h";
pub const MAX_SYMBOL_LEN: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MarketStatus {
    pub exchange: String,
    pub is_market_open: bool,
    pub time_to_close: i64,
    pub time_to_open: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_after_open: Option<i64>,
    /// When the backend last polled the exchange, epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_check: Option<i64>,
}

impl MarketStatus {
    pub fn new(exchange: &str, is_market_open: bool, time_to_close: i64, time_to_open: i64) -> Self {
        Self {
            exchange: exchange.to_string(),
            is_market_open,
            time_to_close,
            time_to_open,
            country: None,
            time_after_open: None,
            date_check: None,
        }
    }

    /// The countdown currently running: time to close while open, time to open otherwise.
    pub fn remaining_ms(&self) -> i64 {
        if self.is_market_open {
            self.time_to_close
        } else {
            self.time_to_open
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Ok,
    Ko,
}

/// Body of the `market` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketStateEnvelope {
    pub status: EnvelopeStatus,
    #[serde(default)]
    pub data: Option<Vec<MarketStatus>>,
}

impl TryFrom<MarketStateEnvelope> for Vec<MarketStatus> {
    type Error = AppError;

    fn try_from(value: MarketStateEnvelope) -> Result<Self, Self::Error> {
        match (value.status, value.data) {
            (EnvelopeStatus::Ok, Some(markets)) => Ok(markets),
            (EnvelopeStatus::Ok, None) => Err(AppError::Backend(
                "market payload reported ok without data".to_string(),
            )),
            (EnvelopeStatus::Ko, _) => Err(AppError::Backend(
                "market state is unavailable upstream".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ChartData {
    Value(f64),
    Points(Vec<[f64; 2]>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartSeries {
    pub name: String,
    pub data: ChartData,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SymbolStats {
    pub symbol: String,
    pub cumulative_return: Option<f64>,
    pub annualized_cumulative_return: Option<f64>,
    pub annualized_volatility: Option<f64>,
}

/// Body of the `symbols/{id}` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SymbolDataWire {
    pub symbol: String,
    #[serde(default)]
    pub data: Option<Vec<(f64, Option<f64>)>>,
    #[serde(default)]
    pub stats: Option<SymbolStats>,
    pub status: EnvelopeStatus,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SymbolData {
    pub symbol: String,
    pub points: Vec<[f64; 2]>,
    pub stats: Option<SymbolStats>,
}

impl TryFrom<SymbolDataWire> for SymbolData {
    type Error = AppError;

    fn try_from(value: SymbolDataWire) -> Result<Self, Self::Error> {
        if value.status == EnvelopeStatus::Ko {
            return Err(AppError::Backend(format!(
                "no data available for symbol {}",
                value.symbol
            )));
        }

        // Gaps come back as null values; they are skipped rather than plotted at zero.
        let points = value
            .data
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(t, v)| v.map(|v| [t, v]))
            .filter(|[t, v]| t.is_finite() && v.is_finite())
            .collect();

        Ok(Self {
            symbol: value.symbol,
            points,
            stats: value.stats,
        })
    }
}

pub fn is_symbol_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | ':')
}

pub fn validate_symbol(raw: &str) -> Result<String, AppError> {
    let symbol = raw.trim();
    if symbol.is_empty() || symbol.len() > MAX_SYMBOL_LEN || !symbol.chars().all(is_symbol_char) {
        return Err(AppError::InvalidArgument(format!(
            "symbol must be 1-{MAX_SYMBOL_LEN} ASCII characters from [A-Za-z0-9.-:]"
        )));
    }
    Ok(symbol.to_string())
}
