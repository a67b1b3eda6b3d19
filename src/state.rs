use crate::market::types::{ChartSeries, MarketStatus, SymbolStats};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

pub struct SymbolLoadHandle {
    pub generation: u64,
    pub cancellation_token: CancellationToken,
}

/// Client-side mirror of what the backend last reported.
pub struct DashboardState {
    pub started_at: Instant,
    pub markets: RwLock<Vec<MarketStatus>>,
    pub charts: RwLock<Vec<ChartSeries>>,
    pub stats: RwLock<Vec<SymbolStats>>,
    pub symbol_loads: Mutex<HashMap<String, SymbolLoadHandle>>,
    next_generation: AtomicU64,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardState {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            markets: RwLock::new(Vec::new()),
            charts: RwLock::new(Vec::new()),
            stats: RwLock::new(Vec::new()),
            symbol_loads: Mutex::new(HashMap::new()),
            next_generation: AtomicU64::new(1),
        }
    }

    /// Registers a fresh token for `symbol`, cancelling the load it replaces.
    pub fn begin_symbol_load(&self, symbol: &str) -> SymbolLoadHandle {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let cancellation_token = CancellationToken::new();
        let previous = self.symbol_loads.lock().insert(
            symbol.to_string(),
            SymbolLoadHandle {
                generation,
                cancellation_token: cancellation_token.clone(),
            },
        );
        if let Some(handle) = previous {
            handle.cancellation_token.cancel();
        }

        SymbolLoadHandle {
            generation,
            cancellation_token,
        }
    }

    /// Drops the registration for `symbol` unless a newer load replaced it.
    pub fn finish_symbol_load(&self, symbol: &str, generation: u64) {
        let mut loads = self.symbol_loads.lock();
        if loads
            .get(symbol)
            .is_some_and(|handle| handle.generation == generation)
        {
            loads.remove(symbol);
        }
    }

    pub fn cancel_symbol_load(&self, symbol: &str) -> bool {
        match self.symbol_loads.lock().remove(symbol) {
            Some(handle) => {
                handle.cancellation_token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn pending_symbol_loads(&self) -> usize {
        self.symbol_loads.lock().len()
    }
}
