use crate::market::types::is_symbol_char;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MARKET_PATH: &str = "market";
pub const SYMBOLS_PATH: &str = "symbols";
pub const SYMBOLS_LIST_PATH: &str = "symbols-list";

const SYMBOL_PREFIX: &str = "symbols/";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    Get,
    Post,
    Put,
}

impl Verb {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of resources exposed by the dashboard backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Market,
    Symbols,
    Symbol(String),
    SymbolsList,
}

impl Endpoint {
    pub fn parse(path: &str) -> Option<Self> {
        match path {
            MARKET_PATH => Some(Self::Market),
            SYMBOLS_PATH => Some(Self::Symbols),
            SYMBOLS_LIST_PATH => Some(Self::SymbolsList),
            _ => {
                let id = path.strip_prefix(SYMBOL_PREFIX)?;
                // Anything else would alter the URL once joined (`?`, `#`, `/`, spaces).
                if id.is_empty() || !id.chars().all(is_symbol_char) {
                    None
                } else {
                    Some(Self::Symbol(id.to_string()))
                }
            }
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::Market => MARKET_PATH.to_string(),
            Self::Symbols => SYMBOLS_PATH.to_string(),
            Self::Symbol(id) => format!("{SYMBOL_PREFIX}{id}"),
            Self::SymbolsList => SYMBOLS_LIST_PATH.to_string(),
        }
    }

    /// Verbs a caller may start a logical call with. Escalations are not limited by this.
    pub fn allowed_verbs(&self) -> &'static [Verb] {
        match self {
            Self::Market => &[Verb::Get, Verb::Put],
            Self::Symbols => &[Verb::Get, Verb::Post],
            Self::Symbol(_) => &[Verb::Get, Verb::Put],
            Self::SymbolsList => &[Verb::Get],
        }
    }

    pub fn allows(&self, verb: Verb) -> bool {
        self.allowed_verbs().contains(&verb)
    }
}

/// Id of an id-qualified `symbols/{id}` path, matched on the raw string.
pub fn symbol_id(path: &str) -> Option<&str> {
    path.strip_prefix(SYMBOL_PREFIX)
}
