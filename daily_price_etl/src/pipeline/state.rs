use std::fmt;

use serde::Serialize;

/// Where a symbol is in its run.
///
/// ```text
/// pending ─► fetching ─► loaded
///               │  ▲
///               ▼  │
///             retrying
///               │
/// fetching ─────┴──► failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolState {
    Pending,
    Fetching,
    Loaded,
    Retrying,
    Failed,
}

impl SymbolState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolState::Pending => "pending",
            SymbolState::Fetching => "fetching",
            SymbolState::Loaded => "loaded",
            SymbolState::Retrying => "retrying",
            SymbolState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SymbolState::Loaded | SymbolState::Failed)
    }

    pub fn can_transition_to(&self, next: SymbolState) -> bool {
        use SymbolState::*;
        matches!(
            (self, next),
            (Pending, Fetching)
                | (Fetching, Loaded)
                | (Fetching, Retrying)
                | (Fetching, Failed)
                | (Retrying, Fetching)
        )
    }
}

impl fmt::Display for SymbolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
