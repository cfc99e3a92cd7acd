//! Spin wins, spin outcomes and serializable spin records

use serde::{Deserialize, Serialize};

use crate::model::GameMode;
use crate::paytable::BonusTrigger;
use crate::symbols::SymbolTable;
use crate::window::{Position, SymbolWindow, WindowCell};

/// Win classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinKind {
    Line,
    Scatter,
    BonusCollection,
}

/// A symbol that contributed to a win: its name plus an optional drawn value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinSymbol {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<u32>,
}

impl WinSymbol {
    pub fn from_cell(cell: &WindowCell, symbols: &SymbolTable) -> Self {
        Self {
            name: symbols.name(cell.symbol).to_string(),
            value: cell.value,
        }
    }
}

/// A single win record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinWin {
    #[serde(rename = "type")]
    pub kind: WinKind,
    /// Name of the symbol whose rule paid
    pub symbol: String,
    pub symbols: Vec<WinSymbol>,
    /// Payout in bet currency
    pub payout: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positions: Option<Vec<Position>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggers: Option<BonusTrigger>,
}

/// Everything one spin produced
#[derive(Debug, Clone)]
pub struct SpinOutcome {
    /// Mode the spin was played in
    pub mode: GameMode,
    pub window: SymbolWindow,
    pub wins: Vec<SpinWin>,
    /// Sum of all win payouts
    pub payout: f64,
    /// Bonus award produced by this spin
    pub trigger: Option<BonusTrigger>,
    /// Free spins left after this spin's state transition
    pub remaining_free_spins: u32,
}

impl SpinOutcome {
    pub fn is_win(&self) -> bool {
        self.payout > 0.0
    }

    pub fn payout_of(&self, kind: WinKind) -> f64 {
        self.wins
            .iter()
            .filter(|w| w.kind == kind)
            .map(|w| w.payout)
            .sum()
    }
}

/// Bonus award as shown in spin records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRecord {
    pub name: String,
    pub spins_awarded: u32,
}

/// Serializable per-spin record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinRecord {
    pub state: GameMode,
    /// Symbol labels, row by row
    pub window: Vec<Vec<String>>,
    pub payout: f64,
    pub wins: Vec<SpinWin>,
    pub bonus_triggered: Option<TriggerRecord>,
}

impl SpinRecord {
    pub fn from_outcome(outcome: &SpinOutcome, symbols: &SymbolTable) -> Self {
        Self {
            state: outcome.mode,
            window: outcome.window.labels(symbols),
            payout: outcome.payout,
            wins: outcome.wins.clone(),
            bonus_triggered: outcome.trigger.as_ref().map(|t| TriggerRecord {
                name: t.name.clone(),
                spins_awarded: t.count,
            }),
        }
    }
}
