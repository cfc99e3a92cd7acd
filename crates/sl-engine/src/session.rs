//! Session accumulation: one base spin plus its chained free spins

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{GameDefinition, GameMode};
use crate::paytable::BonusTrigger;
use crate::spin::{SpinOutcome, SpinRecord};
use crate::symbols::SymbolTable;

/// Session switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOptions {
    /// Keep a [`SpinRecord`] for every spin
    pub record_spins: bool,
}

impl SessionOptions {
    pub fn recorded() -> Self {
        Self { record_spins: true }
    }
}

/// Result of one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub bet: f64,
    /// Base + bonus
    pub total: f64,
    /// Won in base mode
    pub base: f64,
    /// Won in free spins
    pub bonus: f64,
    /// Empty unless spins were recorded
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_spins: Vec<SpinRecord>,
    /// Payout per paying symbol name
    pub wins_by_symbol: BTreeMap<String, f64>,
    pub free_spins_played: u32,
    /// Award produced by the opening spin
    pub bonus_triggered: Option<BonusTrigger>,
    /// Spins played, opening spin included
    pub spins: u32,
    /// Stopped by the session spin bound
    pub truncated: bool,
}

impl SessionResult {
    /// Total payout as a multiple of bet
    pub fn multiplier(&self) -> f64 {
        if self.bet > 0.0 {
            self.total / self.bet
        } else {
            0.0
        }
    }
}

/// Running totals threaded through each spin of a session
#[derive(Debug, Clone)]
pub struct SessionAccumulator {
    options: SessionOptions,
    result: SessionResult,
}

impl SessionAccumulator {
    pub fn new(bet: f64, game: &GameDefinition, options: SessionOptions) -> Self {
        let wins_by_symbol = game.symbol_names().into_iter().map(|n| (n, 0.0)).collect();
        Self {
            options,
            result: SessionResult {
                bet,
                wins_by_symbol,
                ..SessionResult::default()
            },
        }
    }

    /// Fold one spin into the totals
    pub fn record(&mut self, outcome: &SpinOutcome, symbols: &SymbolTable) {
        let result = &mut self.result;
        if result.spins == 0 {
            result.bonus_triggered = outcome.trigger.clone();
        }
        result.spins += 1;

        match outcome.mode {
            GameMode::Base => result.base += outcome.payout,
            GameMode::FreeSpins => {
                result.bonus += outcome.payout;
                result.free_spins_played += 1;
            }
        }
        result.total += outcome.payout;

        for win in &outcome.wins {
            *result.wins_by_symbol.entry(win.symbol.clone()).or_insert(0.0) += win.payout;
        }

        if self.options.record_spins {
            result.all_spins.push(SpinRecord::from_outcome(outcome, symbols));
        }
    }

    pub fn spins(&self) -> u32 {
        self.result.spins
    }

    pub fn mark_truncated(&mut self) {
        self.result.truncated = true;
    }

    pub fn finish(self) -> SessionResult {
        self.result
    }
}
