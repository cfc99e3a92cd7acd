//! Running simulation totals
//!
//! Every field is a plain sum (or a max), so accumulators from different
//! workers or different runs combine by field-wise addition in any order.
//! The struct is serde-serializable so a finished run can be saved and
//! resumed later.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sl_engine::{GameDefinition, SessionResult};

/// Per-trial sums for one worker, one run, or many merged runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Accumulator {
    pub total_trials: u64,
    pub total_bet: f64,
    pub total_payout: f64,
    pub base_payout: f64,
    pub bonus_payout: f64,
    /// Trials whose opening spin awarded a bonus
    pub bonus_triggers: u64,
    /// Trials that paid anything
    pub winning_trials: u64,
    /// Σ (trial payout / bet)²
    pub sum_squared_multipliers: f64,
    pub symbol_payouts: BTreeMap<String, f64>,
    pub free_spins_played: u64,
    pub max_multiplier: f64,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty accumulator with a zero entry for every base symbol
    pub fn for_game(game: &GameDefinition) -> Self {
        Self {
            symbol_payouts: game.symbol_names().into_iter().map(|n| (n, 0.0)).collect(),
            ..Self::default()
        }
    }

    /// Fold one finished trial
    pub fn record(&mut self, session: &SessionResult) {
        self.total_trials += 1;
        self.total_bet += session.bet;
        self.total_payout += session.total;
        self.base_payout += session.base;
        self.bonus_payout += session.bonus;
        self.free_spins_played += u64::from(session.free_spins_played);

        if session.total > 0.0 {
            self.winning_trials += 1;
        }
        if session.bonus_triggered.is_some() {
            self.bonus_triggers += 1;
        }

        let multiplier = session.multiplier();
        self.sum_squared_multipliers += multiplier * multiplier;
        self.max_multiplier = self.max_multiplier.max(multiplier);

        for (symbol, payout) in &session.wins_by_symbol {
            *self.symbol_payouts.entry(symbol.clone()).or_insert(0.0) += payout;
        }
    }

    /// Add another accumulator's totals into this one
    pub fn merge(&mut self, other: &Accumulator) {
        self.total_trials += other.total_trials;
        self.total_bet += other.total_bet;
        self.total_payout += other.total_payout;
        self.base_payout += other.base_payout;
        self.bonus_payout += other.bonus_payout;
        self.bonus_triggers += other.bonus_triggers;
        self.winning_trials += other.winning_trials;
        self.sum_squared_multipliers += other.sum_squared_multipliers;
        self.free_spins_played += other.free_spins_played;
        self.max_multiplier = self.max_multiplier.max(other.max_multiplier);

        for (symbol, payout) in &other.symbol_payouts {
            *self.symbol_payouts.entry(symbol.clone()).or_insert(0.0) += payout;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_trials == 0
    }
}
