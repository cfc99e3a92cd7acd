//! Slot Engine: reel selection, window generation, evaluation and the
//! base/free-spins state machine

use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::model::{GameDefinition, GameMode, ModeDefinition};
use crate::paytable::{BonusTrigger, WildLineRule};
use crate::session::{SessionAccumulator, SessionOptions, SessionResult};
use crate::spin::{SpinOutcome, SpinWin, WinKind, WinSymbol};
use crate::window::{SymbolWindow, WindowCell};

/// Default bound on chained spins in one session
pub const DEFAULT_MAX_SESSION_SPINS: u32 = 10_000;

/// Engine behavior switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// How lines starting with a wild are anchored
    #[serde(default)]
    pub wild_line_rule: WildLineRule,
    /// Maximum spins in one chained session
    #[serde(default = "default_max_session_spins")]
    pub max_session_spins: u32,
}

fn default_max_session_spins() -> u32 {
    DEFAULT_MAX_SESSION_SPINS
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            wild_line_rule: WildLineRule::default(),
            max_session_spins: DEFAULT_MAX_SESSION_SPINS,
        }
    }
}

/// Mutable engine state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    pub mode: GameMode,
    /// Only meaningful in free spins
    pub remaining_free_spins: u32,
    /// Wins accumulated during the current free-spins round
    pub feature_win: f64,
    /// Spins played since construction or last reset
    pub spins_played: u64,
}

/// Wins of one evaluated window, scaled by bet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    pub wins: Vec<SpinWin>,
    pub payout: f64,
    /// Largest bonus award among triggering scatter rules
    pub trigger: Option<BonusTrigger>,
}

/// Slot Engine
///
/// Owns its RNG and state; the game definition is shared read-only, so any
/// number of engines can run against one loaded game.
pub struct SlotEngine {
    game: Arc<GameDefinition>,
    options: EngineOptions,
    state: EngineState,
    rng: ChaCha8Rng,
}

impl SlotEngine {
    /// Create an engine seeded from OS entropy
    pub fn new(game: Arc<GameDefinition>) -> Self {
        Self::with_rng(game, ChaCha8Rng::from_os_rng())
    }

    /// Create with a specific RNG (deterministic runs, per-worker streams)
    pub fn with_rng(game: Arc<GameDefinition>, rng: ChaCha8Rng) -> Self {
        Self {
            game,
            options: EngineOptions::default(),
            state: EngineState::default(),
            rng,
        }
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Reseed the RNG
    pub fn seed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    pub fn game(&self) -> &Arc<GameDefinition> {
        &self.game
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn mode(&self) -> GameMode {
        self.state.mode
    }

    pub fn in_free_spins(&self) -> bool {
        self.state.mode == GameMode::FreeSpins
    }

    pub fn remaining_free_spins(&self) -> u32 {
        self.state.remaining_free_spins
    }

    /// Definition the next spin will use
    pub fn active_mode(&self) -> &ModeDefinition {
        self.game.mode(self.state.mode)
    }

    /// Back to base mode with an empty feature round
    pub fn reset(&mut self) {
        self.state = EngineState {
            spins_played: self.state.spins_played,
            ..EngineState::default()
        };
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // WINDOW GENERATION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Choose a reel set for the active mode and read one window from it
    pub fn generate_window(&mut self) -> SymbolWindow {
        let game = Arc::clone(&self.game);
        let def = game.mode(self.state.mode);
        let tag = self.state.mode == GameMode::FreeSpins && def.collection.tags_values();

        let set = def.reel_sets.choose(&mut self.rng);
        let mut window = SymbolWindow::new(set.width(), def.window_height);
        for (col, reel) in set.reels().iter().enumerate() {
            let stop = reel.random_stop(&mut self.rng);
            for (row, symbol) in reel.window(stop, def.window_height).enumerate() {
                let mut cell = WindowCell::new(symbol);
                if tag {
                    cell = def.collection.tag(cell, &mut self.rng);
                }
                window.set(row, col, cell);
            }
        }
        window
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // EVALUATION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Evaluate a window against the active mode.
    ///
    /// Line payouts are `rule * bet / active_lines`; scatter and collection
    /// payouts are `rule * bet`. Collection is only evaluated in free spins.
    pub fn scan_window(&self, window: &SymbolWindow, bet: f64) -> Evaluation {
        let mode = self.state.mode;
        let def = self.game.mode(mode);
        let symbols = &def.symbols;
        let mut eval = Evaluation::default();

        let lines = def.line_count().max(1) as f64;
        for payline in &def.paylines {
            let cells = payline.cells(window);
            let Some(hit) = def
                .paytable
                .evaluate_line(&cells, symbols, self.options.wild_line_rule)
            else {
                continue;
            };
            let payout = hit.payout * bet / lines;
            eval.payout += payout;
            eval.wins.push(SpinWin {
                kind: WinKind::Line,
                symbol: symbols.name(hit.symbol).to_string(),
                symbols: hit
                    .cells
                    .iter()
                    .map(|(_, c)| WinSymbol::from_cell(c, symbols))
                    .collect(),
                payout,
                positions: Some(hit.cells.iter().map(|(p, _)| *p).collect()),
                line_index: Some(payline.index),
                triggers: None,
            });
        }

        for hit in def.paytable.evaluate_scatters(window, symbols) {
            let payout = hit.payout * bet;
            eval.payout += payout;

            if let Some(trigger) = hit.triggers.as_ref().filter(|t| t.count > 0) {
                let larger = eval
                    .trigger
                    .as_ref()
                    .is_none_or(|current| trigger.count > current.count);
                if larger {
                    eval.trigger = Some(trigger.clone());
                }
            }

            let name = symbols.name(hit.symbol);
            eval.wins.push(SpinWin {
                kind: WinKind::Scatter,
                symbol: name.to_string(),
                symbols: vec![
                    WinSymbol {
                        name: name.to_string(),
                        value: None,
                    };
                    hit.count
                ],
                payout,
                positions: Some(hit.positions),
                line_index: None,
                triggers: hit.triggers,
            });
        }

        if mode == GameMode::FreeSpins {
            if let Some(hit) = def.collection.evaluate(window) {
                let payout = hit.total as f64 * bet;
                let name = symbols.name(hit.symbol);
                eval.payout += payout;
                eval.wins.push(SpinWin {
                    kind: WinKind::BonusCollection,
                    symbol: name.to_string(),
                    symbols: hit
                        .cells
                        .iter()
                        .map(|(_, v)| WinSymbol {
                            name: name.to_string(),
                            value: Some(*v),
                        })
                        .collect(),
                    payout,
                    positions: Some(hit.cells.iter().map(|(p, _)| *p).collect()),
                    line_index: None,
                    triggers: None,
                });
            }
        }

        eval
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SPIN & STATE MACHINE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Play one spin in the current mode and apply the state transition
    pub fn spin(&mut self, bet: f64) -> SpinOutcome {
        let mode = self.state.mode;
        let window = self.generate_window();
        let eval = self.scan_window(&window, bet);

        self.state.spins_played += 1;
        self.transition(mode, eval.payout, eval.trigger.as_ref());

        SpinOutcome {
            mode,
            window,
            wins: eval.wins,
            payout: eval.payout,
            trigger: eval.trigger,
            remaining_free_spins: self.state.remaining_free_spins,
        }
    }

    fn transition(&mut self, mode: GameMode, payout: f64, trigger: Option<&BonusTrigger>) {
        match mode {
            GameMode::Base => {
                let Some(trigger) = trigger else {
                    return;
                };
                if !self.game.has_freespins() {
                    return;
                }
                self.state.mode = GameMode::FreeSpins;
                self.state.remaining_free_spins = trigger.count;
                self.state.feature_win = 0.0;
                log::debug!("'{}' awarded {} free spins", trigger.name, trigger.count);
            }
            GameMode::FreeSpins => {
                self.state.feature_win += payout;
                self.state.remaining_free_spins = self.state.remaining_free_spins.saturating_sub(1);

                if let Some(trigger) = trigger {
                    log::debug!(
                        "'{}' retriggered: {} remaining -> {}",
                        trigger.name,
                        self.state.remaining_free_spins,
                        trigger.count
                    );
                    self.state.remaining_free_spins = trigger.count;
                }

                if self.state.remaining_free_spins == 0 {
                    log::debug!("Free spins finished, feature win {:.2}", self.state.feature_win);
                    self.state.mode = GameMode::Base;
                }
            }
        }
    }

    /// Force the engine back to base mode, abandoning any feature round
    fn end_feature(&mut self) {
        self.state.mode = GameMode::Base;
        self.state.remaining_free_spins = 0;
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SESSION
    // ═══════════════════════════════════════════════════════════════════════════

    /// One base spin, then free spins until the round is over.
    ///
    /// The chain is bounded by `max_session_spins`; hitting the bound ends the
    /// round and marks the result truncated.
    pub fn play_session(&mut self, bet: f64, options: SessionOptions) -> SessionResult {
        let game = Arc::clone(&self.game);
        let mut session = SessionAccumulator::new(bet, &game, options);

        let first = self.spin(bet);
        session.record(&first, &game.mode(first.mode).symbols);

        while self.in_free_spins() && self.state.remaining_free_spins > 0 {
            if session.spins() >= self.options.max_session_spins {
                log::warn!(
                    "Session stopped after {} spins with {} free spins left",
                    session.spins(),
                    self.state.remaining_free_spins
                );
                self.end_feature();
                session.mark_truncated();
                break;
            }
            let outcome = self.spin(bet);
            session.record(&outcome, &game.mode(outcome.mode).symbols);
        }

        session.finish()
    }
}
