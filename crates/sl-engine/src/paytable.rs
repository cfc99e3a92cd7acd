//! Paylines, paytable rules and win evaluation

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::symbols::{SymbolId, SymbolTable};
use crate::window::{Position, SymbolWindow, WindowCell};

/// A payline definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payline {
    /// Payline index (0-based)
    pub index: usize,
    /// Row positions for each column (e.g., [1, 0, 0, 0, 1] for a "V" shape)
    pub rows: Vec<usize>,
}

impl Payline {
    pub fn new(index: usize, rows: Vec<usize>) -> Self {
        Self { index, rows }
    }

    /// Create a straight line (same row across all columns)
    pub fn straight(index: usize, row: usize, columns: usize) -> Self {
        Self {
            index,
            rows: vec![row; columns],
        }
    }

    /// Cells this line crosses, in column order.
    ///
    /// Columns beyond the window width are ignored; extraction stops at the
    /// first missing cell.
    pub fn cells(&self, window: &SymbolWindow) -> Vec<(Position, WindowCell)> {
        self.rows
            .iter()
            .enumerate()
            .take(window.width())
            .map_while(|(col, &row)| window.get(row, col).map(|c| (Position::new(row, col), c)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Bonus award carried by a paytable rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusTrigger {
    #[serde(default = "default_trigger_name")]
    pub name: String,
    pub count: u32,
}

fn default_trigger_name() -> String {
    "freespins".to_string()
}

impl BonusTrigger {
    pub fn new(name: impl Into<String>, count: u32) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

/// Payout for one (symbol, run length) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayRule {
    pub payout: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggers: Option<BonusTrigger>,
}

impl PayRule {
    pub fn flat(payout: f64) -> Self {
        Self {
            payout,
            triggers: None,
        }
    }

    pub fn triggering(payout: f64, trigger: BonusTrigger) -> Self {
        Self {
            payout,
            triggers: Some(trigger),
        }
    }
}

/// How a line whose first cell is wild is anchored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WildLineRule {
    /// The first cell anchors by its own name, wild or not
    Literal,
    /// Leading wilds take the name of the first non-wild cell; an all-wild
    /// run pays the best rule for its length
    #[default]
    Substitute,
}

/// A paying line run, in paytable units (not yet scaled by bet)
#[derive(Debug, Clone, PartialEq)]
pub struct LineMatch {
    /// Symbol whose rule paid
    pub symbol: SymbolId,
    /// Run length
    pub count: usize,
    pub payout: f64,
    /// Cells of the run
    pub cells: Vec<(Position, WindowCell)>,
}

/// Scatter count for one scatter symbol that has a rule
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterHit {
    pub symbol: SymbolId,
    pub count: usize,
    pub payout: f64,
    pub triggers: Option<BonusTrigger>,
    pub positions: Vec<Position>,
}

/// Lookup from (symbol, run length) to a payout rule
#[derive(Debug, Clone, Default)]
pub struct Paytable {
    rules: HashMap<(SymbolId, usize), PayRule>,
}

impl Paytable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_rule(&mut self, symbol: SymbolId, count: usize, rule: PayRule) {
        self.rules.insert((symbol, count), rule);
    }

    pub fn rule(&self, symbol: SymbolId, count: usize) -> Option<&PayRule> {
        self.rules.get(&(symbol, count))
    }

    /// Payout for a pair; 0 when no rule exists
    pub fn payout(&self, symbol: SymbolId, count: usize) -> f64 {
        self.rule(symbol, count).map(|r| r.payout).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Bonus awards carried by any rule
    pub fn triggers(&self) -> impl Iterator<Item = &BonusTrigger> {
        self.rules.values().filter_map(|r| r.triggers.as_ref())
    }

    /// Highest line payout for a run of `count` among non-scatter symbols
    fn best_line_rule(&self, count: usize, symbols: &SymbolTable) -> Option<(SymbolId, f64)> {
        self.rules
            .iter()
            .filter(|((symbol, n), _)| *n == count && !symbols.is_scatter(*symbol))
            .map(|((symbol, _), rule)| (*symbol, rule.payout))
            .max_by(|a, b| a.1.total_cmp(&b.1).then(b.0.cmp(&a.0)))
    }

    /// Evaluate the cells of one payline.
    ///
    /// Returns `None` when the line pays nothing.
    pub fn evaluate_line(
        &self,
        cells: &[(Position, WindowCell)],
        symbols: &SymbolTable,
        wild_rule: WildLineRule,
    ) -> Option<LineMatch> {
        let (_, first) = *cells.first()?;
        if symbols.is_scatter(first.symbol) {
            return None;
        }

        let (anchor, count) = match wild_rule {
            WildLineRule::Literal => (first, run_length(cells, &first, symbols)),
            WildLineRule::Substitute => {
                let leading_wilds = cells
                    .iter()
                    .take_while(|(_, c)| symbols.is_wild(c.symbol))
                    .count();
                match cells.get(leading_wilds) {
                    Some((_, anchor)) if !symbols.is_scatter(anchor.symbol) => {
                        let run = leading_wilds + run_length(&cells[leading_wilds..], anchor, symbols);
                        (*anchor, run)
                    }
                    _ => return self.wild_run(cells, leading_wilds, symbols),
                }
            }
        };

        // A valued face never matches a paytable key
        let payout = if anchor.value.is_some() {
            0.0
        } else {
            self.payout(anchor.symbol, count)
        };
        if payout <= 0.0 {
            return None;
        }

        Some(LineMatch {
            symbol: anchor.symbol,
            count,
            payout,
            cells: cells[..count].to_vec(),
        })
    }

    fn wild_run(
        &self,
        cells: &[(Position, WindowCell)],
        count: usize,
        symbols: &SymbolTable,
    ) -> Option<LineMatch> {
        if count == 0 {
            return None;
        }
        let (symbol, payout) = self.best_line_rule(count, symbols)?;
        if payout <= 0.0 {
            return None;
        }
        Some(LineMatch {
            symbol,
            count,
            payout,
            cells: cells[..count].to_vec(),
        })
    }

    /// Count every scatter symbol across the whole window and look up its rule
    pub fn evaluate_scatters(&self, window: &SymbolWindow, symbols: &SymbolTable) -> Vec<ScatterHit> {
        let mut seen: BTreeMap<SymbolId, Vec<Position>> = BTreeMap::new();
        for (position, cell) in window.cells() {
            if symbols.is_scatter(cell.symbol) {
                seen.entry(cell.symbol).or_default().push(position);
            }
        }

        seen.into_iter()
            .filter_map(|(symbol, positions)| {
                let count = positions.len();
                self.rule(symbol, count).map(|rule| ScatterHit {
                    symbol,
                    count,
                    payout: rule.payout,
                    triggers: rule.triggers.clone(),
                    positions,
                })
            })
            .collect()
    }
}

/// Length of the run starting at `cells[0]` that matches `anchor` or is wild
fn run_length(cells: &[(Position, WindowCell)], anchor: &WindowCell, symbols: &SymbolTable) -> usize {
    cells
        .iter()
        .take_while(|(_, c)| c.same_face(anchor) || symbols.is_wild(c.symbol))
        .count()
}
