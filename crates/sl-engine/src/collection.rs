//! Collection feature: valued bonus symbols summed toward a threshold
//!
//! While free spins are active, every window cell showing the configured bonus
//! symbol is tagged with a value drawn from a weighted table. After the window
//! is complete, the tagged cells are counted and their values summed; reaching
//! the threshold pays the sum.

use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;

use crate::symbols::SymbolId;
use crate::window::{Position, SymbolWindow, WindowCell};

/// Weighted table of collectible values
#[derive(Debug, Clone)]
pub struct ValueTable {
    values: Vec<u32>,
    index: WeightedIndex<f64>,
}

impl ValueTable {
    /// Build from (value, weight) pairs.
    ///
    /// Returns `None` when no entry has a positive weight.
    pub fn new(entries: &[(u32, f64)]) -> Option<Self> {
        let entries: Vec<_> = entries
            .iter()
            .filter(|(_, w)| w.is_finite() && *w > 0.0)
            .copied()
            .collect();
        let index = WeightedIndex::new(entries.iter().map(|(_, w)| *w)).ok()?;
        Some(Self {
            values: entries.into_iter().map(|(v, _)| v).collect(),
            index,
        })
    }

    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        self.values[self.index.sample(rng)]
    }

    pub fn values(&self) -> &[u32] {
        &self.values
    }
}

/// Collection settings for one mode
#[derive(Debug, Clone, Default)]
pub struct CollectionConfig {
    /// Symbol that receives values
    pub bonus_symbol: Option<SymbolId>,
    /// Value draw table
    pub values: Option<ValueTable>,
    /// Minimum valued cells to pay; 0 disables the payout
    pub threshold: u32,
}

/// Result of a collection scan that reached the threshold
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionHit {
    pub symbol: SymbolId,
    pub count: usize,
    /// Sum of collected values, in bet multiples
    pub total: u64,
    pub cells: Vec<(Position, u32)>,
}

impl CollectionConfig {
    /// Tag a bonus symbol cell with a drawn value; other cells pass through
    pub fn tag<R: Rng + ?Sized>(&self, cell: WindowCell, rng: &mut R) -> WindowCell {
        match (self.bonus_symbol, &self.values) {
            (Some(symbol), Some(values)) if cell.symbol == symbol => {
                WindowCell::with_value(symbol, values.draw(rng))
            }
            _ => cell,
        }
    }

    /// Whether windows are transformed at all
    pub fn tags_values(&self) -> bool {
        self.bonus_symbol.is_some() && self.values.is_some()
    }

    /// Count and sum valued bonus cells.
    ///
    /// Bonus cells without a value are skipped.
    pub fn evaluate(&self, window: &SymbolWindow) -> Option<CollectionHit> {
        let symbol = self.bonus_symbol?;
        if self.threshold == 0 {
            return None;
        }

        let cells: Vec<(Position, u32)> = window
            .cells()
            .filter(|(_, c)| c.symbol == symbol)
            .filter_map(|(p, c)| c.value.map(|v| (p, v)))
            .collect();

        if cells.len() < self.threshold as usize {
            return None;
        }

        Some(CollectionHit {
            symbol,
            count: cells.len(),
            total: cells.iter().map(|(_, v)| u64::from(*v)).sum(),
            cells,
        })
    }
}
