//! Symbol definitions, reel strips and weighted reel sets

use std::collections::HashMap;

use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Index of a symbol inside its mode's [`SymbolTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(pub u16);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A symbol definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    /// Unique symbol ID within its table
    pub id: SymbolId,
    /// Symbol name (e.g., "P1", "WILD", "SCATTER", "CP")
    pub name: String,
    /// Wild - substitutes for others on a line
    pub is_wild: bool,
    /// Scatter - pays and triggers regardless of position
    pub is_scatter: bool,
}

/// All symbols known to one game mode, addressable by id or name
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    by_name: HashMap<String, SymbolId>,
}

impl SymbolTable {
    /// Number of distinct ids a [`SymbolId`] can address
    pub const MAX_SYMBOLS: usize = u16::MAX as usize + 1;

    pub fn new() -> Self {
        Self::default()
    }

    /// Register a symbol and return its id.
    ///
    /// Registering a name twice returns the id of the first registration.
    /// Returns `None` once all [`SymbolTable::MAX_SYMBOLS`] ids are taken.
    pub fn insert(&mut self, name: &str, is_wild: bool, is_scatter: bool) -> Option<SymbolId> {
        if let Some(&id) = self.by_name.get(name) {
            return Some(id);
        }
        let id = SymbolId(u16::try_from(self.symbols.len()).ok()?);
        self.symbols.push(Symbol {
            id,
            name: name.to_string(),
            is_wild,
            is_scatter,
        });
        self.by_name.insert(name.to_string(), id);
        Some(id)
    }

    /// Get symbol by ID
    ///
    /// Ids are only ever issued by this table, so the lookup cannot miss.
    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    /// Find a symbol id by name
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, id: SymbolId) -> &str {
        &self.get(id).name
    }

    pub fn is_wild(&self, id: SymbolId) -> bool {
        self.get(id).is_wild
    }

    pub fn is_scatter(&self, id: SymbolId) -> bool {
        self.get(id).is_scatter
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// A circular reel strip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reel {
    symbols: Vec<SymbolId>,
}

impl Reel {
    /// Create a reel strip. Returns `None` for an empty strip.
    pub fn new(symbols: Vec<SymbolId>) -> Option<Self> {
        if symbols.is_empty() {
            None
        } else {
            Some(Self { symbols })
        }
    }

    /// Get symbol at position (wraps around)
    pub fn symbol_at(&self, position: usize) -> SymbolId {
        self.symbols[position % self.symbols.len()]
    }

    /// `height` consecutive symbols starting at `stop`, wrapping past the end
    pub fn window(&self, stop: usize, height: usize) -> impl Iterator<Item = SymbolId> + '_ {
        (0..height).map(move |row| self.symbol_at(stop + row))
    }

    /// Uniform random stop in `[0, len)`
    pub fn random_stop<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        rng.random_range(0..self.symbols.len())
    }

    /// Get total strip length (always > 0)
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn symbols(&self) -> &[SymbolId] {
        &self.symbols
    }
}

/// One reel per column, selected per spin by weight
#[derive(Debug, Clone)]
pub struct ReelSet {
    reels: Vec<Reel>,
    weight: f64,
}

impl ReelSet {
    pub fn new(reels: Vec<Reel>, weight: f64) -> Self {
        Self { reels, weight }
    }

    pub fn reels(&self) -> &[Reel] {
        &self.reels
    }

    /// Number of columns this set produces
    pub fn width(&self) -> usize {
        self.reels.len()
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }
}

/// Weighted choice among the reel sets of one mode
#[derive(Debug, Clone)]
pub struct ReelSelector {
    sets: Vec<ReelSet>,
    index: WeightedIndex<f64>,
}

impl ReelSelector {
    /// Build a selector. Fails when the weights cannot produce a choice.
    pub fn new(mode: &str, sets: Vec<ReelSet>) -> ConfigResult<Self> {
        if sets.is_empty() {
            return Err(ConfigError::NoReelSets {
                mode: mode.to_string(),
            });
        }
        for (i, set) in sets.iter().enumerate() {
            if !set.weight.is_finite() || set.weight < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    mode: mode.to_string(),
                    reel_set: i,
                    weight: set.weight,
                });
            }
        }
        let index = WeightedIndex::new(sets.iter().map(|s| s.weight)).map_err(|_| {
            ConfigError::AllWeightsZero {
                mode: mode.to_string(),
            }
        })?;
        Ok(Self { sets, index })
    }

    /// Weighted random choice; zero-weight sets are never returned
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &ReelSet {
        if self.sets.len() == 1 {
            return &self.sets[0];
        }
        &self.sets[self.index.sample(rng)]
    }

    pub fn sets(&self) -> &[ReelSet] {
        &self.sets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn ids(raw: &[u16]) -> Vec<SymbolId> {
        raw.iter().map(|&i| SymbolId(i)).collect()
    }

    #[test]
    fn test_symbol_table_lookup() {
        let mut table = SymbolTable::new();
        let a = table.insert("A", false, false).unwrap();
        let w = table.insert("WILD", true, false).unwrap();
        let s = table.insert("SC", false, true).unwrap();

        assert_eq!(table.lookup("WILD"), Some(w));
        assert_eq!(table.insert("A", true, true), Some(a));
        assert!(!table.is_wild(a));
        assert!(table.is_wild(w));
        assert!(table.is_scatter(s));
        assert_eq!(table.name(s), "SC");
        assert_eq!(table.lookup("missing"), None);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_symbol_table_full_rejects_new_names() {
        let mut table = SymbolTable::new();
        for i in 0..SymbolTable::MAX_SYMBOLS {
            assert!(table.insert(&format!("S{i:05}"), false, false).is_some());
        }
        assert_eq!(table.len(), SymbolTable::MAX_SYMBOLS);
        assert_eq!(table.lookup("S65535"), Some(SymbolId(u16::MAX)));

        assert_eq!(table.insert("W", true, false), None);
        assert_eq!(table.lookup("W"), None);
        assert_eq!(table.len(), SymbolTable::MAX_SYMBOLS);
        assert_eq!(table.insert("S00001", false, false), Some(SymbolId(1)));
    }

    #[test]
    fn test_reel_strip_wrap() {
        let reel = Reel::new(ids(&[1, 2, 3, 4, 5])).unwrap();
        assert_eq!(reel.symbol_at(0), SymbolId(1));
        assert_eq!(reel.symbol_at(5), SymbolId(1));
        assert_eq!(reel.symbol_at(7), SymbolId(3));

        let window: Vec<_> = reel.window(4, 3).collect();
        assert_eq!(window, ids(&[5, 1, 2]));
    }

    #[test]
    fn test_empty_reel_rejected() {
        assert!(Reel::new(Vec::new()).is_none());
    }

    #[test]
    fn test_random_stop_in_range() {
        let reel = Reel::new(ids(&[0, 1, 2])).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..1000 {
            assert!(reel.random_stop(&mut rng) < 3);
        }
    }

    #[test]
    fn test_zero_weight_never_chosen() {
        let reel = Reel::new(ids(&[0])).unwrap();
        let sets = vec![
            ReelSet::new(vec![reel.clone()], 0.0),
            ReelSet::new(vec![reel.clone(), reel.clone()], 3.0),
            ReelSet::new(vec![reel.clone(), reel.clone(), reel], 0.0),
        ];
        let selector = ReelSelector::new("base", sets).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..1000 {
            assert_eq!(selector.choose(&mut rng).width(), 2);
        }
    }

    #[test]
    fn test_all_zero_weights_is_config_error() {
        let reel = Reel::new(ids(&[0])).unwrap();
        let sets = vec![
            ReelSet::new(vec![reel.clone()], 0.0),
            ReelSet::new(vec![reel], 0.0),
        ];
        let err = ReelSelector::new("base", sets).unwrap_err();
        assert!(matches!(err, ConfigError::AllWeightsZero { .. }));
    }

    #[test]
    fn test_negative_weight_is_config_error() {
        let reel = Reel::new(ids(&[0])).unwrap();
        let err = ReelSelector::new("base", vec![ReelSet::new(vec![reel], -1.0)]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWeight { reel_set: 0, .. }));
    }
}
