//! Validated, read-only game definition shared by every engine instance

use serde::{Deserialize, Serialize};

use crate::collection::CollectionConfig;
use crate::paytable::{Payline, Paytable};
use crate::symbols::{ReelSelector, SymbolTable};

/// Engine mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Base,
    FreeSpins,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::FreeSpins => "freespins",
        }
    }
}

impl std::fmt::Display for GameMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything one mode needs to spin and evaluate
#[derive(Debug, Clone)]
pub struct ModeDefinition {
    pub mode: GameMode,
    pub symbols: SymbolTable,
    pub reel_sets: ReelSelector,
    pub paylines: Vec<Payline>,
    pub paytable: Paytable,
    pub window_height: usize,
    pub collection: CollectionConfig,
    /// Unrecognized custom parameters, kept for forward compatibility
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ModeDefinition {
    /// Number of active paylines (line payouts are divided by this)
    pub fn line_count(&self) -> usize {
        self.paylines.len()
    }
}

/// Base mode plus optional free-spins mode
#[derive(Debug, Clone)]
pub struct GameDefinition {
    base: ModeDefinition,
    freespins: Option<ModeDefinition>,
}

impl GameDefinition {
    pub fn new(base: ModeDefinition, freespins: Option<ModeDefinition>) -> Self {
        Self { base, freespins }
    }

    pub fn base(&self) -> &ModeDefinition {
        &self.base
    }

    pub fn freespins(&self) -> Option<&ModeDefinition> {
        self.freespins.as_ref()
    }

    pub fn has_freespins(&self) -> bool {
        self.freespins.is_some()
    }

    /// Definition for a mode; free spins fall back to base when absent
    pub fn mode(&self, mode: GameMode) -> &ModeDefinition {
        match mode {
            GameMode::Base => &self.base,
            GameMode::FreeSpins => self.freespins.as_ref().unwrap_or(&self.base),
        }
    }

    /// Base-mode symbol names, in table order
    pub fn symbol_names(&self) -> Vec<String> {
        self.base.symbols.iter().map(|s| s.name.clone()).collect()
    }

    /// Whether any mode defines a symbol with this name
    pub fn knows_symbol(&self, name: &str) -> bool {
        self.base.symbols.lookup(name).is_some()
            || self
                .freespins
                .as_ref()
                .is_some_and(|fs| fs.symbols.lookup(name).is_some())
    }
}
