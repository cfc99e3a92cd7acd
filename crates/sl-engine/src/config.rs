//! Game configuration as delivered by the loader, and its validation
//!
//! ## Format
//!
//! ```json
//! {
//!   "base": {
//!     "symbols": { "P1": {}, "WILD": { "is_wild": true }, "SC": { "is_scatter": true } },
//!     "reel_sets": [ { "reels": [["P1", "WILD", "SC"], ...], "weight": 1 } ],
//!     "paylines": [[1, 1, 1, 1, 1], ...],
//!     "paytable": {
//!       "P1": { "3": 5, "4": 20, "5": 50 },
//!       "SC": { "3": { "payout": 2, "triggers": { "name": "freespins", "count": 10 } } }
//!     },
//!     "window_height": 3,
//!     "customParameters": {}
//!   },
//!   "freespins": { ... same shape, plus "bonusSymbol", "CPWeights", "threshold" ... }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::collection::{CollectionConfig, ValueTable};
use crate::error::{ConfigError, ConfigResult};
use crate::model::{GameDefinition, GameMode, ModeDefinition};
use crate::paytable::{BonusTrigger, PayRule, Payline, Paytable};
use crate::symbols::{Reel, ReelSelector, ReelSet, SymbolTable};

/// Complete game configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub base: ModeConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freespins: Option<ModeConfig>,
}

/// Configuration for one mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeConfig {
    pub symbols: BTreeMap<String, SymbolSpec>,
    pub reel_sets: Vec<ReelSetSpec>,
    #[serde(default)]
    pub paylines: Vec<Vec<usize>>,
    /// symbol name → run length ("3") → rule
    #[serde(default)]
    pub paytable: BTreeMap<String, BTreeMap<String, RuleSpec>>,
    pub window_height: usize,
    #[serde(default, rename = "customParameters")]
    pub custom_parameters: CustomParameters,
}

/// Symbol traits
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SymbolSpec {
    #[serde(default)]
    pub is_wild: bool,
    #[serde(default)]
    pub is_scatter: bool,
}

/// One weighted reel set: columns of symbol names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReelSetSpec {
    pub reels: Vec<Vec<String>>,
    pub weight: f64,
}

/// A paytable entry: bare payout or full rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleSpec {
    Flat(f64),
    Rule {
        #[serde(default)]
        payout: f64,
        #[serde(default)]
        triggers: Option<BonusTrigger>,
    },
}

impl RuleSpec {
    fn to_rule(&self) -> PayRule {
        match self {
            Self::Flat(payout) => PayRule::flat(*payout),
            Self::Rule { payout, triggers } => PayRule {
                payout: *payout,
                triggers: triggers.clone(),
            },
        }
    }
}

/// Named custom parameters plus a residual extension map
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomParameters {
    /// Symbol that receives collectible values in free spins
    #[serde(default, rename = "bonusSymbol", skip_serializing_if = "Option::is_none")]
    pub bonus_symbol: Option<String>,
    /// value → weight
    #[serde(default, rename = "CPWeights")]
    pub cp_weights: BTreeMap<String, f64>,
    /// Collected symbols needed to pay; 0 disables the feature
    #[serde(default)]
    pub threshold: u32,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl GameConfig {
    /// Parse JSON config
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))
    }

    /// Parse YAML config
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        serde_yml::from_str(yaml).map_err(|e| ConfigError::Yaml(e.to_string()))
    }

    /// Export config as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Validate and build the runtime definition
    pub fn build(&self) -> ConfigResult<GameDefinition> {
        let base = self.base.build(GameMode::Base)?;
        let freespins = self
            .freespins
            .as_ref()
            .map(|fs| fs.build(GameMode::FreeSpins))
            .transpose()?;

        if freespins.is_none() {
            if let Some(trigger) = base.paytable.triggers().next() {
                return Err(ConfigError::MissingFreeSpinsMode {
                    trigger: trigger.name.clone(),
                });
            }
        }

        log::debug!(
            "Game built: base {} reel sets / {} paylines, freespins {}",
            base.reel_sets.sets().len(),
            base.line_count(),
            if freespins.is_some() { "configured" } else { "absent" }
        );

        Ok(GameDefinition::new(base, freespins))
    }
}

impl ModeConfig {
    /// Validate this mode and build its runtime definition
    pub fn build(&self, mode: GameMode) -> ConfigResult<ModeDefinition> {
        let label = mode.as_str();

        if self.window_height == 0 {
            return Err(ConfigError::ZeroWindowHeight {
                mode: label.to_string(),
            });
        }

        let mut symbols = SymbolTable::new();
        for (name, spec) in &self.symbols {
            symbols
                .insert(name, spec.is_wild, spec.is_scatter)
                .ok_or_else(|| ConfigError::TooManySymbols {
                    mode: label.to_string(),
                    count: self.symbols.len(),
                    max: SymbolTable::MAX_SYMBOLS,
                })?;
        }

        let lookup = |name: &str, context: String| {
            symbols.lookup(name).ok_or_else(|| ConfigError::UnknownSymbol {
                mode: label.to_string(),
                symbol: name.to_string(),
                context,
            })
        };

        let mut reel_sets = Vec::with_capacity(self.reel_sets.len());
        for (set_idx, set) in self.reel_sets.iter().enumerate() {
            if set.reels.is_empty() {
                return Err(ConfigError::NoReels {
                    mode: label.to_string(),
                    reel_set: set_idx,
                });
            }
            let mut reels = Vec::with_capacity(set.reels.len());
            for (reel_idx, names) in set.reels.iter().enumerate() {
                let ids = names
                    .iter()
                    .map(|n| lookup(n.as_str(), format!("reel set {set_idx} reel {reel_idx}")))
                    .collect::<ConfigResult<Vec<_>>>()?;
                let reel = Reel::new(ids).ok_or_else(|| ConfigError::EmptyReel {
                    mode: label.to_string(),
                    reel_set: set_idx,
                    reel: reel_idx,
                })?;
                reels.push(reel);
            }
            reel_sets.push(ReelSet::new(reels, set.weight));
        }
        let reel_sets = ReelSelector::new(label, reel_sets)?;

        let mut paylines = Vec::with_capacity(self.paylines.len());
        for (idx, rows) in self.paylines.iter().enumerate() {
            if let Some(&row) = rows.iter().find(|&&r| r >= self.window_height) {
                return Err(ConfigError::PaylineRowOutOfBounds {
                    mode: label.to_string(),
                    payline: idx,
                    row,
                    height: self.window_height,
                });
            }
            paylines.push(Payline::new(idx, rows.clone()));
        }

        let mut paytable = Paytable::new();
        for (name, rules) in &self.paytable {
            let symbol = lookup(name.as_str(), "paytable".to_string())?;
            for (key, spec) in rules {
                let count = key
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .filter(|&c| c > 0)
                    .ok_or_else(|| ConfigError::InvalidRunLength {
                        mode: label.to_string(),
                        symbol: name.clone(),
                        key: key.clone(),
                    })?;
                let rule = spec.to_rule();
                if !rule.payout.is_finite() || rule.payout < 0.0 {
                    return Err(ConfigError::InvalidPayout {
                        mode: label.to_string(),
                        symbol: name.clone(),
                        count,
                        payout: rule.payout,
                    });
                }
                paytable.add_rule(symbol, count, rule);
            }
        }

        let params = &self.custom_parameters;
        let bonus_symbol = params
            .bonus_symbol
            .as_deref()
            .map(|name| lookup(name, "customParameters.bonusSymbol".to_string()))
            .transpose()?;
        let collection = CollectionConfig {
            bonus_symbol,
            values: value_table(label, &params.cp_weights),
            threshold: params.threshold,
        };

        Ok(ModeDefinition {
            mode,
            symbols,
            reel_sets,
            paylines,
            paytable,
            window_height: self.window_height,
            collection,
            extra: params.extra.clone(),
        })
    }
}

/// Parse CP weights; malformed entries are skipped, not fatal
fn value_table(mode: &str, weights: &BTreeMap<String, f64>) -> Option<ValueTable> {
    if weights.is_empty() {
        return None;
    }
    let entries: Vec<(u32, f64)> = weights
        .iter()
        .filter_map(|(key, &weight)| match key.trim().parse::<u32>() {
            Ok(value) => Some((value, weight)),
            Err(_) => {
                log::warn!("[{mode}] skipping CPWeights entry '{key}': not a non-negative integer");
                None
            }
        })
        .collect();

    let table = ValueTable::new(&entries);
    if table.is_none() {
        log::warn!("[{mode}] CPWeights has no usable entry; bonus symbols stay unvalued");
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_json(extra_base: &str) -> String {
        format!(
            r#"{{
                "base": {{
                    "symbols": {{ "A": {{}}, "W": {{ "is_wild": true }}, "S": {{ "is_scatter": true }} }},
                    "reel_sets": [ {{ "reels": [["A", "W"], ["A", "S"], ["A"]], "weight": 1 }} ],
                    "paylines": [[0, 0, 0], [1, 1, 1]],
                    "paytable": {{ "A": {{ "3": 5 }} }},
                    "window_height": 2
                    {extra_base}
                }}
            }}"#
        )
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = GameConfig::from_json(&minimal_json("")).unwrap();
        let game = config.build().unwrap();

        let base = game.base();
        assert_eq!(base.window_height, 2);
        assert_eq!(base.line_count(), 2);
        assert_eq!(base.reel_sets.sets()[0].width(), 3);
        let a = base.symbols.lookup("A").unwrap();
        assert_eq!(base.paytable.payout(a, 3), 5.0);
        assert!(!game.has_freespins());
    }

    #[test]
    fn test_rule_object_with_trigger() {
        let json = r#"{
            "base": {
                "symbols": { "S": { "is_scatter": true } },
                "reel_sets": [ { "reels": [["S"]], "weight": 1 } ],
                "paytable": { "S": { "1": { "payout": 2, "triggers": { "name": "bonus", "count": 10 } } } },
                "window_height": 1
            },
            "freespins": {
                "symbols": { "S": { "is_scatter": true } },
                "reel_sets": [ { "reels": [["S"]], "weight": 1 } ],
                "window_height": 1
            }
        }"#;
        let game = GameConfig::from_json(json).unwrap().build().unwrap();
        let base = game.base();
        let s = base.symbols.lookup("S").unwrap();
        let rule = base.paytable.rule(s, 1).unwrap();
        assert_eq!(rule.payout, 2.0);
        assert_eq!(rule.triggers, Some(BonusTrigger::new("bonus", 10)));
        assert!(game.has_freespins());
    }

    #[test]
    fn test_trigger_without_freespins_mode_rejected() {
        let json = r#"{
            "base": {
                "symbols": { "S": { "is_scatter": true } },
                "reel_sets": [ { "reels": [["S"]], "weight": 1 } ],
                "paytable": { "S": { "1": { "triggers": { "count": 5 } } } },
                "window_height": 1
            }
        }"#;
        let err = GameConfig::from_json(json).unwrap().build().unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingFreeSpinsMode {
                trigger: "freespins".into()
            }
        );
    }

    #[test]
    fn test_unknown_reel_symbol_rejected() {
        let json = minimal_json("").replace(r#"["A"]]"#, r#"["B"]]"#);
        let err = GameConfig::from_json(&json).unwrap().build().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownSymbol { ref symbol, .. } if symbol == "B"));
    }

    #[test]
    fn test_payline_row_out_of_bounds_rejected() {
        let json = minimal_json("").replace("[1, 1, 1]", "[1, 2, 1]");
        let err = GameConfig::from_json(&json).unwrap().build().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::PaylineRowOutOfBounds {
                payline: 1,
                row: 2,
                height: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_reel_rejected() {
        let json = minimal_json("").replace(r#"["A"]]"#, "[]]");
        let err = GameConfig::from_json(&json).unwrap().build().unwrap_err();
        assert!(matches!(err, ConfigError::EmptyReel { reel: 2, .. }));
    }

    #[test]
    fn test_zero_weights_rejected() {
        let json = minimal_json("").replace(r#""weight": 1"#, r#""weight": 0"#);
        let err = GameConfig::from_json(&json).unwrap().build().unwrap_err();
        assert!(matches!(err, ConfigError::AllWeightsZero { .. }));
    }

    #[test]
    fn test_bad_run_length_rejected() {
        let json = minimal_json("").replace(r#"{ "3": 5 }"#, r#"{ "three": 5 }"#);
        let err = GameConfig::from_json(&json).unwrap().build().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRunLength { .. }));
    }

    #[test]
    fn test_custom_parameters_typed_and_residual() {
        let json = minimal_json(
            r#", "customParameters": {
                "bonusSymbol": "A",
                "CPWeights": { "5": 3, "x": 1, "10": 1 },
                "threshold": 4,
                "volatilityTag": "high"
            }"#,
        );
        let config = GameConfig::from_json(&json).unwrap();
        let params = &config.base.custom_parameters;
        assert_eq!(params.bonus_symbol.as_deref(), Some("A"));
        assert_eq!(params.threshold, 4);
        assert_eq!(params.extra["volatilityTag"], "high");

        let game = config.build().unwrap();
        let collection = &game.base().collection;
        assert_eq!(collection.bonus_symbol, game.base().symbols.lookup("A"));
        assert_eq!(collection.values.as_ref().unwrap().values(), &[10, 5]);
        assert_eq!(game.base().extra["volatilityTag"], "high");
    }

    #[test]
    fn test_unknown_bonus_symbol_rejected() {
        let json = minimal_json(r#", "customParameters": { "bonusSymbol": "CP" }"#);
        let err = GameConfig::from_json(&json).unwrap().build().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownSymbol { ref context, .. } if context.contains("bonusSymbol")));
    }

    #[test]
    fn test_too_many_symbols_rejected() {
        let mut config = GameConfig::from_json(&minimal_json("")).unwrap();
        for i in 0..SymbolTable::MAX_SYMBOLS {
            config
                .base
                .symbols
                .insert(format!("P{i:05}"), SymbolSpec::default());
        }
        let total = config.base.symbols.len();

        let err = config.build().unwrap_err();
        assert_eq!(
            err,
            ConfigError::TooManySymbols {
                mode: "base".to_string(),
                count: total,
                max: SymbolTable::MAX_SYMBOLS,
            }
        );
    }

    #[test]
    fn test_yaml_config() {
        let yaml = r#"
base:
  symbols:
    A: {}
  reel_sets:
    - reels: [[A], [A], [A]]
      weight: 1
  paylines: [[0, 0, 0]]
  paytable:
    A:
      "3": 4
  window_height: 1
"#;
        let game = GameConfig::from_yaml(yaml).unwrap().build().unwrap();
        let a = game.base().symbols.lookup("A").unwrap();
        assert_eq!(game.base().paytable.payout(a, 3), 4.0);
    }

    #[test]
    fn test_json_round_trip_keeps_rules() {
        let config = GameConfig::from_json(&minimal_json("")).unwrap();
        let again = GameConfig::from_json(&config.to_json()).unwrap();
        assert_eq!(again.base.paytable["A"]["3"], RuleSpec::Flat(5.0));
    }
}
