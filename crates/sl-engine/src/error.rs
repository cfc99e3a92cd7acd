//! Error types for the spin engine

use thiserror::Error;

/// Configuration error raised while loading or validating a game.
///
/// Every variant is fatal: a game that fails validation never spins.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    Json(String),

    #[error("YAML parse error: {0}")]
    Yaml(String),

    #[error("[{mode}] unknown symbol '{symbol}' referenced by {context}")]
    UnknownSymbol {
        mode: String,
        symbol: String,
        context: String,
    },

    #[error("[{mode}] reel {reel} of reel set {reel_set} is empty")]
    EmptyReel {
        mode: String,
        reel_set: usize,
        reel: usize,
    },

    #[error("[{mode}] reel set {reel_set} has no reels")]
    NoReels { mode: String, reel_set: usize },

    #[error("[{mode}] no reel sets configured")]
    NoReelSets { mode: String },

    #[error("[{mode}] reel set {reel_set} has invalid weight {weight}")]
    InvalidWeight {
        mode: String,
        reel_set: usize,
        weight: f64,
    },

    #[error("[{mode}] all reel set weights are zero")]
    AllWeightsZero { mode: String },

    #[error("[{mode}] window height must be at least 1")]
    ZeroWindowHeight { mode: String },

    #[error("[{mode}] {count} symbols defined, at most {max} are supported")]
    TooManySymbols { mode: String, count: usize, max: usize },

    #[error("[{mode}] payline {payline} uses row {row}, window height is {height}")]
    PaylineRowOutOfBounds {
        mode: String,
        payline: usize,
        row: usize,
        height: usize,
    },

    #[error("[{mode}] paytable run length '{key}' for symbol '{symbol}' is not a positive integer")]
    InvalidRunLength {
        mode: String,
        symbol: String,
        key: String,
    },

    #[error("[{mode}] paytable payout {payout} for '{symbol}' x{count} is invalid")]
    InvalidPayout {
        mode: String,
        symbol: String,
        count: usize,
        payout: f64,
    },

    #[error("base mode awards '{trigger}' but no freespins mode is configured")]
    MissingFreeSpinsMode { trigger: String },
}

/// Result type alias
pub type ConfigResult<T> = Result<T, ConfigError>;
