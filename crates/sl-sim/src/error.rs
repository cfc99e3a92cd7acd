//! Error types for the simulation harness

use thiserror::Error;

/// Simulation error type
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid bet: {0} (must be finite and > 0)")]
    InvalidBet(f64),

    #[error("Simulation needs at least one trial")]
    ZeroTrials,

    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    #[error("All {workers} workers failed")]
    AllWorkersFailed { workers: usize },

    #[error("Resume state does not match this game: {0}")]
    ResumeMismatch(String),

    #[error("Configuration error: {0}")]
    Config(#[from] sl_engine::ConfigError),
}

/// Result type alias
pub type SimResult<T> = Result<T, SimError>;
