//! Parallel Monte Carlo runner
//!
//! Trials are split across a fixed rayon pool. Each worker owns its engine,
//! RNG stream and accumulator; the shared [`GameDefinition`] is read-only.
//! Worker results are collected in index order and folded sequentially, so a
//! seeded run is reproducible regardless of completion order.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sl_engine::{EngineOptions, GameDefinition, SessionOptions, SessionResult, SlotEngine};

use crate::accumulator::Accumulator;
use crate::error::{SimError, SimResult};
use crate::report::RtpReport;

/// Simulation parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub total_trials: u64,
    pub bet: f64,
    /// 0 picks a default from the CPU count
    pub workers: usize,
    /// Fixed seed for reproducible runs; OS entropy otherwise
    pub seed: Option<u64>,
    pub engine: EngineOptions,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            total_trials: 100_000,
            bet: 1.0,
            workers: 0,
            seed: None,
            engine: EngineOptions::default(),
        }
    }
}

impl SimulationConfig {
    #[must_use]
    pub fn with_trials(mut self, total_trials: u64) -> Self {
        self.total_trials = total_trials;
        self
    }

    #[must_use]
    pub fn with_bet(mut self, bet: f64) -> Self {
        self.bet = bet;
        self
    }

    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_engine_options(mut self, engine: EngineOptions) -> Self {
        self.engine = engine;
        self
    }

    fn validate(&self) -> SimResult<()> {
        if !self.bet.is_finite() || self.bet <= 0.0 {
            return Err(SimError::InvalidBet(self.bet));
        }
        if self.total_trials == 0 {
            return Err(SimError::ZeroTrials);
        }
        Ok(())
    }
}

/// Worker count to use: 0 or more than the CPU count falls back to
/// `max(1, cpus - 2)`
pub fn resolve_workers(requested: usize) -> usize {
    let cpus = num_cpus::get();
    if requested == 0 || requested > cpus {
        cpus.saturating_sub(2).max(1)
    } else {
        requested
    }
}

/// Split `total` trials over `workers`; the first `total % workers` workers
/// take one extra trial
pub fn partition(total: u64, workers: usize) -> Vec<u64> {
    let workers = workers.max(1) as u64;
    let share = total / workers;
    let extra = total % workers;
    (0..workers).map(|i| share + u64::from(i < extra)).collect()
}

/// Cooperative cancellation flag, checked between trials
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// How a worker ended
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerOutcome {
    Completed(Accumulator),
    Failed(String),
    Cancelled,
}

/// Result of a run
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    /// Prior totals (if any) plus everything completed workers contributed
    pub accumulator: Accumulator,
    pub report: RtpReport,
    pub workers: usize,
    pub failed_workers: usize,
    pub cancelled_workers: usize,
    /// Trials run by this invocation
    pub trials_run: u64,
}

/// Monte Carlo simulator over one game
pub struct Simulator {
    game: Arc<GameDefinition>,
    config: SimulationConfig,
    cancel: CancelToken,
}

impl Simulator {
    pub fn new(game: Arc<GameDefinition>, config: SimulationConfig) -> Self {
        Self {
            game,
            config,
            cancel: CancelToken::new(),
        }
    }

    /// Share a cancellation token with the caller
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run the configured trials, adding them to `prior` when resuming
    pub fn run(&self, prior: Option<Accumulator>) -> SimResult<SimulationSummary> {
        self.run_with(prior, |_, engine, bet| {
            engine.play_session(bet, SessionOptions::default())
        })
    }

    /// Run with a custom trial function `(worker_index, engine, bet)`
    pub fn run_with<F>(&self, prior: Option<Accumulator>, trial: F) -> SimResult<SimulationSummary>
    where
        F: Fn(usize, &mut SlotEngine, f64) -> SessionResult + Sync,
    {
        self.config.validate()?;
        if let Some(prior) = &prior {
            self.check_resume(prior)?;
        }

        let workers = resolve_workers(self.config.workers)
            .min(usize::try_from(self.config.total_trials).unwrap_or(usize::MAX));
        let shares = partition(self.config.total_trials, workers);
        log::info!(
            "Simulating {} trials at bet {} on {} workers ({} per worker)",
            self.config.total_trials,
            self.config.bet,
            workers,
            shares[0]
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| SimError::ThreadPool(e.to_string()))?;

        let started = Instant::now();
        let outcomes: Vec<WorkerOutcome> = pool.install(|| {
            shares
                .into_par_iter()
                .enumerate()
                .map(|(index, trials)| self.run_worker(index, trials, &trial))
                .collect()
        });

        let mut accumulator = prior.unwrap_or_else(|| Accumulator::for_game(&self.game));
        let mut failed_workers = 0;
        let mut cancelled_workers = 0;
        let mut trials_run = 0;
        for (index, outcome) in outcomes.iter().enumerate() {
            match outcome {
                WorkerOutcome::Completed(acc) => {
                    trials_run += acc.total_trials;
                    accumulator.merge(acc);
                }
                WorkerOutcome::Failed(reason) => {
                    log::warn!("Worker {index} failed and contributes nothing: {reason}");
                    failed_workers += 1;
                }
                WorkerOutcome::Cancelled => {
                    log::info!("Worker {index} cancelled");
                    cancelled_workers += 1;
                }
            }
        }

        if failed_workers == workers {
            return Err(SimError::AllWorkersFailed { workers });
        }

        let report = RtpReport::from_accumulator(&accumulator);
        log::info!(
            "Simulation finished in {:.2?}: {} trials run, RTP {:.4}%",
            started.elapsed(),
            trials_run,
            report.total_payout_rtp * 100.0
        );

        Ok(SimulationSummary {
            accumulator,
            report,
            workers,
            failed_workers,
            cancelled_workers,
            trials_run,
        })
    }

    fn run_worker<F>(&self, index: usize, trials: u64, trial: &F) -> WorkerOutcome
    where
        F: Fn(usize, &mut SlotEngine, f64) -> SessionResult + Sync,
    {
        let run = || {
            let rng = match self.config.seed {
                Some(seed) => {
                    let mut rng = ChaCha8Rng::seed_from_u64(seed);
                    rng.set_stream(index as u64);
                    rng
                }
                None => ChaCha8Rng::from_os_rng(),
            };
            let mut engine =
                SlotEngine::with_rng(Arc::clone(&self.game), rng).with_options(self.config.engine);
            let mut acc = Accumulator::for_game(&self.game);

            for _ in 0..trials {
                if self.cancel.is_cancelled() {
                    return WorkerOutcome::Cancelled;
                }
                let session = trial(index, &mut engine, self.config.bet);
                acc.record(&session);
            }
            WorkerOutcome::Completed(acc)
        };

        panic::catch_unwind(AssertUnwindSafe(run)).unwrap_or_else(|payload| {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "worker panicked".to_string());
            WorkerOutcome::Failed(reason)
        })
    }

    fn check_resume(&self, prior: &Accumulator) -> SimResult<()> {
        let totals = [
            prior.total_bet,
            prior.total_payout,
            prior.base_payout,
            prior.bonus_payout,
            prior.sum_squared_multipliers,
            prior.max_multiplier,
        ];
        if totals.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(SimError::ResumeMismatch(
                "totals must be finite and non-negative".to_string(),
            ));
        }
        if let Some(unknown) = prior.symbol_payouts.keys().find(|s| !self.game.knows_symbol(s)) {
            return Err(SimError::ResumeMismatch(format!(
                "symbol '{unknown}' is not defined by this game"
            )));
        }
        Ok(())
    }
}
