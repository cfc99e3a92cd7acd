//! # sl-sim — Monte Carlo RTP harness
//!
//! Drives [`sl_engine::SlotEngine`] across many independent trials on a rayon
//! pool and reduces the per-worker sums into an [`RtpReport`] with a 95%
//! confidence interval. Accumulators serialize, so a run can be resumed and
//! extended by later invocations.
//!
//! ```text
//! Arc<GameDefinition> ──┬── worker 0: SlotEngine + ChaCha8 stream 0 ──> Accumulator
//!                       ├── worker 1: SlotEngine + ChaCha8 stream 1 ──> Accumulator
//!                       └── ...
//!                                   │ fold in index order (+ prior)
//!                                   v
//!                              RtpReport
//! ```

pub mod accumulator;
pub mod error;
pub mod report;
pub mod runner;

pub use accumulator::*;
pub use error::*;
pub use report::*;
pub use runner::*;
