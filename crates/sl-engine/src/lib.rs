//! # sl-engine — Reel slot spin engine
//!
//! Evaluates spins of a configurable reel-based slot game: weighted reel-set
//! selection, circular reel windows, payline and scatter evaluation, the
//! free-spins collection feature, and the base/free-spins state machine.
//!
//! ## Architecture
//!
//! ```text
//! GameConfig (JSON / YAML)
//!     │  build() + validation
//!     v
//! Arc<GameDefinition> ── base / freespins ModeDefinition
//!     │                    ├── SymbolTable
//!     │                    ├── ReelSelector (weighted ReelSets)
//!     │                    ├── Paylines + Paytable
//!     │                    └── CollectionConfig
//!     v
//! SlotEngine (owns RNG + EngineState)
//!     │  spin(): window → lines → scatters → collection → transition
//!     v
//! SpinOutcome ──> SessionAccumulator ──> SessionResult
//! ```

pub mod collection;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod paytable;
pub mod session;
pub mod spin;
pub mod symbols;
pub mod window;

pub use collection::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use model::*;
pub use paytable::*;
pub use session::*;
pub use spin::*;
pub use symbols::*;
pub use window::*;
