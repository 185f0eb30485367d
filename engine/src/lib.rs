//! The casefall economy engine.
//!
//! [`EconomyStore`] owns all state and exposes the full operation surface:
//! case opening through the weighted [`resolver`], selling, upgrades,
//! transfers, promo codes, passive income, the casino [`games`], the
//! role-gated admin surface, and versioned snapshot import/export.
//!
//! The engine is deterministic: callers inject the random source (`impl
//! Rng`) and the clock (`now_ms`), so any sequence of operations replays
//! identically under a seeded generator.

mod admin;
mod error;
mod events;
pub mod games;
pub mod resolver;
mod snapshot;
mod store;

pub use error::EngineError;
pub use events::{
    effective_luck, evaluate_timed_state, upgrade_chance, TimedState, UPGRADE_CHANCE_CEILING,
};
pub use store::{EconomyStore, OpenedDrop, Settled, SYSTEM_LOG_CAPACITY};
