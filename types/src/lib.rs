//! Common types for the casefall economy engine.
//!
//! Defines the catalog (item templates, cases, drop tables), per-account state
//! (balance, inventory, statistics), tunable configuration, and the versioned
//! snapshot document exchanged with callers. All types are plain data with
//! `serde` derives; behavior lives in `casefall-engine`.

mod account;
mod catalog;
mod config;
mod rarity;
mod snapshot;

pub use account::*;
pub use catalog::*;
pub use config::*;
pub use rarity::*;
pub use snapshot::*;
