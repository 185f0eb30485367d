use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{Account, CaseSpec, EngineConfig, ItemTemplate, PromoCode, Rarity};

/// Current snapshot schema version.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 2;

/// Maximum entries retained in the public live feed.
pub const LIVE_FEED_CAPACITY: usize = 10;

/// One announcement in the live feed or system log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub account: String,
    pub template_id: String,
    pub item_name: String,
    pub rarity: Rarity,
    pub value: u64,
    pub at_ms: u64,
}

/// Versioned, self-contained serialization of the whole store.
///
/// Every collection field carries a serde default so older documents with
/// missing sections import cleanly; the engine's import path repopulates empty
/// catalogs from the shipped defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    #[serde(default)]
    pub schema_version: u32,
    /// `None` when the document carries no accounts section at all, which
    /// the engine distinguishes from an empty store.
    #[serde(default)]
    pub accounts: Option<BTreeMap<String, Account>>,
    #[serde(default)]
    pub templates: BTreeMap<String, ItemTemplate>,
    #[serde(default)]
    pub cases: BTreeMap<String, CaseSpec>,
    #[serde(default)]
    pub config: Option<EngineConfig>,
    #[serde(default)]
    pub promo_codes: BTreeMap<String, PromoCode>,
    /// Next item instance id to allocate. Must exceed every owned item id.
    #[serde(default)]
    pub next_item_id: u64,
    #[serde(default)]
    pub next_round_id: u64,
    #[serde(default)]
    pub live_feed: Vec<FeedEntry>,
    #[serde(default)]
    pub system_log: Vec<FeedEntry>,
}
