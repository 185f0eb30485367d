//! Snapshot export and import.
//!
//! A snapshot is a self-contained JSON document of accounts, catalog,
//! configuration, and feeds. Import is tolerant of older documents: schema
//! version 1 predates promo codes, feeds, and the payout configuration, and
//! those sections simply default. Open casino rounds are not exported; a
//! dangling `active_round` marker is cleared on import.

use casefall_types::{
    default_cases, default_templates, StateSnapshot, SNAPSHOT_SCHEMA_VERSION,
};
use std::collections::{BTreeMap, VecDeque};
use tracing::{info, warn};

use crate::store::EconomyStore;
use crate::EngineError;

impl EconomyStore {
    pub fn export_snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            accounts: Some(self.accounts.clone()),
            templates: self.templates.clone(),
            cases: self.cases.clone(),
            config: Some(self.config.clone()),
            promo_codes: self.promo_codes.clone(),
            next_item_id: self.next_item_id,
            next_round_id: self.next_round_id,
            live_feed: self.live_feed.iter().cloned().collect(),
            system_log: self.system_log.iter().cloned().collect(),
        }
    }

    pub fn export_json(&self) -> Result<String, EngineError> {
        serde_json::to_string_pretty(&self.export_snapshot())
            .map_err(|e| EngineError::InvalidSnapshot(e.to_string()))
    }

    /// Build a store from a snapshot, migrating older schema versions.
    pub fn import_snapshot(snapshot: StateSnapshot) -> Result<Self, EngineError> {
        match snapshot.schema_version {
            1 | SNAPSHOT_SCHEMA_VERSION => {}
            0 => {
                return Err(EngineError::InvalidSnapshot(
                    "missing schema version".to_string(),
                ))
            }
            other => {
                return Err(EngineError::InvalidSnapshot(format!(
                    "unsupported schema version {other}"
                )))
            }
        }
        if snapshot.schema_version < SNAPSHOT_SCHEMA_VERSION {
            info!(
                from = snapshot.schema_version,
                to = SNAPSHOT_SCHEMA_VERSION,
                "migrating snapshot"
            );
        } else if snapshot.config.is_none() {
            // Current-version documents must carry their configuration; only
            // migrated ones may default it.
            return Err(EngineError::InvalidSnapshot(
                "missing config section".to_string(),
            ));
        }

        let mut accounts = match snapshot.accounts {
            Some(accounts) => accounts,
            None if snapshot.schema_version < SNAPSHOT_SCHEMA_VERSION => BTreeMap::new(),
            None => {
                return Err(EngineError::InvalidSnapshot(
                    "missing accounts section".to_string(),
                ))
            }
        };
        // Highest owned item id bounds the allocator from below; a snapshot
        // edited by hand may carry a stale counter.
        let max_item_id = accounts
            .values()
            .flat_map(|a| a.inventory.iter())
            .map(|i| i.id)
            .max()
            .unwrap_or(0);
        let next_item_id = snapshot.next_item_id.max(max_item_id + 1);

        for account in accounts.values_mut() {
            if !account.luck.is_finite() || account.luck <= 0.0 {
                warn!(account = %account.name, "resetting non-finite luck");
                account.luck = 1.0;
            }
            if account.active_round.is_some() {
                // Rounds do not survive export.
                account.active_round = None;
            }
        }

        let templates = if snapshot.templates.is_empty() {
            default_templates()
        } else {
            snapshot.templates
        };
        let cases = if snapshot.cases.is_empty() {
            default_cases()
        } else {
            snapshot.cases
        };

        Ok(Self {
            accounts,
            templates,
            cases,
            config: snapshot.config.unwrap_or_default(),
            promo_codes: snapshot.promo_codes,
            rounds: BTreeMap::new(),
            next_item_id,
            next_round_id: snapshot.next_round_id.max(1),
            live_feed: VecDeque::from(snapshot.live_feed),
            system_log: VecDeque::from(snapshot.system_log),
        })
    }

    pub fn import_json(json: &str) -> Result<Self, EngineError> {
        let snapshot: StateSnapshot = serde_json::from_str(json)
            .map_err(|e| EngineError::InvalidSnapshot(e.to_string()))?;
        Self::import_snapshot(snapshot)
    }
}
