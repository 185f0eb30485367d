use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::Rarity;

/// Maximum account name length accepted at registration.
pub const MAX_NAME_LENGTH: usize = 32;

/// Starting balance for new accounts.
pub const STARTING_BALANCE: u64 = 1_000;

/// XP granted per unit of case price (price / XP_PRICE_DIVISOR).
pub const XP_PRICE_DIVISOR: u64 = 10;

/// XP required per level beyond the first.
pub const XP_PER_LEVEL: u64 = 1_000;

/// Moderation roles, ordered by privilege.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Role {
    #[default]
    User,
    Mod,
    Admin,
    Owner,
}

impl Role {
    /// True if this role may perform configuration/catalog mutations.
    pub fn is_admin(self) -> bool {
        self >= Role::Admin
    }

    /// True if this role may perform chat moderation (mute/unmute).
    pub fn is_moderator(self) -> bool {
        self >= Role::Mod
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountInvariantError {
    #[error("account name too long (len={len}, max={max})")]
    NameTooLong { len: usize, max: usize },
    #[error("account name is empty")]
    NameEmpty,
}

/// An owned instance of an item template.
///
/// Display attributes and value are copied from the template at acquisition
/// time; later catalog edits do not retroactively reprice owned items.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemInstance {
    pub id: u64,
    pub template_id: String,
    pub name: String,
    pub rarity: Rarity,
    pub value: u64,
    /// Millisecond timestamp supplied by the caller clock.
    pub acquired_at: u64,
}

/// Monotonically accumulating per-account statistics.
///
/// Updated atomically alongside every case-opening or upgrade transaction.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub cases_opened: u64,
    pub money_spent: u64,
    pub value_obtained: u64,
    pub upgrades_attempted: u64,
    pub upgrades_won: u64,
    /// (template id, value) of the most valuable drop so far.
    pub best_drop: Option<(String, u64)>,
    /// (template id, value) of the least valuable drop so far.
    pub worst_drop: Option<(String, u64)>,
    /// Pull counts per rarity tier.
    #[serde(default)]
    pub rarity_pulls: BTreeMap<Rarity, u64>,
}

impl PlayerStats {
    /// Record a resolved drop: pull counters plus best/worst tracking.
    pub fn record_drop(&mut self, template_id: &str, rarity: Rarity, value: u64) {
        *self.rarity_pulls.entry(rarity).or_insert(0) += 1;
        self.value_obtained = self.value_obtained.saturating_add(value);
        match &self.best_drop {
            Some((_, best)) if *best >= value => {}
            _ => self.best_drop = Some((template_id.to_string(), value)),
        }
        match &self.worst_drop {
            Some((_, worst)) if *worst <= value => {}
            _ => self.worst_drop = Some((template_id.to_string(), value)),
        }
    }
}

/// Per-user record: balance, progression, inventory, and moderation state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    pub balance: u64,
    pub level: u32,
    pub xp: u64,
    /// Personal luck multiplier, composed with the global/event luck.
    pub luck: f64,
    pub role: Role,
    #[serde(default)]
    pub banned: bool,
    #[serde(default)]
    pub muted: bool,
    /// Session-boot marker set by moderation; cleared when the session layer
    /// acts on it. Unlike a ban it does not block engine operations.
    #[serde(default)]
    pub kicked: bool,
    /// Owned items, newest first. The inventory list is the single source of
    /// ownership truth; there is no separate "session view".
    pub inventory: Vec<ItemInstance>,
    pub stats: PlayerStats,
    /// Single-use forced-drop directive: the next case open returns this
    /// template directly, bypassing the weighted draw.
    #[serde(default)]
    pub forced_drop: Option<String>,
    /// At most one open casino round per account.
    #[serde(default)]
    pub active_round: Option<u64>,
    /// Promo codes already redeemed by this account.
    #[serde(default)]
    pub redeemed_codes: Vec<String>,
    /// Last passive-income accrual mark (ms). Zero until first accrual.
    #[serde(default)]
    pub last_income_ms: u64,
}

impl Account {
    /// Create a new account with the standard starting state.
    pub fn new(name: impl Into<String>) -> Result<Self, AccountInvariantError> {
        let name = name.into();
        if name.is_empty() {
            return Err(AccountInvariantError::NameEmpty);
        }
        if name.len() > MAX_NAME_LENGTH {
            return Err(AccountInvariantError::NameTooLong {
                len: name.len(),
                max: MAX_NAME_LENGTH,
            });
        }
        Ok(Self {
            name,
            balance: STARTING_BALANCE,
            level: 1,
            xp: 0,
            luck: 1.0,
            role: Role::User,
            banned: false,
            muted: false,
            kicked: false,
            inventory: Vec::new(),
            stats: PlayerStats::default(),
            forced_drop: None,
            active_round: None,
            redeemed_codes: Vec::new(),
            last_income_ms: 0,
        })
    }

    /// Number of owned items. Always equals `inventory.len()`.
    pub fn inventory_count(&self) -> usize {
        self.inventory.len()
    }

    /// Grant XP and recompute the level from the fixed curve.
    pub fn grant_xp(&mut self, amount: u64) {
        self.xp = self.xp.saturating_add(amount);
        self.level = 1 + (self.xp / XP_PER_LEVEL) as u32;
    }

    /// True if the account holds at least one instance of `template_id`.
    pub fn holds_template(&self, template_id: &str) -> bool {
        self.inventory.iter().any(|i| i.template_id == template_id)
    }
}
