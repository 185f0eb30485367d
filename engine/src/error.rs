use casefall_types::Rarity;
use thiserror::Error;

/// Errors surfaced by the economy store and casino games.
///
/// Every variant leaves the store unchanged: operations validate fully before
/// mutating, so a returned error never reflects a partial transaction.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("unknown account: {0}")]
    UnknownAccount(String),
    #[error("account already exists: {0}")]
    AccountExists(String),
    #[error("account is banned: {0}")]
    Banned(String),
    #[error("unknown case: {0}")]
    UnknownCase(String),
    #[error("unknown item template: {0}")]
    UnknownTemplate(String),
    #[error("item not found in inventory: {0}")]
    UnknownItem(u64),
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },
    #[error("case requires key template: {0}")]
    MissingKey(String),
    #[error("level {required} required, account is level {actual}")]
    LevelTooLow { required: u32, actual: u32 },
    #[error("reward table for case {case_id} has no resolvable entries")]
    InvalidRewardTable { case_id: String },
    #[error("no template exists at or above rarity {0:?}")]
    NoUpgradeTarget(Rarity),
    #[error("maintenance mode is active")]
    MaintenanceActive,
    #[error("permission denied: {0} required")]
    PermissionDenied(&'static str),
    #[error("game is disabled: {0}")]
    GameDisabled(&'static str),
    #[error("invalid bet: {0}")]
    InvalidBet(&'static str),
    #[error("account already has an active round")]
    RoundActive,
    #[error("round not found: {0}")]
    RoundNotFound(u64),
    #[error("round is already complete")]
    RoundComplete,
    #[error("invalid move for current round state")]
    InvalidMove,
    #[error("unknown promo code: {0}")]
    UnknownPromo(String),
    #[error("promo code already redeemed: {0}")]
    PromoAlreadyRedeemed(String),
    #[error("promo code exhausted: {0}")]
    PromoExhausted(String),
    #[error("cannot transfer to the same account")]
    SelfTransfer,
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}
