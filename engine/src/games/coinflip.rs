//! Coinflip.
//!
//! A fair flip paying the configured multiplier (2x by default) on a correct
//! call.

use casefall_types::PayoutConfig;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::Outcome;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Heads,
    Tails,
}

/// Flip once. Returns the landed side and the outcome.
pub fn flip<R: Rng>(rng: &mut R, pick: Side, bet: u64, payouts: &PayoutConfig) -> (Side, Outcome) {
    let landed = if rng.gen::<bool>() { Side::Heads } else { Side::Tails };
    let outcome = if landed == pick {
        Outcome::Win(bet.saturating_mul(payouts.coinflip_payout))
    } else {
        Outcome::Loss
    };
    (landed, outcome)
}
