//! Roulette.
//!
//! A 15-slot wheel: one green slot, seven red, seven black. Picking the
//! landed color pays the configured multiplier (14x green, 2x red/black by
//! default).

use casefall_types::PayoutConfig;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::Outcome;

/// Wheel size.
pub const SLOTS: u8 = 15;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Green,
    Red,
    Black,
}

/// Color of a wheel slot (0..15). Slot 0 is green, 1..=7 red, 8..=14 black.
pub fn slot_color(slot: u8) -> Color {
    match slot {
        0 => Color::Green,
        1..=7 => Color::Red,
        _ => Color::Black,
    }
}

/// Spin the wheel once. Returns the landed slot and the outcome.
pub fn spin<R: Rng>(
    rng: &mut R,
    pick: Color,
    bet: u64,
    payouts: &PayoutConfig,
) -> (u8, Outcome) {
    let slot = rng.gen_range(0..SLOTS);
    let landed = slot_color(slot);
    let outcome = if landed == pick {
        let multiplier = match landed {
            Color::Green => payouts.roulette_green_payout,
            Color::Red | Color::Black => payouts.roulette_color_payout,
        };
        Outcome::Win(bet.saturating_mul(multiplier))
    } else {
        Outcome::Loss
    };
    (slot, outcome)
}
