//! Slots.
//!
//! Three independent weighted reel draws. A bomb on any reel zeroes the
//! spin; three matching symbols pay the symbol's multiplier; any pair pays
//! 1.5x (floored); anything else loses.

use casefall_types::{PayoutConfig, SlotPayline, SlotSymbol};
use rand::Rng;

use super::Outcome;

/// Draw one reel symbol from the configured paytable weights.
fn draw_symbol<R: Rng>(rng: &mut R, payouts: &PayoutConfig) -> SlotSymbol {
    let eligible: Vec<&SlotPayline> = payouts
        .slots_paytable
        .iter()
        .filter(|line| line.weight.is_finite() && line.weight > 0.0)
        .collect();
    let total: f64 = eligible.iter().map(|line| line.weight).sum();
    if eligible.is_empty() || total <= 0.0 {
        // Degenerate paytable; fall back to a uniform reel.
        let index = rng.gen_range(0..SlotSymbol::ALL.len());
        return SlotSymbol::ALL[index];
    }
    let roll = rng.gen_range(0.0..total);
    let mut cumulative = 0.0;
    for line in &eligible {
        cumulative += line.weight;
        if roll < cumulative {
            return line.symbol;
        }
    }
    // Floating-point accumulation can leave `roll` a hair past the final
    // cumulative sum; settle on the last eligible line, never a zero-weight
    // one.
    eligible[eligible.len() - 1].symbol
}

fn triple_payout(symbol: SlotSymbol, payouts: &PayoutConfig) -> u64 {
    payouts
        .slots_paytable
        .iter()
        .find(|line| line.symbol == symbol)
        .map_or(0, |line| line.payout)
}

/// Spin the reels once. Returns the three symbols and the outcome.
pub fn spin<R: Rng>(rng: &mut R, bet: u64, payouts: &PayoutConfig) -> ([SlotSymbol; 3], Outcome) {
    let reels = [
        draw_symbol(rng, payouts),
        draw_symbol(rng, payouts),
        draw_symbol(rng, payouts),
    ];
    let outcome = score(reels, bet, payouts);
    (reels, outcome)
}

fn score(reels: [SlotSymbol; 3], bet: u64, payouts: &PayoutConfig) -> Outcome {
    if reels.contains(&SlotSymbol::Bomb) {
        return Outcome::Loss;
    }
    let [a, b, c] = reels;
    if a == b && b == c {
        let payout = triple_payout(a, payouts);
        if payout == 0 {
            return Outcome::Loss;
        }
        return Outcome::Win(bet.saturating_mul(payout));
    }
    if a == b || b == c || a == c {
        return Outcome::Win(bet.saturating_mul(3) / 2);
    }
    Outcome::Loss
}
