//! Mines.
//!
//! A 5x5 grid hides a chosen number of mines. Each reveal either hits a mine
//! (round over, bet lost) or multiplies the pot by the inverse survival odds
//! of that reveal, shaved by the house edge:
//!
//! ```text
//! multiplier *= (tiles_remaining / safe_remaining) * (1 - house_edge)
//! ```
//!
//! With one mine and no edge the first reveal pays 25/24. Mine positions are
//! not pre-committed; each reveal samples a mine hit at `mines / tiles`
//! odds, which yields the same distribution over outcomes.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::Outcome;
use crate::EngineError;

/// Grid size.
pub const TILES: u8 = 25;

/// Mine counts accepted at round start.
pub const MIN_MINES: u8 = 1;
pub const MAX_MINES: u8 = 24;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MinesRound {
    mines: u8,
    tiles_remaining: u8,
    multiplier: f64,
    house_edge: f64,
}

impl MinesRound {
    pub fn new(mines: u8, house_edge: f64) -> Result<Self, EngineError> {
        if !(MIN_MINES..=MAX_MINES).contains(&mines) {
            return Err(EngineError::InvalidBet("mine count must be 1..=24"));
        }
        let house_edge = if house_edge.is_finite() {
            house_edge.clamp(0.0, 0.5)
        } else {
            0.0
        };
        Ok(Self {
            mines,
            tiles_remaining: TILES,
            multiplier: 1.0,
            house_edge,
        })
    }

    /// Pot multiplier accrued so far.
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn revealed(&self) -> u8 {
        TILES - self.tiles_remaining
    }

    fn safe_remaining(&self) -> u8 {
        self.tiles_remaining - self.mines
    }

    /// Reveal one tile.
    pub fn reveal<R: Rng>(&mut self, rng: &mut R, bet: u64) -> Outcome {
        let roll = rng.gen_range(0..self.tiles_remaining);
        if roll < self.mines {
            return Outcome::Loss;
        }
        self.multiplier *= f64::from(self.tiles_remaining) / f64::from(self.safe_remaining())
            * (1.0 - self.house_edge);
        self.tiles_remaining -= 1;
        if self.safe_remaining() == 0 {
            // Board cleared; pay out automatically.
            return Outcome::Win(self.payout(bet));
        }
        Outcome::Continue
    }

    /// Take the pot at the current multiplier.
    pub fn cashout(&self, bet: u64) -> Outcome {
        Outcome::Win(self.payout(bet))
    }

    fn payout(&self, bet: u64) -> u64 {
        (bet as f64 * self.multiplier).floor() as u64
    }
}
