//! Casino games.
//!
//! Each game is a self-contained state machine over an injected random
//! source. The store debits the bet when a round starts; a finished round
//! reports the total credit to return, so a push pays back exactly the bet
//! and a loss pays nothing.

pub mod blackjack;
pub(crate) mod cards;
pub mod coinflip;
pub mod hilo;
pub mod mines;
pub mod roulette;
pub mod slots;

use serde::{Deserialize, Serialize};

/// Result of advancing a round by one move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The round continues; more moves are expected.
    Continue,
    /// The round is over; credit this amount back to the player.
    Win(u64),
    /// The round is over; the bet is forfeit.
    Loss,
}

impl Outcome {
    pub fn is_final(self) -> bool {
        !matches!(self, Outcome::Continue)
    }
}

/// Which game a round belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    Mines,
    Hilo,
    Blackjack,
    Roulette,
    Slots,
    Coinflip,
}

impl GameKind {
    pub fn name(self) -> &'static str {
        match self {
            GameKind::Mines => "mines",
            GameKind::Hilo => "hilo",
            GameKind::Blackjack => "blackjack",
            GameKind::Roulette => "roulette",
            GameKind::Slots => "slots",
            GameKind::Coinflip => "coinflip",
        }
    }
}

/// Game-specific state of a multi-move round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RoundState {
    Mines(mines::MinesRound),
    Hilo(hilo::HiloRound),
    Blackjack(blackjack::BlackjackRound),
}

impl RoundState {
    pub fn kind(&self) -> GameKind {
        match self {
            RoundState::Mines(_) => GameKind::Mines,
            RoundState::Hilo(_) => GameKind::Hilo,
            RoundState::Blackjack(_) => GameKind::Blackjack,
        }
    }
}

/// One open multi-move casino round.
///
/// Single-shot games (roulette, slots, coinflip) resolve inline and never
/// produce a `Round`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub id: u64,
    pub account: String,
    pub bet: u64,
    pub state: RoundState,
}
