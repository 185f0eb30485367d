//! Blackjack.
//!
//! Single-hand blackjack against the dealer, dealt from a fresh shuffled
//! 52-card deck each round. Aces count 11 and demote to 1 to avoid busting.
//! The dealer draws to hard 17 and hits soft 17. A player natural pays 2.5x
//! unless the dealer also holds one (push); any other win pays 2x and a tie
//! pushes.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{cards, Outcome};
use crate::EngineError;

const BLACKJACK: u8 = 21;
const DEALER_STAND: u8 = 17;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Move {
    Hit,
    Stand,
}

/// Hand total with ace demotion, plus whether the total is soft.
fn hand_value(hand: &[u8]) -> (u8, bool) {
    let mut total: u16 = 0;
    let mut aces = 0u8;
    for &card in hand {
        let v = cards::card_blackjack_value(card);
        if v == 11 {
            aces += 1;
        }
        total += u16::from(v);
    }
    while total > u16::from(BLACKJACK) && aces > 0 {
        total -= 10;
        aces -= 1;
    }
    (total as u8, aces > 0)
}

fn is_natural(hand: &[u8]) -> bool {
    hand.len() == 2 && hand_value(hand).0 == BLACKJACK
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlackjackRound {
    deck: Vec<u8>,
    player: Vec<u8>,
    dealer: Vec<u8>,
}

impl BlackjackRound {
    /// Deal a new round. Returns the round and, when either side holds a
    /// natural, the immediate outcome.
    pub fn deal<R: Rng>(rng: &mut R, bet: u64, natural_payout_x10: u64) -> (Self, Outcome) {
        let mut deck = cards::shuffled_deck(rng);
        let player = vec![take(&mut deck), take(&mut deck)];
        let dealer = vec![take(&mut deck), take(&mut deck)];
        let round = Self { deck, player, dealer };

        let outcome = match (is_natural(&round.player), is_natural(&round.dealer)) {
            (true, true) => Outcome::Win(bet),
            (true, false) => Outcome::Win(bet.saturating_mul(natural_payout_x10) / 10),
            (false, true) => Outcome::Loss,
            (false, false) => Outcome::Continue,
        };
        (round, outcome)
    }

    pub fn player_hand(&self) -> &[u8] {
        &self.player
    }

    /// The dealer's face-up card.
    pub fn dealer_upcard(&self) -> u8 {
        self.dealer[0]
    }

    pub fn player_total(&self) -> u8 {
        hand_value(&self.player).0
    }

    /// Advance the round by one move. The deck was shuffled at deal time, so
    /// no randomness is consumed here.
    pub fn play(&mut self, mv: Move, bet: u64) -> Result<Outcome, EngineError> {
        match mv {
            Move::Hit => {
                self.player.push(take(&mut self.deck));
                let (total, _) = hand_value(&self.player);
                if total > BLACKJACK {
                    Ok(Outcome::Loss)
                } else if total == BLACKJACK {
                    // Nothing left to decide; run the dealer out.
                    Ok(self.stand(bet))
                } else {
                    Ok(Outcome::Continue)
                }
            }
            Move::Stand => Ok(self.stand(bet)),
        }
    }

    fn stand(&mut self, bet: u64) -> Outcome {
        loop {
            let (total, soft) = hand_value(&self.dealer);
            if total > DEALER_STAND || (total == DEALER_STAND && !soft) {
                break;
            }
            self.dealer.push(take(&mut self.deck));
        }
        let (dealer_total, _) = hand_value(&self.dealer);
        let (player_total, _) = hand_value(&self.player);
        if dealer_total > BLACKJACK || player_total > dealer_total {
            Outcome::Win(bet.saturating_mul(2))
        } else if player_total == dealer_total {
            Outcome::Win(bet)
        } else {
            Outcome::Loss
        }
    }
}

/// Pop the next card. A single hand can never exhaust a full deck.
fn take(deck: &mut Vec<u8>) -> u8 {
    deck.pop().unwrap_or(0)
}
