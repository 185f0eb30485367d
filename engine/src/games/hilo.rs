//! Hi-lo.
//!
//! The player sees one card and guesses whether the next draw ranks higher
//! or lower. Ranks run 2..=14 with Ace high; draws are with replacement from
//! a full deck. A tie loses. Each correct guess grows the pot multiplier by
//! a step scaled by the risk taken:
//!
//! ```text
//! multiplier += step * (losing_ranks / winning_ranks)
//! ```
//!
//! where ties count among the losing ranks. Guessing higher at an Ace (or
//! lower at a 2) has no winning ranks and is rejected.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{cards, Outcome};
use crate::EngineError;

/// Lowest and highest comparison ranks.
const RANK_LOW: u8 = 2;
const RANK_HIGH: u8 = 14;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Guess {
    Higher,
    Lower,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HiloRound {
    /// Current card, encoded 0..=51.
    current: u8,
    multiplier: f64,
    correct_guesses: u32,
}

impl HiloRound {
    pub fn deal<R: Rng>(rng: &mut R) -> Self {
        Self {
            current: cards::draw_with_replacement(rng),
            multiplier: 1.0,
            correct_guesses: 0,
        }
    }

    /// Comparison rank of the face-up card (2..=14, Ace high).
    pub fn current_rank(&self) -> u8 {
        cards::card_rank_ace_high(self.current)
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn correct_guesses(&self) -> u32 {
        self.correct_guesses
    }

    /// Ranks that would win the given guess from the current card.
    fn winning_ranks(&self, guess: Guess) -> u8 {
        let rank = self.current_rank();
        match guess {
            Guess::Higher => RANK_HIGH - rank,
            Guess::Lower => rank - RANK_LOW,
        }
    }

    /// Guess the next card and draw it.
    pub fn guess<R: Rng>(
        &mut self,
        rng: &mut R,
        guess: Guess,
        step: f64,
    ) -> Result<Outcome, EngineError> {
        let winning = self.winning_ranks(guess);
        if winning == 0 {
            return Err(EngineError::InvalidMove);
        }
        // 13 comparison ranks total; ties side with the house.
        let losing = 13 - winning;

        let next = cards::draw_with_replacement(rng);
        let rank = self.current_rank();
        let next_rank = cards::card_rank_ace_high(next);
        let won = match guess {
            Guess::Higher => next_rank > rank,
            Guess::Lower => next_rank < rank,
        };
        if !won {
            return Ok(Outcome::Loss);
        }
        let step = if step.is_finite() && step > 0.0 { step } else { 0.2 };
        self.multiplier += step * f64::from(losing) / f64::from(winning);
        self.current = next;
        self.correct_guesses += 1;
        Ok(Outcome::Continue)
    }

    /// Take the pot at the current multiplier.
    pub fn cashout(&self, bet: u64) -> Outcome {
        Outcome::Win((bet as f64 * self.multiplier).floor() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn round_at(card: u8) -> HiloRound {
        HiloRound {
            current: card,
            multiplier: 1.0,
            correct_guesses: 0,
        }
    }

    #[test]
    fn test_edge_rank_guesses_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        // Card 0 is an Ace (rank 14): nothing is higher.
        let mut at_ace = round_at(0);
        assert_eq!(at_ace.guess(&mut rng, Guess::Higher, 0.2), Err(EngineError::InvalidMove));
        // Card 1 is a 2: nothing is lower.
        let mut at_two = round_at(1);
        assert_eq!(at_two.guess(&mut rng, Guess::Lower, 0.2), Err(EngineError::InvalidMove));
    }

    #[test]
    fn test_risk_scaled_step() {
        // From an Ace, guessing lower wins on 12 of 13 ranks: the step is
        // scaled down to 0.2 * 1/12.
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut round = round_at(0);
        loop {
            let mut attempt = round.clone();
            if attempt.guess(&mut rng, Guess::Lower, 0.2).unwrap() == Outcome::Continue {
                round = attempt;
                break;
            }
        }
        assert!((round.multiplier() - (1.0 + 0.2 / 12.0)).abs() < 1e-12);

        // From a 7, guessing higher wins on 7 ranks (8..=14) and loses on 6
        // (ties included), so the step is 0.2 * 6/7.
        let mut round = round_at(6); // rank_one_based 7 -> ace-high 7
        assert_eq!(round.current_rank(), 7);
        loop {
            let mut attempt = round.clone();
            if attempt.guess(&mut rng, Guess::Higher, 0.2).unwrap() == Outcome::Continue {
                round = attempt;
                break;
            }
        }
        assert!((round.multiplier() - (1.0 + 0.2 * 6.0 / 7.0)).abs() < 1e-12);
    }

    #[test]
    fn test_tie_is_a_loss() {
        // Win rate guessing higher from a 2 should be 12/13, not 1: ties on
        // the 4 remaining twos lose.
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mut wins = 0;
        for _ in 0..26_000 {
            let mut round = round_at(1);
            if round.guess(&mut rng, Guess::Higher, 0.2).unwrap() == Outcome::Continue {
                wins += 1;
            }
        }
        let rate = f64::from(wins) / 26_000.0;
        let expected = 12.0 / 13.0;
        assert!((rate - expected).abs() < 0.01, "win rate: {rate}");
    }

    #[test]
    fn test_cashout_floors() {
        let mut round = round_at(0);
        round.multiplier = 1.5;
        assert_eq!(round.cashout(101), Outcome::Win(151));
        assert_eq!(round.cashout(0), Outcome::Win(0));
    }
}
