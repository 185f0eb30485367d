//! Shared playing-card helpers.
//!
//! Cards are encoded as `0..=51`, where:
//! - suit = card / 13 (0..=3)
//! - rank = card % 13 (0..=12, 0 is Ace)

use rand::seq::SliceRandom;
use rand::Rng;

/// Total cards in a standard deck.
pub(crate) const CARDS_PER_DECK: u8 = 52;

/// Ranks per suit.
pub(crate) const RANKS_PER_SUIT: u8 = 13;

/// Returns the 0-based rank (0..=12), where 0 is Ace.
pub(crate) fn card_rank(card: u8) -> u8 {
    card % RANKS_PER_SUIT
}

/// Returns the 1-based rank (1..=13), where 1 is Ace and 13 is King.
pub(crate) fn card_rank_one_based(card: u8) -> u8 {
    card_rank(card) + 1
}

/// Returns the rank for comparisons (2..=14), where Ace is high (14).
pub(crate) fn card_rank_ace_high(card: u8) -> u8 {
    let r = card_rank_one_based(card);
    if r == 1 {
        14
    } else {
        r
    }
}

/// Blackjack value of a single card before ace demotion (Ace = 11).
pub(crate) fn card_blackjack_value(card: u8) -> u8 {
    match card_rank_one_based(card) {
        1 => 11,
        r if r >= 10 => 10,
        r => r,
    }
}

/// A freshly shuffled 52-card deck.
pub(crate) fn shuffled_deck<R: Rng>(rng: &mut R) -> Vec<u8> {
    let mut deck: Vec<u8> = (0..CARDS_PER_DECK).collect();
    deck.shuffle(rng);
    deck
}

/// Draw one card uniformly, with replacement.
pub(crate) fn draw_with_replacement<R: Rng>(rng: &mut R) -> u8 {
    rng.gen_range(0..CARDS_PER_DECK)
}
