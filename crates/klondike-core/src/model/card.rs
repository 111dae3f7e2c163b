use crate::model::rank::Rank;
use crate::model::suit::{Color, Suit};
use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
    #[serde(default)]
    pub revealed: bool,
}

impl Card {
    /// Builds a face-down card.
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self {
            rank,
            suit,
            revealed: false,
        }
    }

    pub const fn face_up(rank: Rank, suit: Suit) -> Self {
        Self {
            rank,
            suit,
            revealed: true,
        }
    }

    pub const fn flipped(self, revealed: bool) -> Self {
        Self {
            rank: self.rank,
            suit: self.suit,
            revealed,
        }
    }

    pub const fn color(self) -> Color {
        self.suit.color()
    }

    pub const fn is_red(self) -> bool {
        self.suit.is_red()
    }

    pub const fn is_king(self) -> bool {
        matches!(self.rank, Rank::King)
    }

    /// The (rank, suit) pair; a deck holds exactly one card per identity.
    pub const fn identity(self) -> (Rank, Suit) {
        (self.rank, self.suit)
    }

    /// True when `self` may be placed directly on `below` in a tableau run.
    pub fn stacks_on(self, below: Card) -> bool {
        below.rank.is_directly_above(self.rank) && self.is_red() != below.is_red()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

#[cfg(test)]
mod tests {
    use super::{Card, Rank, Suit};

    #[test]
    fn new_cards_are_face_down() {
        let card = Card::new(Rank::Seven, Suit::Clubs);
        assert!(!card.revealed);
        assert!(Card::face_up(Rank::Seven, Suit::Clubs).revealed);
    }

    #[test]
    fn red_seven_stacks_on_black_eight() {
        let seven = Card::face_up(Rank::Seven, Suit::Hearts);
        let eight = Card::face_up(Rank::Eight, Suit::Spades);
        assert!(seven.stacks_on(eight));
        assert!(!eight.stacks_on(seven));
    }

    #[test]
    fn same_color_never_stacks() {
        let seven = Card::face_up(Rank::Seven, Suit::Diamonds);
        let eight = Card::face_up(Rank::Eight, Suit::Hearts);
        assert!(!seven.stacks_on(eight));
    }

    #[test]
    fn display_ignores_face() {
        assert_eq!(Card::new(Rank::King, Suit::Spades).to_string(), "KS");
        assert_eq!(Card::face_up(Rank::Ten, Suit::Hearts).to_string(), "10H");
    }
}
