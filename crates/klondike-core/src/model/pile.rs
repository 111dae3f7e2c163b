use crate::model::card::Card;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use serde::{Deserialize, Serialize};

/// Face-down draw pile. The top card is the last element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stock {
    cards: Vec<Card>,
}

impl Stock {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self {
            cards: cards.into_iter().map(|card| card.flipped(false)).collect(),
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card.flipped(false));
    }

    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Turns the whole waste back over: the waste top becomes the stock bottom.
    pub fn recycle_from(&mut self, waste: &mut Waste) {
        while let Some(card) = waste.pop() {
            self.push(card);
        }
    }
}

/// Face-up discard pile fed by the stock; only its top card is playable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Waste {
    cards: Vec<Card>,
}

impl Waste {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self {
            cards: cards.into_iter().map(|card| card.flipped(true)).collect(),
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn top(&self) -> Option<Card> {
        self.cards.last().copied()
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card.flipped(true));
    }

    pub fn pop(&mut self) -> Option<Card> {
        self.cards.pop()
    }
}

/// Single-suit completion pile built Ace up to King.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Foundation {
    suit: Suit,
    cards: Vec<Card>,
}

impl Foundation {
    pub fn new(suit: Suit) -> Self {
        Self {
            suit,
            cards: Vec::with_capacity(Rank::ORDERED.len()),
        }
    }

    /// Builds a foundation holding Ace..=`through` of `suit`.
    pub fn filled_through(suit: Suit, through: Rank) -> Self {
        let cards = Rank::ORDERED
            .iter()
            .copied()
            .take_while(|rank| *rank <= through)
            .map(|rank| Card::face_up(rank, suit))
            .collect();
        Self { suit, cards }
    }

    pub fn suit(&self) -> Suit {
        self.suit
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.cards.len() == Rank::ORDERED.len()
    }

    pub fn top(&self) -> Option<Card> {
        self.cards.last().copied()
    }

    pub fn can_add(&self, card: Card) -> bool {
        if card.suit != self.suit {
            return false;
        }
        match self.top() {
            None => card.rank == Rank::Ace,
            Some(top) => card.rank.is_directly_above(top.rank),
        }
    }

    pub fn add(&mut self, card: Card) -> bool {
        if !self.can_add(card) {
            return false;
        }
        self.cards.push(card.flipped(true));
        true
    }
}

/// One playing column: face-down cards under a face-up tail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tableau {
    cards: Vec<Card>,
}

impl Tableau {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn top(&self) -> Option<Card> {
        self.cards.last().copied()
    }

    /// The top card when it is face-up; a covered top accepts nothing.
    pub fn top_revealed(&self) -> Option<Card> {
        self.top().filter(|card| card.revealed)
    }

    pub fn can_add(&self, card: Card) -> bool {
        if self.cards.is_empty() {
            return card.is_king();
        }
        match self.top_revealed() {
            Some(top) => card.stacks_on(top),
            None => false,
        }
    }

    /// True when `cards[start..]` are all face-up and alternate colors in
    /// strictly descending rank.
    pub fn is_valid_run_from(&self, start: usize) -> bool {
        let Some(tail) = self.cards.get(start..) else {
            return false;
        };
        if tail.is_empty() || tail.iter().any(|card| !card.revealed) {
            return false;
        }
        tail.windows(2).all(|pair| pair[1].stacks_on(pair[0]))
    }

    /// Index where the maximal trailing run begins, if the top is face-up.
    pub fn run_start(&self) -> Option<usize> {
        let top = self.cards.len().checked_sub(1)?;
        if !self.cards[top].revealed {
            return None;
        }
        let mut start = top;
        while start > 0 {
            let below = self.cards[start - 1];
            if !below.revealed || !self.cards[start].stacks_on(below) {
                break;
            }
            start -= 1;
        }
        Some(start)
    }

    pub fn run_len(&self) -> usize {
        self.run_start()
            .map(|start| self.cards.len() - start)
            .unwrap_or(0)
    }

    pub fn hidden_count(&self) -> usize {
        self.cards.iter().filter(|card| !card.revealed).count()
    }

    pub fn revealed_count(&self) -> usize {
        self.cards.len() - self.hidden_count()
    }

    /// Index of a face-up King heading a movable run above other cards.
    pub fn buried_king(&self) -> Option<usize> {
        (1..self.cards.len())
            .find(|&index| self.cards[index].is_king() && self.is_valid_run_from(index))
    }

    pub(crate) fn push(&mut self, card: Card) {
        self.cards.push(card.flipped(true));
    }

    pub(crate) fn pop(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub(crate) fn split_off(&mut self, start: usize) -> Vec<Card> {
        self.cards.split_off(start)
    }

    pub(crate) fn reveal_top(&mut self) {
        if let Some(top) = self.cards.last_mut() {
            top.revealed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn up(rank: Rank, suit: Suit) -> Card {
        Card::face_up(rank, suit)
    }

    #[test]
    fn empty_tableau_accepts_only_kings() {
        let column = Tableau::new();
        assert!(column.can_add(up(Rank::King, Suit::Clubs)));
        assert!(!column.can_add(up(Rank::Queen, Suit::Hearts)));
    }

    #[test]
    fn tableau_requires_alternating_descending() {
        let column = Tableau::from_cards(vec![up(Rank::Nine, Suit::Spades)]);
        assert!(column.can_add(up(Rank::Eight, Suit::Diamonds)));
        assert!(!column.can_add(up(Rank::Eight, Suit::Clubs)));
        assert!(!column.can_add(up(Rank::Seven, Suit::Hearts)));
    }

    #[test]
    fn covered_top_rejects_everything() {
        let column = Tableau::from_cards(vec![Card::new(Rank::Nine, Suit::Spades)]);
        assert!(!column.can_add(up(Rank::Eight, Suit::Diamonds)));
    }

    #[test]
    fn run_start_stops_at_hidden_card() {
        let column = Tableau::from_cards(vec![
            Card::new(Rank::Two, Suit::Clubs),
            up(Rank::Nine, Suit::Spades),
            up(Rank::Eight, Suit::Hearts),
            up(Rank::Seven, Suit::Clubs),
        ]);
        assert_eq!(column.run_start(), Some(1));
        assert_eq!(column.run_len(), 3);
        assert!(column.is_valid_run_from(1));
        assert!(column.is_valid_run_from(3));
        assert!(!column.is_valid_run_from(0));
        assert!(!column.is_valid_run_from(4));
    }

    #[test]
    fn run_start_stops_at_broken_sequence() {
        let column = Tableau::from_cards(vec![
            up(Rank::Nine, Suit::Spades),
            up(Rank::Five, Suit::Hearts),
            up(Rank::Four, Suit::Clubs),
        ]);
        assert_eq!(column.run_start(), Some(1));
        assert!(!column.is_valid_run_from(0));
    }

    #[test]
    fn foundation_builds_ace_upwards() {
        let mut foundation = Foundation::new(Suit::Hearts);
        assert!(!foundation.can_add(up(Rank::Two, Suit::Hearts)));
        assert!(!foundation.can_add(up(Rank::Ace, Suit::Spades)));
        assert!(foundation.add(up(Rank::Ace, Suit::Hearts)));
        assert!(foundation.add(up(Rank::Two, Suit::Hearts)));
        assert_eq!(foundation.len(), 2);
    }

    #[test]
    fn filled_foundation_is_complete() {
        let foundation = Foundation::filled_through(Suit::Clubs, Rank::King);
        assert!(foundation.is_complete());
        assert!(!foundation.can_add(up(Rank::King, Suit::Clubs)));
    }

    #[test]
    fn recycle_turns_waste_over() {
        let mut stock = Stock::new();
        let mut waste = Waste::from_cards(vec![
            Card::new(Rank::Ace, Suit::Clubs),
            Card::new(Rank::Two, Suit::Clubs),
        ]);
        stock.recycle_from(&mut waste);
        assert!(waste.is_empty());
        assert_eq!(stock.len(), 2);
        assert!(stock.cards().iter().all(|card| !card.revealed));
        assert_eq!(stock.draw().map(|c| c.rank), Some(Rank::Ace));
    }

    #[test]
    fn buried_king_detection() {
        let bare = Tableau::from_cards(vec![up(Rank::King, Suit::Spades)]);
        assert_eq!(bare.buried_king(), None);
        let buried = Tableau::from_cards(vec![
            Card::new(Rank::Three, Suit::Clubs),
            up(Rank::King, Suit::Spades),
            up(Rank::Queen, Suit::Hearts),
        ]);
        assert_eq!(buried.buried_king(), Some(1));
    }
}
