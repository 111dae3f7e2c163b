use crate::model::card::Card;
use crate::model::deck::{DECK_SIZE, Deck};
use crate::model::pile::{Foundation, Stock, Tableau, Waste};
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use serde::{Deserialize, Serialize};
use std::array;
use std::collections::HashSet;

pub const TABLEAU_COLUMNS: usize = 7;

/// Complete Klondike position. Search code treats it as an immutable value:
/// every transition clones into a fresh state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameState {
    stock: Stock,
    waste: Waste,
    foundations: [Foundation; 4],
    tableau: Vec<Tableau>,
}

impl GameState {
    pub fn deal(deck: &Deck) -> Self {
        Self::deal_with_columns(deck, TABLEAU_COLUMNS)
    }

    pub fn deal_with_seed(seed: u64) -> Self {
        Self::deal(&Deck::shuffled_with_seed(seed))
    }

    /// Column `i` receives `i + 1` cards with only the last face-up; the
    /// remainder becomes the stock in deck order.
    pub fn deal_with_columns(deck: &Deck, columns: usize) -> Self {
        let mut cards = deck.cards().iter().copied();
        let mut tableau = Vec::with_capacity(columns);
        for column in 0..columns {
            let mut dealt = Vec::with_capacity(column + 1);
            for position in 0..=column {
                if let Some(card) = cards.next() {
                    dealt.push(card.flipped(position == column));
                }
            }
            tableau.push(Tableau::from_cards(dealt));
        }

        Self {
            stock: Stock::from_cards(cards.collect()),
            waste: Waste::new(),
            foundations: array::from_fn(|index| Foundation::new(Suit::ALL[index])),
            tableau,
        }
    }

    /// Assembles a position from explicit piles. Foundations are re-keyed by
    /// suit so callers may pass them in any order.
    pub fn from_parts(
        stock: Stock,
        waste: Waste,
        foundations: Vec<Foundation>,
        tableau: Vec<Tableau>,
    ) -> Self {
        let mut slots: [Foundation; 4] = array::from_fn(|index| Foundation::new(Suit::ALL[index]));
        for foundation in foundations {
            let index = foundation.suit().index();
            slots[index] = foundation;
        }
        Self {
            stock,
            waste,
            foundations: slots,
            tableau,
        }
    }

    pub fn stock(&self) -> &Stock {
        &self.stock
    }

    pub fn waste(&self) -> &Waste {
        &self.waste
    }

    pub fn foundations(&self) -> &[Foundation; 4] {
        &self.foundations
    }

    pub fn foundation(&self, suit: Suit) -> &Foundation {
        &self.foundations[suit.index()]
    }

    pub fn tableau(&self) -> &[Tableau] {
        &self.tableau
    }

    pub fn column(&self, index: usize) -> Option<&Tableau> {
        self.tableau.get(index)
    }

    pub(crate) fn waste_mut(&mut self) -> &mut Waste {
        &mut self.waste
    }

    pub(crate) fn draw_piles_mut(&mut self) -> (&mut Stock, &mut Waste) {
        (&mut self.stock, &mut self.waste)
    }

    pub(crate) fn foundation_mut(&mut self, suit: Suit) -> &mut Foundation {
        &mut self.foundations[suit.index()]
    }

    pub(crate) fn column_mut(&mut self, index: usize) -> Option<&mut Tableau> {
        self.tableau.get_mut(index)
    }

    pub fn foundation_total(&self) -> usize {
        self.foundations.iter().map(Foundation::len).sum()
    }

    pub fn is_won(&self) -> bool {
        self.foundations.iter().all(Foundation::is_complete)
    }

    pub fn hidden_count(&self) -> usize {
        self.tableau.iter().map(Tableau::hidden_count).sum()
    }

    pub fn empty_columns(&self) -> usize {
        self.tableau.iter().filter(|column| column.is_empty()).count()
    }

    /// Every card in the position, pile by pile.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.stock
            .cards()
            .iter()
            .chain(self.waste.cards())
            .chain(self.foundations.iter().flat_map(|f| f.cards()))
            .chain(self.tableau.iter().flat_map(|t| t.cards()))
    }

    /// True when the piles hold exactly one standard deck.
    pub fn deck_is_complete(&self) -> bool {
        let mut seen: HashSet<(Rank, Suit)> = HashSet::with_capacity(DECK_SIZE);
        for card in self.cards() {
            if !seen.insert(card.identity()) {
                return false;
            }
        }
        seen.len() == DECK_SIZE
    }
}
