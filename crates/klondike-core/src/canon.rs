use crate::model::card::Card;
use crate::model::state::GameState;

/// (rank value, suit index, face-up).
type CardTuple = (u8, u8, bool);

/// Sort key for an empty column; real ranks start at 1 so empties lead.
const EMPTY_TAIL: CardTuple = (0, 0, false);

/// Order-insensitive identity of a position for visited sets and memo
/// tables. Tableau columns are sorted, so permuting columns yields the same
/// key while any card moving between piles yields a different one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalKey {
    tableau: Vec<Vec<CardTuple>>,
    foundations: [Vec<(u8, u8)>; 4],
    stock: Vec<(u8, u8)>,
    waste: Vec<(u8, u8)>,
}

pub fn canonical_key(state: &GameState) -> CanonicalKey {
    let mut tableau: Vec<Vec<CardTuple>> = state
        .tableau()
        .iter()
        .map(|column| column.cards().iter().copied().map(card_tuple).collect())
        .collect();
    tableau.sort_by(|a, b| {
        let tail_a = a.last().copied().unwrap_or(EMPTY_TAIL);
        let tail_b = b.last().copied().unwrap_or(EMPTY_TAIL);
        tail_a.cmp(&tail_b).then_with(|| a.cmp(b))
    });

    CanonicalKey {
        tableau,
        foundations: std::array::from_fn(|index| {
            state.foundations()[index]
                .cards()
                .iter()
                .copied()
                .map(identity_tuple)
                .collect()
        }),
        stock: state.stock().cards().iter().copied().map(identity_tuple).collect(),
        waste: state.waste().cards().iter().copied().map(identity_tuple).collect(),
    }
}

fn card_tuple(card: Card) -> CardTuple {
    (card.rank.value(), card.suit.index() as u8, card.revealed)
}

fn identity_tuple(card: Card) -> (u8, u8) {
    (card.rank.value(), card.suit.index() as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::pile::{Stock, Tableau, Waste};
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;
    use crate::moves::Move;
    use crate::rules::apply;

    fn position(columns: Vec<Tableau>) -> GameState {
        GameState::from_parts(
            Stock::from_cards(vec![Card::new(Rank::Two, Suit::Hearts)]),
            Waste::from_cards(vec![Card::new(Rank::Five, Suit::Spades)]),
            Vec::new(),
            columns,
        )
    }

    #[test]
    fn key_is_idempotent() {
        let state = GameState::deal_with_seed(42);
        assert_eq!(canonical_key(&state), canonical_key(&state.clone()));
    }

    #[test]
    fn swapping_columns_keeps_key() {
        let a = Tableau::from_cards(vec![
            Card::new(Rank::Four, Suit::Clubs),
            Card::face_up(Rank::Jack, Suit::Diamonds),
        ]);
        let b = Tableau::from_cards(vec![Card::face_up(Rank::Seven, Suit::Spades)]);
        let forward = position(vec![a.clone(), Tableau::new(), b.clone()]);
        let swapped = position(vec![b, a, Tableau::new()]);
        assert_ne!(forward, swapped);
        assert_eq!(canonical_key(&forward), canonical_key(&swapped));
    }

    #[test]
    fn draw_changes_key() {
        let state = GameState::deal_with_seed(1);
        let next = apply(&state, Move::DrawStock);
        assert_ne!(canonical_key(&state), canonical_key(&next));
    }

    #[test]
    fn face_state_is_part_of_key() {
        let hidden = position(vec![Tableau::from_cards(vec![Card::new(
            Rank::Nine,
            Suit::Clubs,
        )])]);
        let shown = position(vec![Tableau::from_cards(vec![Card::face_up(
            Rank::Nine,
            Suit::Clubs,
        )])]);
        assert_ne!(canonical_key(&hidden), canonical_key(&shown));
    }
}
