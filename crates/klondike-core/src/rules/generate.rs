use crate::model::state::GameState;
use crate::moves::Move;

/// Every move the rules allow from `state`, without duplicates.
///
/// Order is stable (waste moves, then columns left to right, then the stock)
/// but callers must not rely on it for priority.
pub fn legal_moves(state: &GameState) -> Vec<Move> {
    let mut moves = Vec::new();
    let tableau = state.tableau();

    if let Some(card) = state.waste().top() {
        if state.foundation(card.suit).can_add(card) {
            moves.push(Move::WasteToFoundation { card });
        }
        for (column, pile) in tableau.iter().enumerate() {
            if pile.can_add(card) {
                moves.push(Move::WasteToTableau { column, card });
            }
        }
    }

    for (from, pile) in tableau.iter().enumerate() {
        let Some(run_start) = pile.run_start() else {
            continue;
        };
        let top = pile.len() - 1;
        // Every index inside the trailing run starts a valid sub-run.
        for start in run_start..=top {
            let card = pile.cards()[start];
            if start == top && state.foundation(card.suit).can_add(card) {
                moves.push(Move::TableauToFoundation { column: from, card });
            }
            for (to, target) in tableau.iter().enumerate() {
                if to != from && target.can_add(card) {
                    moves.push(Move::TableauToTableau {
                        from,
                        to,
                        start,
                        card,
                    });
                }
            }
        }
    }

    if !state.stock().is_empty() {
        moves.push(Move::DrawStock);
    } else if !state.waste().is_empty() {
        moves.push(Move::ResetStock);
    }

    moves
}

#[cfg(test)]
mod tests {
    use super::legal_moves;
    use crate::model::card::Card;
    use crate::model::pile::{Foundation, Stock, Tableau, Waste};
    use crate::model::rank::Rank;
    use crate::model::state::GameState;
    use crate::model::suit::Suit;
    use crate::moves::Move;
    use std::collections::HashSet;

    fn up(rank: Rank, suit: Suit) -> Card {
        Card::face_up(rank, suit)
    }

    fn down(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    #[test]
    fn waste_ace_goes_to_foundation() {
        let state = GameState::from_parts(
            Stock::new(),
            Waste::from_cards(vec![up(Rank::Ace, Suit::Hearts)]),
            Vec::new(),
            vec![Tableau::new(); 2],
        );
        let moves = legal_moves(&state);
        assert!(moves.contains(&Move::WasteToFoundation {
            card: up(Rank::Ace, Suit::Hearts)
        }));
        assert!(moves.contains(&Move::ResetStock));
        assert!(!moves.contains(&Move::DrawStock));
    }

    #[test]
    fn every_sub_run_is_offered() {
        let state = GameState::from_parts(
            Stock::new(),
            Waste::new(),
            Vec::new(),
            vec![
                Tableau::from_cards(vec![
                    down(Rank::Two, Suit::Clubs),
                    up(Rank::King, Suit::Spades),
                    up(Rank::Queen, Suit::Hearts),
                ]),
                Tableau::new(),
                Tableau::from_cards(vec![up(Rank::King, Suit::Clubs)]),
            ],
        );
        let moves = legal_moves(&state);
        assert!(moves.contains(&Move::TableauToTableau {
            from: 0,
            to: 1,
            start: 1,
            card: up(Rank::King, Suit::Spades),
        }));
        assert!(moves.contains(&Move::TableauToTableau {
            from: 0,
            to: 2,
            start: 2,
            card: up(Rank::Queen, Suit::Hearts),
        }));
        // The lone King may also shuffle into the empty column.
        assert!(moves.contains(&Move::TableauToTableau {
            from: 2,
            to: 1,
            start: 0,
            card: up(Rank::King, Suit::Clubs),
        }));
        assert!(
            !moves
                .iter()
                .any(|mv| matches!(mv, Move::TableauToTableau { start: 0, from: 0, .. }))
        );
    }

    #[test]
    fn foundation_only_from_column_top() {
        let state = GameState::from_parts(
            Stock::new(),
            Waste::new(),
            vec![Foundation::filled_through(Suit::Spades, Rank::Eight)],
            vec![Tableau::from_cards(vec![
                up(Rank::Ten, Suit::Hearts),
                up(Rank::Nine, Suit::Spades),
            ])],
        );
        let moves = legal_moves(&state);
        assert_eq!(
            moves,
            vec![Move::TableauToFoundation {
                column: 0,
                card: up(Rank::Nine, Suit::Spades)
            }]
        );
    }

    #[test]
    fn generated_moves_are_unique() {
        for seed in 0..20 {
            let state = GameState::deal_with_seed(seed);
            let moves = legal_moves(&state);
            let unique: HashSet<_> = moves.iter().collect();
            assert_eq!(unique.len(), moves.len());
        }
    }

    #[test]
    fn no_moves_in_empty_position() {
        let state = GameState::from_parts(Stock::new(), Waste::new(), Vec::new(), Vec::new());
        assert!(legal_moves(&state).is_empty());
    }
}
