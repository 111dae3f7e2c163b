use super::is_column_shuffle;
use klondike_core::model::state::GameState;
use klondike_core::moves::Move;
use klondike_core::rules::legal_moves;
use tracing::{Level, event};

/// Picks a move by fixed priority without lookahead:
/// foundation, reveal a hidden card, waste to tableau, buried King to an
/// empty column, any other tableau move, draw, recycle.
pub fn greedy_move(state: &GameState) -> Option<Move> {
    let moves = legal_moves(state);
    let (mv, rule) = choose(state, &moves)?;
    log_greedy_decision(mv, rule, moves.len());
    Some(mv)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Foundation,
    Reveal,
    WasteToTableau,
    KingToEmpty,
    TableauShift,
    Draw,
    Recycle,
}

impl Rule {
    const ORDERED: [Rule; 7] = [
        Rule::Foundation,
        Rule::Reveal,
        Rule::WasteToTableau,
        Rule::KingToEmpty,
        Rule::TableauShift,
        Rule::Draw,
        Rule::Recycle,
    ];

    const fn as_str(self) -> &'static str {
        match self {
            Rule::Foundation => "foundation",
            Rule::Reveal => "reveal",
            Rule::WasteToTableau => "waste_to_tableau",
            Rule::KingToEmpty => "king_to_empty",
            Rule::TableauShift => "tableau_shift",
            Rule::Draw => "draw",
            Rule::Recycle => "recycle",
        }
    }

    fn applies(self, state: &GameState, mv: &Move) -> bool {
        match self {
            Rule::Foundation => mv.is_foundation_move(),
            Rule::Reveal => reveals_hidden(state, mv),
            Rule::WasteToTableau => matches!(mv, Move::WasteToTableau { .. }),
            Rule::KingToEmpty => frees_buried_king(state, mv),
            Rule::TableauShift => {
                matches!(mv, Move::TableauToTableau { .. }) && !is_column_shuffle(state, mv)
            }
            Rule::Draw => matches!(mv, Move::DrawStock),
            Rule::Recycle => matches!(mv, Move::ResetStock),
        }
    }
}

fn choose(state: &GameState, moves: &[Move]) -> Option<(Move, &'static str)> {
    Rule::ORDERED.iter().find_map(|rule| {
        moves
            .iter()
            .find(|mv| rule.applies(state, mv))
            .map(|mv| (*mv, rule.as_str()))
    })
}

fn reveals_hidden(state: &GameState, mv: &Move) -> bool {
    let Move::TableauToTableau { from, start, .. } = *mv else {
        return false;
    };
    start > 0
        && state
            .column(from)
            .and_then(|column| column.cards().get(start - 1))
            .is_some_and(|below| !below.revealed)
}

fn frees_buried_king(state: &GameState, mv: &Move) -> bool {
    let Move::TableauToTableau { to, start, card, .. } = *mv else {
        return false;
    };
    card.is_king() && start > 0 && state.column(to).is_some_and(|column| column.is_empty())
}

fn log_greedy_decision(mv: Move, rule: &str, legal_count: usize) {
    if !tracing::enabled!(Level::INFO) {
        return;
    }

    event!(
        target: "klondike_bot::greedy",
        Level::INFO,
        rule,
        legal_count,
        chosen = %mv,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use klondike_core::model::card::Card;
    use klondike_core::model::pile::{Stock, Tableau, Waste};
    use klondike_core::model::rank::Rank;
    use klondike_core::model::suit::Suit;

    fn up(rank: Rank, suit: Suit) -> Card {
        Card::face_up(rank, suit)
    }

    fn down(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    #[test]
    fn foundation_beats_everything() {
        let state = GameState::from_parts(
            Stock::from_cards(vec![down(Rank::Four, Suit::Clubs)]),
            Waste::from_cards(vec![up(Rank::Eight, Suit::Diamonds)]),
            Vec::new(),
            vec![
                Tableau::from_cards(vec![down(Rank::Two, Suit::Spades), up(Rank::Ace, Suit::Hearts)]),
                Tableau::from_cards(vec![up(Rank::Nine, Suit::Clubs)]),
            ],
        );
        assert_eq!(
            greedy_move(&state),
            Some(Move::TableauToFoundation {
                column: 0,
                card: up(Rank::Ace, Suit::Hearts),
            })
        );
    }

    #[test]
    fn revealing_move_beats_waste_play() {
        let state = GameState::from_parts(
            Stock::new(),
            Waste::from_cards(vec![up(Rank::Eight, Suit::Diamonds)]),
            Vec::new(),
            vec![
                Tableau::from_cards(vec![up(Rank::Nine, Suit::Clubs)]),
                Tableau::from_cards(vec![down(Rank::Two, Suit::Spades), up(Rank::Eight, Suit::Hearts)]),
            ],
        );
        assert_eq!(
            greedy_move(&state),
            Some(Move::TableauToTableau {
                from: 1,
                to: 0,
                start: 1,
                card: up(Rank::Eight, Suit::Hearts),
            })
        );
    }

    #[test]
    fn waste_play_beats_draw() {
        let state = GameState::from_parts(
            Stock::from_cards(vec![down(Rank::Four, Suit::Clubs)]),
            Waste::from_cards(vec![up(Rank::Eight, Suit::Diamonds)]),
            Vec::new(),
            vec![Tableau::from_cards(vec![up(Rank::Nine, Suit::Clubs)])],
        );
        assert_eq!(
            greedy_move(&state),
            Some(Move::WasteToTableau {
                column: 0,
                card: up(Rank::Eight, Suit::Diamonds),
            })
        );
    }

    #[test]
    fn buried_king_moves_to_empty_column() {
        let king = up(Rank::King, Suit::Hearts);
        let state = GameState::from_parts(
            Stock::new(),
            Waste::new(),
            Vec::new(),
            vec![
                Tableau::new(),
                Tableau::from_cards(vec![up(Rank::Three, Suit::Clubs), king]),
            ],
        );
        assert_eq!(
            greedy_move(&state),
            Some(Move::TableauToTableau {
                from: 1,
                to: 0,
                start: 1,
                card: king,
            })
        );
    }

    #[test]
    fn lone_king_is_not_shuffled() {
        let state = GameState::from_parts(
            Stock::new(),
            Waste::from_cards(vec![up(Rank::Four, Suit::Clubs)]),
            Vec::new(),
            vec![Tableau::new(), Tableau::from_cards(vec![up(Rank::King, Suit::Hearts)])],
        );
        assert_eq!(greedy_move(&state), Some(Move::ResetStock));
    }

    #[test]
    fn draw_then_recycle_then_nothing() {
        let drawable = GameState::from_parts(
            Stock::from_cards(vec![down(Rank::Four, Suit::Clubs)]),
            Waste::new(),
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(greedy_move(&drawable), Some(Move::DrawStock));
        let empty = GameState::from_parts(Stock::new(), Waste::new(), Vec::new(), Vec::new());
        assert_eq!(greedy_move(&empty), None);
    }
}
