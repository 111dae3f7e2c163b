use crate::bot::ScoreWeights;
use klondike_core::model::state::GameState;

/// Scores `state` with the default weights. Higher is better.
pub fn score(state: &GameState) -> f64 {
    score_with(state, &ScoreWeights::default())
}

pub fn score_with(state: &GameState, weights: &ScoreWeights) -> f64 {
    let mut total = 0.0;

    let mut foundation_total = 0usize;
    for foundation in state.foundations() {
        let size = foundation.len() as f64;
        foundation_total += foundation.len();
        total += weights.foundation_card * size;
        total += weights.foundation_square * size * size;
    }

    total += if foundation_total > 40 {
        weights.progress_bonus_40
    } else if foundation_total > 30 {
        weights.progress_bonus_30
    } else if foundation_total > 20 {
        weights.progress_bonus_20
    } else {
        0.0
    };

    let tableau = state.tableau();
    let revealed: usize = tableau.iter().map(|column| column.revealed_count()).sum();
    total += weights.revealed_card * revealed as f64;

    let empty = state.empty_columns() as f64;
    let king_waiting = tableau.iter().any(|column| column.buried_king().is_some())
        || state.waste().top().is_some_and(|card| card.is_king());
    let factor = if king_waiting {
        weights.empty_column_king_factor
    } else {
        1.0
    };
    total += weights.empty_column * empty * factor;

    let run_cards: usize = tableau.iter().map(|column| column.run_len()).sum();
    total += weights.run_card * run_cards as f64;

    total -= weights.stock_card_penalty * state.stock().len() as f64;
    total -= weights.waste_card_penalty * state.waste().len() as f64;

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use klondike_core::model::card::Card;
    use klondike_core::model::pile::{Foundation, Stock, Tableau, Waste};
    use klondike_core::model::rank::Rank;
    use klondike_core::model::suit::Suit;

    fn with_foundations(foundations: Vec<Foundation>, columns: Vec<Tableau>) -> GameState {
        GameState::from_parts(Stock::new(), Waste::new(), foundations, columns)
    }

    #[test]
    fn more_foundation_cards_score_higher() {
        let columns = vec![Tableau::from_cards(vec![Card::face_up(
            Rank::Nine,
            Suit::Clubs,
        )])];
        let mut previous = f64::NEG_INFINITY;
        for rank in Rank::ORDERED {
            let state = with_foundations(
                vec![Foundation::filled_through(Suit::Hearts, rank)],
                columns.clone(),
            );
            let value = score(&state);
            assert!(value > previous, "{rank} did not improve the score");
            previous = value;
        }
    }

    #[test]
    fn progress_bonus_kicks_in_past_twenty() {
        let twenty = with_foundations(
            vec![
                Foundation::filled_through(Suit::Hearts, Rank::Ten),
                Foundation::filled_through(Suit::Spades, Rank::Ten),
            ],
            Vec::new(),
        );
        let twenty_one = with_foundations(
            vec![
                Foundation::filled_through(Suit::Hearts, Rank::Jack),
                Foundation::filled_through(Suit::Spades, Rank::Ten),
            ],
            Vec::new(),
        );
        let weights = ScoreWeights::default();
        let step = score(&twenty_one) - score(&twenty);
        assert!(step > weights.progress_bonus_20);
    }

    #[test]
    fn empty_column_counts_more_with_waiting_king() {
        let plain = with_foundations(
            Vec::new(),
            vec![
                Tableau::new(),
                Tableau::from_cards(vec![
                    Card::new(Rank::Two, Suit::Clubs),
                    Card::face_up(Rank::Queen, Suit::Spades),
                ]),
            ],
        );
        let waiting = with_foundations(
            Vec::new(),
            vec![
                Tableau::new(),
                Tableau::from_cards(vec![
                    Card::new(Rank::Two, Suit::Clubs),
                    Card::face_up(Rank::King, Suit::Spades),
                ]),
            ],
        );
        let weights = ScoreWeights::default();
        let gap = score(&waiting) - score(&plain);
        let expected = weights.empty_column * (weights.empty_column_king_factor - 1.0);
        assert!((gap - expected).abs() < 1e-9);
    }

    #[test]
    fn stock_and_waste_are_penalised() {
        let drawn = GameState::from_parts(
            Stock::new(),
            Waste::from_cards(vec![Card::face_up(Rank::Four, Suit::Hearts)]),
            Vec::new(),
            Vec::new(),
        );
        let stocked = GameState::from_parts(
            Stock::from_cards(vec![Card::new(Rank::Four, Suit::Hearts)]),
            Waste::new(),
            Vec::new(),
            Vec::new(),
        );
        assert!(score(&stocked) > score(&drawn));
        assert!(score(&stocked) < 0.0);
    }
}
