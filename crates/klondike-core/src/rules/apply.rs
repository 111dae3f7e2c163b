use crate::model::card::Card;
use crate::model::state::GameState;
use crate::moves::Move;
use std::fmt;

/// Reasons a move is rejected against a particular state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    EmptyStock,
    StockNotEmpty,
    EmptyWaste,
    NoSuchColumn(usize),
    SameColumn(usize),
    CardMismatch { expected: Card, found: Option<Card> },
    NotARun { column: usize, start: usize },
    Rejected(Move),
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveError::EmptyStock => write!(f, "stock is empty"),
            MoveError::StockNotEmpty => write!(f, "stock still holds cards"),
            MoveError::EmptyWaste => write!(f, "waste is empty"),
            MoveError::NoSuchColumn(column) => write!(f, "column {column} does not exist"),
            MoveError::SameColumn(column) => {
                write!(f, "column {column} cannot move onto itself")
            }
            MoveError::CardMismatch { expected, found } => match found {
                Some(found) => write!(f, "expected {expected} but found {found}"),
                None => write!(f, "expected {expected} but the pile is empty"),
            },
            MoveError::NotARun { column, start } => {
                write!(f, "column {column} has no movable run from index {start}")
            }
            MoveError::Rejected(mv) => write!(f, "target pile rejects: {mv}"),
        }
    }
}

impl std::error::Error for MoveError {}

/// Applies `mv` to a copy of `state`. An illegal move leaves the position
/// untouched; use [`try_apply`] to learn why it was rejected.
pub fn apply(state: &GameState, mv: Move) -> GameState {
    try_apply(state, mv).unwrap_or_else(|_| state.clone())
}

pub fn try_apply(state: &GameState, mv: Move) -> Result<GameState, MoveError> {
    check(state, mv)?;
    let mut next = state.clone();
    match mv {
        Move::DrawStock => {
            let (stock, waste) = next.draw_piles_mut();
            if let Some(card) = stock.draw() {
                waste.push(card);
            }
        }
        Move::ResetStock => {
            let (stock, waste) = next.draw_piles_mut();
            stock.recycle_from(waste);
        }
        Move::WasteToFoundation { .. } => {
            if let Some(card) = next.waste_mut().pop() {
                next.foundation_mut(card.suit).add(card);
            }
        }
        Move::WasteToTableau { column, .. } => {
            let popped = next.waste_mut().pop();
            if let (Some(card), Some(pile)) = (popped, next.column_mut(column)) {
                pile.push(card);
            }
        }
        Move::TableauToFoundation { column, .. } => {
            let popped = next.column_mut(column).and_then(|pile| {
                let card = pile.pop();
                pile.reveal_top();
                card
            });
            if let Some(card) = popped {
                next.foundation_mut(card.suit).add(card);
            }
        }
        Move::TableauToTableau {
            from, to, start, ..
        } => {
            let moved = match next.column_mut(from) {
                Some(pile) => {
                    let run = pile.split_off(start);
                    pile.reveal_top();
                    run
                }
                None => Vec::new(),
            };
            if let Some(target) = next.column_mut(to) {
                for card in moved {
                    target.push(card);
                }
            }
        }
    }
    Ok(next)
}

/// Mirrors the generator's acceptance rules for a single move.
fn check(state: &GameState, mv: Move) -> Result<(), MoveError> {
    match mv {
        Move::DrawStock => {
            if state.stock().is_empty() {
                return Err(MoveError::EmptyStock);
            }
        }
        Move::ResetStock => {
            if !state.stock().is_empty() {
                return Err(MoveError::StockNotEmpty);
            }
            if state.waste().is_empty() {
                return Err(MoveError::EmptyWaste);
            }
        }
        Move::WasteToFoundation { card } => {
            let top = matching_waste_top(state, card)?;
            if !state.foundation(top.suit).can_add(top) {
                return Err(MoveError::Rejected(mv));
            }
        }
        Move::WasteToTableau { column, card } => {
            let top = matching_waste_top(state, card)?;
            let pile = state
                .column(column)
                .ok_or(MoveError::NoSuchColumn(column))?;
            if !pile.can_add(top) {
                return Err(MoveError::Rejected(mv));
            }
        }
        Move::TableauToFoundation { column, card } => {
            let pile = state
                .column(column)
                .ok_or(MoveError::NoSuchColumn(column))?;
            let top = pile.top_revealed();
            if top.map(Card::identity) != Some(card.identity()) {
                return Err(MoveError::CardMismatch {
                    expected: card,
                    found: top,
                });
            }
            if !state.foundation(card.suit).can_add(card) {
                return Err(MoveError::Rejected(mv));
            }
        }
        Move::TableauToTableau {
            from,
            to,
            start,
            card,
        } => {
            if from == to {
                return Err(MoveError::SameColumn(from));
            }
            let source = state.column(from).ok_or(MoveError::NoSuchColumn(from))?;
            let target = state.column(to).ok_or(MoveError::NoSuchColumn(to))?;
            if !source.is_valid_run_from(start) {
                return Err(MoveError::NotARun {
                    column: from,
                    start,
                });
            }
            let head = source.cards()[start];
            if head.identity() != card.identity() {
                return Err(MoveError::CardMismatch {
                    expected: card,
                    found: Some(head),
                });
            }
            if !target.can_add(head) {
                return Err(MoveError::Rejected(mv));
            }
        }
    }
    Ok(())
}

fn matching_waste_top(state: &GameState, card: Card) -> Result<Card, MoveError> {
    let top = state.waste().top().ok_or(MoveError::EmptyWaste)?;
    if top.identity() != card.identity() {
        return Err(MoveError::CardMismatch {
            expected: card,
            found: Some(top),
        });
    }
    Ok(top)
}
