use crate::model::card::Card;
use crate::model::suit::Suit;
use core::fmt;
use serde::{Deserialize, Serialize};

/// One atomic transition. Moves hold column indices and the moved card for
/// display, never references into a live state, so they replay against any
/// position that satisfies their preconditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Move {
    DrawStock,
    ResetStock,
    WasteToFoundation {
        card: Card,
    },
    WasteToTableau {
        column: usize,
        card: Card,
    },
    TableauToFoundation {
        column: usize,
        card: Card,
    },
    /// Relocates `cards[start..]` of `from` onto `to`; `card` is the run head.
    TableauToTableau {
        from: usize,
        to: usize,
        start: usize,
        card: Card,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveKind {
    DrawStock,
    ResetStock,
    WasteToFoundation,
    WasteToTableau,
    TableauToFoundation,
    TableauToTableau,
}

impl MoveKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            MoveKind::DrawStock => "draw_stock",
            MoveKind::ResetStock => "reset_stock",
            MoveKind::WasteToFoundation => "waste_to_foundation",
            MoveKind::WasteToTableau => "waste_to_tableau",
            MoveKind::TableauToFoundation => "tableau_to_foundation",
            MoveKind::TableauToTableau => "tableau_to_tableau",
        }
    }
}

/// Pile a move takes cards from or puts cards onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Stock,
    Waste,
    Foundation(Suit),
    Tableau(usize),
}

/// Card-agnostic identity of a move used for repetition bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveSignature {
    pub kind: MoveKind,
    pub from: Endpoint,
    pub to: Endpoint,
}

impl MoveSignature {
    /// True when `self` undoes `previous`: same kind with swapped endpoints.
    pub fn is_reversal_of(&self, previous: &MoveSignature) -> bool {
        self.kind == previous.kind
            && self.from != self.to
            && self.from == previous.to
            && self.to == previous.from
    }
}

impl Move {
    pub const fn kind(&self) -> MoveKind {
        match self {
            Move::DrawStock => MoveKind::DrawStock,
            Move::ResetStock => MoveKind::ResetStock,
            Move::WasteToFoundation { .. } => MoveKind::WasteToFoundation,
            Move::WasteToTableau { .. } => MoveKind::WasteToTableau,
            Move::TableauToFoundation { .. } => MoveKind::TableauToFoundation,
            Move::TableauToTableau { .. } => MoveKind::TableauToTableau,
        }
    }

    pub const fn card(&self) -> Option<Card> {
        match self {
            Move::DrawStock | Move::ResetStock => None,
            Move::WasteToFoundation { card }
            | Move::WasteToTableau { card, .. }
            | Move::TableauToFoundation { card, .. }
            | Move::TableauToTableau { card, .. } => Some(*card),
        }
    }

    pub const fn from(&self) -> Endpoint {
        match self {
            Move::DrawStock => Endpoint::Stock,
            Move::ResetStock | Move::WasteToFoundation { .. } | Move::WasteToTableau { .. } => {
                Endpoint::Waste
            }
            Move::TableauToFoundation { column, .. } => Endpoint::Tableau(*column),
            Move::TableauToTableau { from, .. } => Endpoint::Tableau(*from),
        }
    }

    pub const fn to(&self) -> Endpoint {
        match self {
            Move::DrawStock => Endpoint::Waste,
            Move::ResetStock => Endpoint::Stock,
            Move::WasteToFoundation { card } | Move::TableauToFoundation { card, .. } => {
                Endpoint::Foundation(card.suit)
            }
            Move::WasteToTableau { column, .. } => Endpoint::Tableau(*column),
            Move::TableauToTableau { to, .. } => Endpoint::Tableau(*to),
        }
    }

    pub const fn signature(&self) -> MoveSignature {
        MoveSignature {
            kind: self.kind(),
            from: self.from(),
            to: self.to(),
        }
    }

    pub const fn is_foundation_move(&self) -> bool {
        matches!(
            self,
            Move::WasteToFoundation { .. } | Move::TableauToFoundation { .. }
        )
    }

    pub const fn is_stock_move(&self) -> bool {
        matches!(self, Move::DrawStock | Move::ResetStock)
    }

    pub const fn is_tableau_build(&self) -> bool {
        matches!(
            self,
            Move::WasteToTableau { .. } | Move::TableauToTableau { .. }
        )
    }

    /// Advisory text shown to a human player.
    pub fn describe(&self) -> String {
        match self {
            Move::TableauToTableau { from, to, card, .. } => {
                format!("Move {card} from column {from} to column {to}")
            }
            Move::TableauToFoundation { column, card } => {
                format!("Move {card} from column {column} to the foundation")
            }
            Move::WasteToTableau { column, card } => {
                format!("Move {card} from waste to column {column}")
            }
            Move::WasteToFoundation { card } => {
                format!("Move {card} from waste to the foundation")
            }
            Move::DrawStock => "Draw a card from the stock".to_string(),
            Move::ResetStock => "Reset the stock".to_string(),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

pub fn describe(mv: Option<&Move>) -> String {
    match mv {
        Some(mv) => mv.describe(),
        None => "No move found".to_string(),
    }
}
