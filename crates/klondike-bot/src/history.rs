use klondike_core::moves::Move;

pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Bounded log of the moves actually played, oldest first.
#[derive(Debug, Clone)]
pub struct MoveHistory {
    moves: Vec<Move>,
    capacity: usize,
}

impl Default for MoveHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl MoveHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            moves: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, mv: Move) {
        self.moves.push(mv);
        if self.moves.len() > self.capacity {
            let excess = self.moves.len() - self.capacity;
            self.moves.drain(..excess);
        }
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn last(&self) -> Option<&Move> {
        self.moves.last()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.moves.clear();
    }
}
