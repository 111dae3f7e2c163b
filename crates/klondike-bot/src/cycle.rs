use klondike_core::moves::{Move, MoveKind, MoveSignature};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleConfig {
    /// Only the trailing `window` moves are inspected.
    pub window: usize,
    /// Consecutive immediate reversals at the tail that count as a cycle.
    pub reversal_run: usize,
    /// Occurrences of one signature inside the window that count as a cycle.
    pub repeat_threshold: usize,
    pub pattern_len: usize,
    /// Identical copies of the tail pattern required directly before it.
    pub pattern_repeats: usize,
    /// Leaves `DrawStock` out of the recurrence and pattern checks and flags
    /// an idle pass through the stock instead.
    pub ignore_draws: bool,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            window: 30,
            reversal_run: 8,
            repeat_threshold: 10,
            pattern_len: 4,
            pattern_repeats: 3,
            ignore_draws: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleKind {
    /// The tail keeps undoing the previous move.
    Reversals { run: usize },
    /// One move signature dominates the window.
    Recurrence {
        signature: MoveSignature,
        count: usize,
    },
    /// The last few moves repeat as a block.
    Pattern { len: usize },
    /// A full pass through the stock ended in a reset with nothing played.
    IdleStockPass,
}

impl CycleKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CycleKind::Reversals { .. } => "reversals",
            CycleKind::Recurrence { .. } => "recurrence",
            CycleKind::Pattern { .. } => "pattern",
            CycleKind::IdleStockPass => "idle_stock_pass",
        }
    }
}

impl fmt::Display for CycleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleKind::Reversals { run } => write!(f, "{run} consecutive reversals"),
            CycleKind::Recurrence { signature, count } => write!(
                f,
                "{} {:?} -> {:?} repeated {count} times",
                signature.kind.as_str(),
                signature.from,
                signature.to
            ),
            CycleKind::Pattern { len } => write!(f, "{len}-move pattern repeating"),
            CycleKind::IdleStockPass => write!(f, "stock recycled without playing a card"),
        }
    }
}

/// Flags oscillation in a played move sequence.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleDetector {
    config: CycleConfig,
}

impl CycleDetector {
    pub fn new(config: CycleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CycleConfig {
        &self.config
    }

    pub fn detect(&self, history: &[Move]) -> Option<CycleKind> {
        let start = history.len().saturating_sub(self.config.window);
        let window: Vec<MoveSignature> =
            history[start..].iter().map(Move::signature).collect();

        self.reversal_run(&window)
            .or_else(|| self.recurrence(&window))
            .or_else(|| self.pattern(&window))
            .or_else(|| {
                self.config
                    .ignore_draws
                    .then(|| idle_stock_pass(&window))
                    .flatten()
            })
    }

    fn reversal_run(&self, window: &[MoveSignature]) -> Option<CycleKind> {
        if self.config.reversal_run == 0 {
            return None;
        }
        let run = window
            .windows(2)
            .rev()
            .take_while(|pair| pair[1].is_reversal_of(&pair[0]))
            .count();
        (run >= self.config.reversal_run).then_some(CycleKind::Reversals { run })
    }

    fn recurrence(&self, window: &[MoveSignature]) -> Option<CycleKind> {
        if self.config.repeat_threshold == 0 {
            return None;
        }
        let mut counts: HashMap<MoveSignature, usize> = HashMap::new();
        for signature in window.iter().filter(|sig| self.counts_toward_cycles(sig)) {
            *counts.entry(*signature).or_default() += 1;
        }
        counts
            .into_iter()
            .filter(|(_, count)| *count >= self.config.repeat_threshold)
            .max_by_key(|(_, count)| *count)
            .map(|(signature, count)| CycleKind::Recurrence { signature, count })
    }

    fn pattern(&self, window: &[MoveSignature]) -> Option<CycleKind> {
        let len = self.config.pattern_len;
        let needed = len.checked_mul(self.config.pattern_repeats + 1)?;
        if len == 0 || window.len() < needed {
            return None;
        }
        let tail = &window[window.len() - len..];
        if tail.iter().all(|sig| !self.counts_toward_cycles(sig)) {
            return None;
        }
        let repeated = (1..=self.config.pattern_repeats).all(|copy| {
            let end = window.len() - copy * len;
            &window[end - len..end] == tail
        });
        repeated.then_some(CycleKind::Pattern { len })
    }

    fn counts_toward_cycles(&self, signature: &MoveSignature) -> bool {
        !(self.config.ignore_draws && signature.kind == MoveKind::DrawStock)
    }
}

fn idle_stock_pass(window: &[MoveSignature]) -> Option<CycleKind> {
    let (last, rest) = window.split_last()?;
    if last.kind != MoveKind::ResetStock {
        return None;
    }
    for signature in rest.iter().rev() {
        match signature.kind {
            MoveKind::DrawStock => continue,
            MoveKind::ResetStock => return Some(CycleKind::IdleStockPass),
            _ => return None,
        }
    }
    None
}

/// True when the trailing history shows oscillation, with `threshold` as the
/// per-signature recurrence limit. Every move kind counts, draws included.
pub fn detect_cycle(history: &[Move], threshold: usize) -> bool {
    let config = CycleConfig {
        repeat_threshold: threshold,
        ignore_draws: false,
        ..CycleConfig::default()
    };
    CycleDetector::new(config).detect(history).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use klondike_core::model::card::Card;
    use klondike_core::model::rank::Rank;
    use klondike_core::model::suit::Suit;

    fn shift(from: usize, to: usize) -> Move {
        Move::TableauToTableau {
            from,
            to,
            start: 2,
            card: Card::face_up(Rank::Eight, Suit::Hearts),
        }
    }

    fn waste_to(column: usize) -> Move {
        Move::WasteToTableau {
            column,
            card: Card::face_up(Rank::Five, Suit::Clubs),
        }
    }

    fn varied(len: usize) -> Vec<Move> {
        (0..len).map(|i| waste_to(i % 7)).collect()
    }

    #[test]
    fn ten_repeats_in_thirty_moves_is_a_cycle() {
        let mut history = varied(20);
        history.extend(std::iter::repeat_n(shift(1, 3), 10));
        assert_eq!(history.len(), 30);
        assert!(detect_cycle(&history, 10));
        let kind = CycleDetector::default().detect(&history);
        assert!(matches!(kind, Some(CycleKind::Recurrence { count: 10, .. })));
    }

    #[test]
    fn nine_repeats_are_tolerated() {
        let mut history = varied(21);
        history.extend(std::iter::repeat_n(shift(1, 3), 9));
        assert!(!detect_cycle(&history, 10));
    }

    #[test]
    fn repeats_outside_the_window_are_forgotten() {
        let mut history: Vec<Move> = std::iter::repeat_n(shift(1, 3), 12).collect();
        history.extend(varied(30));
        assert!(!detect_cycle(&history, 10));
    }

    #[test]
    fn back_and_forth_is_flagged() {
        let mut history = varied(5);
        for step in 0..9 {
            history.push(if step % 2 == 0 { shift(2, 4) } else { shift(4, 2) });
        }
        let kind = CycleDetector::default().detect(&history);
        assert_eq!(kind, Some(CycleKind::Reversals { run: 8 }));
    }

    #[test]
    fn repeating_block_is_flagged() {
        let block = [shift(0, 1), waste_to(2), shift(3, 5), Move::DrawStock];
        let mut history = varied(3);
        for _ in 0..4 {
            history.extend(block);
        }
        let kind = CycleDetector::default().detect(&history);
        assert_eq!(kind, Some(CycleKind::Pattern { len: 4 }));
    }

    #[test]
    fn drawing_through_the_stock_is_not_a_cycle() {
        let history: Vec<Move> = std::iter::repeat_n(Move::DrawStock, 24).collect();
        assert_eq!(CycleDetector::default().detect(&history), None);
    }

    #[test]
    fn repeated_draws_count_without_the_exemption() {
        let mut history = varied(20);
        history.extend(std::iter::repeat_n(Move::DrawStock, 10));
        assert!(detect_cycle(&history, 10));
        assert!(!detect_cycle(&history[..29], 10));

        let session_detector = CycleDetector::default();
        assert!(session_detector.config().ignore_draws);
        assert_eq!(session_detector.detect(&history), None);
    }

    #[test]
    fn idle_recycle_is_flagged() {
        let mut history = vec![waste_to(1), Move::ResetStock];
        history.extend(std::iter::repeat_n(Move::DrawStock, 5));
        assert_eq!(CycleDetector::default().detect(&history), None);
        history.push(Move::ResetStock);
        assert_eq!(
            CycleDetector::default().detect(&history),
            Some(CycleKind::IdleStockPass)
        );
    }
}
