use crate::cycle::{CycleConfig, CycleDetector, CycleKind};
use crate::history::MoveHistory;
use crate::policy::{Policy, PolicyContext};
use klondike_core::model::state::GameState;
use klondike_core::moves::Move;
use klondike_core::rules::{MoveError, try_apply};
use tracing::{Level, event, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Moved(Move),
    Won,
    NoMoves,
    Stuck(CycleKind),
    /// The policy proposed a move the rules refuse; the state is unchanged.
    Rejected(MoveError),
}

impl StepOutcome {
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, StepOutcome::Moved(_))
    }

    pub const fn label(&self) -> &'static str {
        match self {
            StepOutcome::Moved(_) => "moved",
            StepOutcome::Won => "won",
            StepOutcome::NoMoves => "no_moves",
            StepOutcome::Stuck(_) => "stuck",
            StepOutcome::Rejected(_) => "rejected",
        }
    }
}

/// How an autoplay run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub outcome: StepOutcome,
    pub moves_played: usize,
    pub foundation_cards: usize,
    /// True when `max_moves` stopped the run before a terminal outcome.
    pub move_limit_hit: bool,
}

/// Drives one live game with a policy, recording every applied move.
pub struct AutoplaySession {
    state: GameState,
    history: MoveHistory,
    detector: CycleDetector,
    policy: Box<dyn Policy>,
    moves_played: usize,
}

impl AutoplaySession {
    pub fn new(state: GameState, policy: Box<dyn Policy>) -> Self {
        Self::with_detector(state, policy, CycleConfig::default())
    }

    pub fn with_detector(state: GameState, policy: Box<dyn Policy>, cycles: CycleConfig) -> Self {
        Self {
            state,
            history: MoveHistory::new(),
            detector: CycleDetector::new(cycles),
            policy,
            moves_played: 0,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    pub fn moves_played(&self) -> usize {
        self.moves_played
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    pub fn step(&mut self) -> StepOutcome {
        if self.state.is_won() {
            return StepOutcome::Won;
        }
        if let Some(kind) = self.detector.detect(self.history.moves()) {
            warn!(
                target: "klondike_bot::session",
                policy = self.policy.name(),
                moves_played = self.moves_played,
                cycle = kind.as_str(),
                detail = %kind,
                "autoplay stopped on a move cycle"
            );
            return StepOutcome::Stuck(kind);
        }

        let ctx = PolicyContext {
            state: &self.state,
            history: self.history.moves(),
        };
        let Some(mv) = self.policy.choose(&ctx) else {
            return StepOutcome::NoMoves;
        };

        match try_apply(&self.state, mv) {
            Ok(next) => {
                self.state = next;
                self.history.push(mv);
                self.moves_played += 1;
                log_step(self.policy.name(), self.moves_played, mv, &self.state);
                StepOutcome::Moved(mv)
            }
            Err(err) => {
                warn!(
                    target: "klondike_bot::session",
                    policy = self.policy.name(),
                    proposed = %mv,
                    error = %err,
                    "policy proposed an illegal move"
                );
                StepOutcome::Rejected(err)
            }
        }
    }

    /// Steps until a terminal outcome or `max_moves` applied moves.
    pub fn run(&mut self, max_moves: usize) -> SessionSummary {
        let mut outcome = StepOutcome::NoMoves;
        let mut move_limit_hit = false;
        loop {
            if self.moves_played >= max_moves {
                move_limit_hit = !self.state.is_won();
                if !move_limit_hit {
                    outcome = StepOutcome::Won;
                }
                break;
            }
            outcome = self.step();
            if outcome.is_terminal() {
                break;
            }
        }
        SessionSummary {
            outcome,
            moves_played: self.moves_played,
            foundation_cards: self.state.foundation_total(),
            move_limit_hit,
        }
    }
}

fn log_step(policy: &str, moves_played: usize, mv: Move, state: &GameState) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }

    event!(
        target: "klondike_bot::session",
        Level::DEBUG,
        policy,
        moves_played,
        applied = %mv,
        foundation = state.foundation_total(),
        hidden = state.hidden_count(),
    );
}
