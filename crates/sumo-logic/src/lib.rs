//! Match Logic for Sumo RPS
//!
//! Two combatants throw weighted rock-paper-scissors; each decisive
//! throw pushes the loser one column toward their wall, wall contact
//! ends the match, and a best-of-N series of matches picks the winner.
//! This crate is compiled to:
//! - Native (for game hosts and tests)
//! - WASM (for a browser presentation layer)

mod board;
mod combatant;
mod config;
mod error;
mod event;
mod game;
mod random;
mod sampler;

#[cfg(feature = "wasm")]
mod wasm;

pub use board::{coerce_columns, BoardLayout, MIN_COLUMNS};
pub use combatant::{Combatant, EscalationRule, EscalationTable, Side};
pub use config::{CombatantConfig, MatchSettings, PresentationConfig, SumoConfig};
pub use error::{Result, SumoError};
pub use event::{Outcome, Score, SumoEvent};
pub use game::{
    coerce_best_of, run_series, wins_needed, CombatantSnapshot, EngineSnapshot, MatchEngine,
    RoundPhase, RoundReport, Scoreboard, SeriesResult, SeriesState,
};
pub use random::{SeededRng, SharedRng};
pub use sampler::{Distribution, Move, MoveSampler, DEFAULT_DISTRIBUTION};

/// Scene-space points and directions
pub use glam::DVec3;

/// Dominance rule for one throw
pub fn resolve(left: Move, right: Move) -> Outcome {
    if left.beats(right) {
        Outcome::LeftWins
    } else if right.beats(left) {
        Outcome::RightWins
    } else {
        Outcome::Tie
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_resolve_table() {
        assert_eq!(resolve(Move::Rock, Move::Scissors), Outcome::LeftWins);
        assert_eq!(resolve(Move::Rock, Move::Paper), Outcome::RightWins);
        assert_eq!(resolve(Move::Paper, Move::Paper), Outcome::Tie);
        assert_eq!(resolve(Move::Super, Move::Rock), Outcome::LeftWins);
        assert_eq!(resolve(Move::Scissors, Move::Super), Outcome::RightWins);
        assert_eq!(resolve(Move::Super, Move::Super), Outcome::Tie);
    }

    fn any_move() -> impl Strategy<Value = Move> {
        prop::sample::select(Move::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_resolve_mirrors(a in any_move(), b in any_move()) {
            let forward = resolve(a, b);
            let mirrored = resolve(b, a);
            match forward {
                Outcome::Tie => prop_assert_eq!(mirrored, Outcome::Tie),
                Outcome::LeftWins => prop_assert_eq!(mirrored, Outcome::RightWins),
                Outcome::RightWins => prop_assert_eq!(mirrored, Outcome::LeftWins),
            }
            prop_assert_eq!(forward == Outcome::Tie, a == b);
        }
    }
}
