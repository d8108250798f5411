//! Events raised while a series is played
//!
//! The engine never renders anything. Presentation layers read these
//! events after each call and animate or print at their own pace.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::combatant::Side;
use crate::sampler::Move;

/// Result of one throw
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    LeftWins,
    RightWins,
    Tie,
}

impl Outcome {
    pub fn winner(self) -> Option<Side> {
        match self {
            Outcome::LeftWins => Some(Side::Left),
            Outcome::RightWins => Some(Side::Right),
            Outcome::Tie => None,
        }
    }
}

/// A left/right pair of tallies
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub left: u32,
    pub right: u32,
}

impl Score {
    pub fn new(left: u32, right: u32) -> Self {
        Self { left, right }
    }
}

impl Index<Side> for Score {
    type Output = u32;

    fn index(&self, side: Side) -> &u32 {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

impl IndexMut<Side> for Score {
    fn index_mut(&mut self, side: Side) -> &mut u32 {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SumoEvent {
    RoundResolved {
        left_move: Move,
        right_move: Move,
        outcome: Outcome,
    },
    CombatantMoved {
        side: Side,
        from: usize,
        to: usize,
    },
    EdgeVisitIncremented {
        side: Side,
        count: u32,
        distribution: String,
    },
    MatchComplete {
        winner: Side,
        round_score: Score,
    },
    SeriesComplete {
        winner: Side,
        match_score: Score,
    },
}

impl SumoEvent {
    /// Status line for a HUD, if this event has one
    pub fn status_line(&self, left_name: &str, right_name: &str) -> Option<String> {
        let name = |side: Side| match side {
            Side::Left => left_name,
            Side::Right => right_name,
        };
        match self {
            SumoEvent::RoundResolved { outcome, .. } => Some(match outcome.winner() {
                Some(side) => format!("{} wins round", name(side)),
                None => "Tie".to_string(),
            }),
            SumoEvent::MatchComplete { winner, .. } => Some(format!(
                "{} knocked out. {} wins match!",
                name(winner.opposite()),
                name(*winner)
            )),
            SumoEvent::SeriesComplete { winner, match_score } => Some(format!(
                "{} wins series {}-{}",
                name(*winner),
                match_score[*winner],
                match_score[winner.opposite()]
            )),
            SumoEvent::CombatantMoved { .. } | SumoEvent::EdgeVisitIncremented { .. } => None,
        }
    }
}
