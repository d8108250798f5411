//! Series execution engine
//!
//! One call to [`MatchEngine::resolve_round`] plays exactly one throw:
//! both sides sample, the board index moves toward the loser's wall,
//! and wall contact ends the match. A best-of-N series ends once a side
//! reaches the required match wins.

use glam::DVec3;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::board::{BoardLayout, MIN_COLUMNS};
use crate::combatant::{Combatant, Side};
use crate::config::{MatchSettings, SumoConfig};
use crate::error::{Result, SumoError};
use crate::event::{Outcome, Score, SumoEvent};
use crate::random::{SeededRng, SharedRng};
use crate::resolve;
use crate::sampler::Move;

/// Force a series length odd and at least 1
pub fn coerce_best_of(best_of: u32) -> u32 {
    let b = best_of.max(1);
    if b % 2 == 0 {
        b + 1
    } else {
        b
    }
}

/// Match wins that decide a best-of-`best_of` series
pub fn wins_needed(best_of: u32) -> u32 {
    coerce_best_of(best_of) / 2 + 1
}

/// Round and match tallies
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    /// Throws won in the current match
    pub round_wins: Score,
    /// Matches won in the series
    pub match_wins: Score,
    pub best_of: u32,
    pub wins_needed: u32,
}

impl Scoreboard {
    pub fn new(best_of: u32) -> Self {
        let coerced = coerce_best_of(best_of);
        Self {
            round_wins: Score::default(),
            match_wins: Score::default(),
            best_of: coerced,
            wins_needed: wins_needed(coerced),
        }
    }

    /// Side holding enough match wins, if any
    pub fn series_winner(&self) -> Option<Side> {
        [Side::Left, Side::Right]
            .into_iter()
            .find(|side| self.match_wins[*side] >= self.wins_needed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeriesState {
    InProgress,
    Complete { winner: Side },
}

/// Where the state machine stands after a round
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    MatchContinues,
    MatchComplete,
    SeriesComplete,
}

/// Result of a single round
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundReport {
    /// 1-based count of rounds played in this series
    pub round: u32,
    pub left_move: Move,
    pub right_move: Move,
    pub outcome: Outcome,
    /// Board index after the push, before any match reset
    pub board_index: usize,
    pub phase: RoundPhase,
    pub events: Vec<SumoEvent>,
}

/// Serializable view of the whole engine, for HUDs and replays
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub scores: Scoreboard,
    pub board_index: Option<usize>,
    pub columns: usize,
    pub rounds_played: u32,
    pub winner: Option<Side>,
    pub left: CombatantSnapshot,
    pub right: CombatantSnapshot,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombatantSnapshot {
    pub name: String,
    pub column: usize,
    pub edge_visits: u32,
    pub distribution: String,
}

impl CombatantSnapshot {
    fn of(c: &Combatant) -> Self {
        Self {
            name: c.name().to_string(),
            column: c.column(),
            edge_visits: c.edge_visits(),
            distribution: c.active_distribution().to_string(),
        }
    }
}

/// The round/match/series state machine.
///
/// Owns the scoreboard, the shared board index, both combatants and a
/// random source per side. The two sources may be clones of one
/// [`SharedRng`].
#[derive(Clone, Debug)]
pub struct MatchEngine<R> {
    settings: MatchSettings,
    left: Combatant,
    right: Combatant,
    left_rng: R,
    right_rng: R,
    board: Option<BoardLayout>,
    board_index: usize,
    scores: Scoreboard,
    state: SeriesState,
    rounds_played: u32,
}

impl<R: RngCore> MatchEngine<R> {
    /// `settings.best_of` is coerced to an odd count of at least 1 here,
    /// once, so [`MatchEngine::settings`] reports the value in play.
    pub fn new(
        mut settings: MatchSettings,
        left: Combatant,
        right: Combatant,
        left_rng: R,
        right_rng: R,
    ) -> Result<Self> {
        if left.side() != Side::Left || right.side() != Side::Right {
            return Err(SumoError::InvalidConfig(
                "combatants must be given as (left, right)".into(),
            ));
        }
        let best_of = coerce_best_of(settings.best_of);
        if best_of != settings.best_of {
            log::warn!("best_of {} coerced to {}", settings.best_of, best_of);
            settings.best_of = best_of;
        }
        let scores = Scoreboard::new(settings.best_of);
        Ok(Self {
            settings,
            left,
            right,
            left_rng,
            right_rng,
            board: None,
            board_index: 0,
            scores,
            state: SeriesState::InProgress,
            rounds_played: 0,
        })
    }

    /// Build both combatants from config. If the config carries both
    /// anchors the board is set up as well.
    pub fn from_config(config: &SumoConfig, left_rng: R, right_rng: R) -> Result<Self> {
        let left = config.left.build(Side::Left)?;
        let right = config.right.build(Side::Right)?;
        let mut engine = Self::new(config.settings.clone(), left, right, left_rng, right_rng)?;
        if let Some((a, b)) = config.anchors()? {
            engine.setup(a, b);
        }
        Ok(engine)
    }

    /// Set up the board from the anchors a config carries.
    ///
    /// Unlike [`MatchEngine::from_config`], missing anchors are an error
    /// here. The engine's own settings decide columns and span.
    pub fn setup_from_config(&mut self, config: &SumoConfig) -> Result<&BoardLayout> {
        let (a, b) = config
            .anchors()?
            .ok_or_else(|| SumoError::InvalidConfig("anchors missing".into()))?;
        Ok(self.setup(a, b))
    }

    /// Lay out the board between two anchors and start a fresh series
    /// with both combatants on the center column.
    pub fn setup(&mut self, anchor_a: DVec3, anchor_b: DVec3) -> &BoardLayout {
        let board = BoardLayout::setup(
            anchor_a,
            anchor_b,
            self.settings.columns,
            self.settings.span_multiplier,
        );
        log::debug!(
            "board set up: {} columns, center {}",
            board.column_count(),
            board.center_index()
        );
        self.reset_series();
        self.place_at_center(board.center_index());
        self.board.insert(board)
    }

    /// Reset scores, edge visits and positions for a new series on the
    /// current board. Consumes no randomness.
    pub fn restart(&mut self) {
        self.reset_series();
        if let Some(center) = self.board.as_ref().map(BoardLayout::center_index) {
            self.place_at_center(center);
        }
    }

    fn reset_series(&mut self) {
        self.scores = Scoreboard::new(self.settings.best_of);
        self.state = SeriesState::InProgress;
        self.rounds_played = 0;
        self.left.reset_edge_visits();
        self.right.reset_edge_visits();
    }

    fn place_at_center(&mut self, center: usize) {
        self.board_index = center;
        self.left.place(center);
        self.right.place(center);
    }

    /// Play one round.
    ///
    /// Fails only on misuse: no board yet, or a series that is already
    /// decided. Ties, knockouts and the series ending are reported in
    /// the returned [`RoundReport`].
    pub fn resolve_round(&mut self) -> Result<RoundReport> {
        let board = self.board.as_ref().ok_or(SumoError::NotSetUp)?;
        let columns = board.column_count();
        let center = board.center_index();
        if columns < MIN_COLUMNS {
            return Err(SumoError::TooFewColumns(columns));
        }
        if let SeriesState::Complete { .. } = self.state {
            return Err(SumoError::SeriesFinished);
        }

        let left_move = self.left.pick_move(&mut self.left_rng)?;
        let right_move = self.right.pick_move(&mut self.right_rng)?;
        let outcome = resolve(left_move, right_move);
        self.rounds_played += 1;

        let mut events = vec![SumoEvent::RoundResolved {
            left_move,
            right_move,
            outcome,
        }];
        let mut phase = RoundPhase::MatchContinues;
        let mut board_index = self.board_index;

        if let Some(winner) = outcome.winner() {
            self.scores.round_wins[winner] += 1;
            let last = columns - 1;
            self.board_index = match winner {
                Side::Left => (self.board_index + 1).min(last),
                Side::Right => self.board_index.saturating_sub(1),
            };
            board_index = self.board_index;

            let knocked_out = if self.board_index == 0 {
                Some(Side::Left)
            } else if self.board_index == last {
                Some(Side::Right)
            } else {
                None
            };

            match knocked_out {
                // Only the loser goes to the wall; the winner holds its column
                Some(loser) => {
                    self.move_combatant(loser, self.board_index, columns, &mut events)?;
                    phase = self.knock_out(loser, columns, center, &mut events)?;
                }
                None => {
                    self.move_combatant(Side::Left, self.board_index, columns, &mut events)?;
                    self.move_combatant(Side::Right, self.board_index, columns, &mut events)?;
                }
            }
        }

        log::debug!(
            "round {}: {} vs {} -> {:?}, board {}",
            self.rounds_played,
            left_move,
            right_move,
            outcome,
            board_index
        );

        Ok(RoundReport {
            round: self.rounds_played,
            left_move,
            right_move,
            outcome,
            board_index,
            phase,
            events,
        })
    }

    fn move_combatant(
        &mut self,
        side: Side,
        to: usize,
        columns: usize,
        events: &mut Vec<SumoEvent>,
    ) -> Result<()> {
        let combatant = self.combatant_mut(side);
        let from = combatant.column();
        if from == to {
            return Ok(());
        }
        let visited = combatant.apply_column_transition(to, columns)?;
        let count = combatant.edge_visits();
        let distribution = combatant.active_distribution().to_string();
        events.push(SumoEvent::CombatantMoved { side, from, to });
        if visited {
            events.push(SumoEvent::EdgeVisitIncremented {
                side,
                count,
                distribution,
            });
        }
        Ok(())
    }

    fn knock_out(
        &mut self,
        loser: Side,
        columns: usize,
        center: usize,
        events: &mut Vec<SumoEvent>,
    ) -> Result<RoundPhase> {
        let winner = loser.opposite();
        self.scores.match_wins[winner] += 1;
        self.combatant_mut(loser).reset_edge_visits();
        events.push(SumoEvent::MatchComplete {
            winner,
            round_score: self.scores.round_wins,
        });
        log::info!(
            "{} knocked out; {} wins match ({}-{})",
            self.combatant(loser).name(),
            self.combatant(winner).name(),
            self.scores.match_wins[winner],
            self.scores.match_wins[loser]
        );

        if let Some(series_winner) = self.scores.series_winner() {
            self.state = SeriesState::Complete { winner: series_winner };
            events.push(SumoEvent::SeriesComplete {
                winner: series_winner,
                match_score: self.scores.match_wins,
            });
            log::info!("{} wins the series", self.combatant(series_winner).name());
            return Ok(RoundPhase::SeriesComplete);
        }

        self.scores.round_wins = Score::default();
        self.board_index = center;
        self.move_combatant(Side::Left, center, columns, events)?;
        self.move_combatant(Side::Right, center, columns, events)?;
        Ok(RoundPhase::MatchComplete)
    }

    pub fn combatant(&self, side: Side) -> &Combatant {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    fn combatant_mut(&mut self, side: Side) -> &mut Combatant {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    pub fn board(&self) -> Option<&BoardLayout> {
        self.board.as_ref()
    }

    pub fn board_index(&self) -> usize {
        self.board_index
    }

    pub fn scores(&self) -> &Scoreboard {
        &self.scores
    }

    pub fn state(&self) -> SeriesState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.state, SeriesState::Complete { .. })
    }

    pub fn winner(&self) -> Option<Side> {
        match self.state {
            SeriesState::Complete { winner } => Some(winner),
            SeriesState::InProgress => None,
        }
    }

    pub fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    /// Scene point where a combatant should stand right now
    pub fn stance(&self, side: Side) -> Option<DVec3> {
        let board = self.board.as_ref()?;
        board.stance(
            side,
            self.combatant(side).column(),
            self.settings.presentation.lateral_separation,
        )
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            scores: self.scores,
            board_index: self.board.as_ref().map(|_| self.board_index),
            columns: self.board.as_ref().map_or(0, BoardLayout::column_count),
            rounds_played: self.rounds_played,
            winner: self.winner(),
            left: CombatantSnapshot::of(&self.left),
            right: CombatantSnapshot::of(&self.right),
        }
    }
}

impl<R: RngCore> MatchEngine<SharedRng<R>> {
    /// Engine whose two sides draw in turn from one generator.
    ///
    /// Left always samples before right within a round, so a shared
    /// series is as reproducible as one with per-side streams.
    pub fn shared(settings: MatchSettings, left: Combatant, right: Combatant, rng: R) -> Result<Self> {
        let rng = SharedRng::new(rng);
        Self::new(settings, left, right, rng.clone(), rng)
    }
}

impl MatchEngine<SeededRng> {
    /// Engine with independent per-side streams derived from one seed
    pub fn seeded(config: &SumoConfig, seed: u64) -> Result<Self> {
        let base = SeededRng::from_seed_u64(seed);
        Self::from_config(config, base.for_side(Side::Left), base.for_side(Side::Right))
    }
}

/// Result of a batch-played series
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesResult {
    pub rounds: Vec<RoundReport>,
    pub match_score: Score,
    pub matches_played: u32,
    /// None if the round cap was hit first
    pub winner: Option<Side>,
}

/// Play rounds until the series is decided or `max_rounds` is reached
pub fn run_series<R: RngCore>(engine: &mut MatchEngine<R>, max_rounds: u32) -> Result<SeriesResult> {
    let mut rounds = Vec::new();
    while !engine.is_complete() && (rounds.len() as u32) < max_rounds {
        rounds.push(engine.resolve_round()?);
    }
    let matches_played = rounds
        .iter()
        .filter(|r| r.phase != RoundPhase::MatchContinues)
        .count() as u32;
    Ok(SeriesResult {
        rounds,
        match_score: engine.scores().match_wins,
        matches_played,
        winner: engine.winner(),
    })
}
