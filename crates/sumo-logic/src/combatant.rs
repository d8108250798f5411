//! Combatant position, edge visits and escalation

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SumoError};
use crate::sampler::{Move, MoveSampler};

/// Which end of the board a combatant defends
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// This side's own wall column
    pub fn wall_index(self, columns: usize) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => columns.saturating_sub(1),
        }
    }

    /// The column one step in from this side's own wall
    pub fn near_wall_index(self, columns: usize) -> usize {
        match self {
            Side::Left => 1,
            Side::Right => columns.saturating_sub(2),
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => f.write_str("Left"),
            Side::Right => f.write_str("Right"),
        }
    }
}

/// Switch to `distribution` once a combatant has made
/// `visits_required` edge visits
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationRule {
    pub distribution: String,
    pub visits_required: u32,
}

impl EscalationRule {
    pub fn new(distribution: impl Into<String>, visits_required: u32) -> Self {
        Self {
            distribution: distribution.into(),
            visits_required,
        }
    }
}

/// Rules sorted by threshold, looked up by greatest threshold <= count
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TableParts")]
pub struct EscalationTable {
    rules: Vec<EscalationRule>,
}

#[derive(Deserialize)]
struct TableParts {
    #[serde(default)]
    rules: Vec<EscalationRule>,
}

impl TryFrom<TableParts> for EscalationTable {
    type Error = SumoError;

    fn try_from(parts: TableParts) -> Result<Self> {
        EscalationTable::new(parts.rules)
    }
}

impl EscalationTable {
    pub fn new(mut rules: Vec<EscalationRule>) -> Result<Self> {
        if let Some(bad) = rules.iter().find(|r| r.visits_required == 0) {
            return Err(SumoError::InvalidThreshold {
                name: bad.distribution.clone(),
                visits: bad.visits_required,
            });
        }
        // Stable: equal thresholds keep declaration order
        rules.sort_by_key(|r| r.visits_required);
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[EscalationRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Distribution for `visits` edge visits, or None below every threshold
    pub fn resolve(&self, visits: u32) -> Option<&str> {
        let mut best: Option<&EscalationRule> = None;
        for rule in self.rules.iter().take_while(|r| r.visits_required <= visits) {
            if best.map_or(true, |b| rule.visits_required > b.visits_required) {
                best = Some(rule);
            }
        }
        best.map(|r| r.distribution.as_str())
    }
}

/// One fighter's logical state
#[derive(Clone, Debug, PartialEq)]
pub struct Combatant {
    name: String,
    side: Side,
    column: usize,
    edge_visits: u32,
    sampler: MoveSampler,
    escalation: EscalationTable,
    base_distribution: String,
}

impl Combatant {
    /// The sampler's active distribution at construction is the one the
    /// combatant returns to whenever no escalation rule applies.
    pub fn new(
        name: impl Into<String>,
        side: Side,
        sampler: MoveSampler,
        escalation: EscalationTable,
    ) -> Result<Self> {
        if let Some(missing) = escalation
            .rules()
            .iter()
            .find(|r| !sampler.contains(&r.distribution))
        {
            return Err(SumoError::UnknownDistribution(missing.distribution.clone()));
        }
        let base_distribution = sampler.current_name().to_string();
        Ok(Self {
            name: name.into(),
            side,
            column: 0,
            edge_visits: 0,
            sampler,
            escalation,
            base_distribution,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn edge_visits(&self) -> u32 {
        self.edge_visits
    }

    pub fn sampler(&self) -> &MoveSampler {
        &self.sampler
    }

    pub fn escalation(&self) -> &EscalationTable {
        &self.escalation
    }

    pub fn active_distribution(&self) -> &str {
        self.sampler.current_name()
    }

    /// Draw this round's move from the active distribution
    pub fn pick_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Move> {
        self.sampler.sample(self.active_distribution(), rng)
    }

    /// Put the combatant on a column without any edge-visit accounting
    pub(crate) fn place(&mut self, column: usize) {
        self.column = column;
    }

    /// Move to `new_index`. Returns true if this arrival counted as an
    /// edge visit, which also re-resolves the active distribution.
    ///
    /// Only arriving on the near-wall column from a different column
    /// counts.
    pub fn apply_column_transition(&mut self, new_index: usize, columns: usize) -> Result<bool> {
        if columns < crate::board::MIN_COLUMNS {
            return Err(SumoError::TooFewColumns(columns));
        }
        if new_index >= columns {
            return Err(SumoError::ColumnOutOfRange { index: new_index, columns });
        }
        let prev = self.column;
        self.column = new_index;

        if new_index != self.side.near_wall_index(columns) || prev == new_index {
            return Ok(false);
        }
        self.edge_visits += 1;
        self.refresh_distribution();
        log::debug!(
            "{} edge visit #{} -> {}",
            self.name,
            self.edge_visits,
            self.active_distribution()
        );
        Ok(true)
    }

    /// Called once when this combatant is knocked out of a match
    pub fn reset_edge_visits(&mut self) {
        self.edge_visits = 0;
        self.refresh_distribution();
    }

    pub fn is_at_wall(&self, columns: usize) -> bool {
        self.column == 0 || self.column + 1 == columns
    }

    fn refresh_distribution(&mut self) {
        let target = self
            .escalation
            .resolve(self.edge_visits)
            .unwrap_or(self.base_distribution.as_str());
        // Names were checked at construction
        let selected = self.sampler.select(target);
        debug_assert!(selected, "escalation target {:?} missing", target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::Distribution;

    fn fighter(side: Side, rules: Vec<EscalationRule>) -> Combatant {
        let sampler = MoveSampler::new(vec![
            Distribution::default(),
            Distribution::only("Nervous", Move::Paper),
            Distribution::only("Desperate", Move::Super),
        ])
        .unwrap();
        Combatant::new("Fighter", side, sampler, EscalationTable::new(rules).unwrap()).unwrap()
    }

    #[test]
    fn test_side_indices() {
        assert_eq!(Side::Left.wall_index(5), 0);
        assert_eq!(Side::Right.wall_index(5), 4);
        assert_eq!(Side::Left.near_wall_index(5), 1);
        assert_eq!(Side::Right.near_wall_index(5), 3);
        assert_eq!(Side::Right.near_wall_index(3), 1);
        assert_eq!(Side::Left.opposite(), Side::Right);
    }

    #[test]
    fn test_escalation_lookup() {
        let table = EscalationTable::new(vec![
            EscalationRule::new("Desperate", 3),
            EscalationRule::new("Nervous", 1),
        ])
        .unwrap();
        assert_eq!(table.resolve(0), None);
        assert_eq!(table.resolve(1), Some("Nervous"));
        assert_eq!(table.resolve(2), Some("Nervous"));
        assert_eq!(table.resolve(3), Some("Desperate"));
        assert_eq!(table.resolve(40), Some("Desperate"));
    }

    #[test]
    fn test_deserialized_table_is_sorted_and_checked() {
        let json = r#"{"rules":[
            {"distribution":"Hi","visits_required":5},
            {"distribution":"Lo","visits_required":1}
        ]}"#;
        let table: EscalationTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.resolve(2), Some("Lo"));
        assert_eq!(table.resolve(5), Some("Hi"));

        let zero = r#"{"rules":[{"distribution":"Now","visits_required":0}]}"#;
        assert!(serde_json::from_str::<EscalationTable>(zero).is_err());

        let blank: EscalationTable = serde_json::from_str("{}").unwrap();
        assert!(blank.is_empty());
    }

    #[test]
    fn test_escalation_tie_keeps_first_declared() {
        let table = EscalationTable::new(vec![
            EscalationRule::new("Nervous", 2),
            EscalationRule::new("Desperate", 2),
        ])
        .unwrap();
        assert_eq!(table.resolve(2), Some("Nervous"));
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let err = EscalationTable::new(vec![EscalationRule::new("Nervous", 0)]).unwrap_err();
        assert_eq!(err, SumoError::InvalidThreshold { name: "Nervous".into(), visits: 0 });
    }

    #[test]
    fn test_unknown_rule_target_rejected() {
        let table = EscalationTable::new(vec![EscalationRule::new("Ghost", 1)]).unwrap();
        let err = Combatant::new("X", Side::Left, MoveSampler::default(), table).unwrap_err();
        assert_eq!(err, SumoError::UnknownDistribution("Ghost".into()));
    }

    #[test]
    fn test_edge_visit_counts_arrivals_only() {
        let mut left = fighter(Side::Left, vec![EscalationRule::new("Nervous", 1)]);
        left.place(2);
        assert!(left.apply_column_transition(1, 5).unwrap());
        assert_eq!(left.edge_visits(), 1);
        assert_eq!(left.active_distribution(), "Nervous");

        // Same column again is not an arrival
        assert!(!left.apply_column_transition(1, 5).unwrap());
        assert_eq!(left.edge_visits(), 1);

        // Leaving and coming back is
        assert!(!left.apply_column_transition(2, 5).unwrap());
        assert!(left.apply_column_transition(1, 5).unwrap());
        assert_eq!(left.edge_visits(), 2);
    }

    #[test]
    fn test_right_near_wall_is_mirrored() {
        let mut right = fighter(Side::Right, vec![]);
        right.place(2);
        assert!(!right.apply_column_transition(1, 5).unwrap());
        assert!(right.apply_column_transition(3, 5).unwrap());
        assert_eq!(right.edge_visits(), 1);
        // No rules: stays on the base distribution
        assert_eq!(right.active_distribution(), "Default");
    }

    #[test]
    fn test_escalates_through_thresholds_and_resets() {
        let mut left = fighter(
            Side::Left,
            vec![EscalationRule::new("Nervous", 1), EscalationRule::new("Desperate", 2)],
        );
        left.place(2);
        left.apply_column_transition(1, 5).unwrap();
        assert_eq!(left.active_distribution(), "Nervous");
        left.apply_column_transition(2, 5).unwrap();
        left.apply_column_transition(1, 5).unwrap();
        assert_eq!(left.active_distribution(), "Desperate");

        left.reset_edge_visits();
        assert_eq!(left.edge_visits(), 0);
        assert_eq!(left.active_distribution(), "Default");
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut left = fighter(Side::Left, vec![]);
        assert_eq!(
            left.apply_column_transition(5, 5),
            Err(SumoError::ColumnOutOfRange { index: 5, columns: 5 })
        );
        assert_eq!(left.apply_column_transition(0, 2), Err(SumoError::TooFewColumns(2)));
    }

    #[test]
    fn test_is_at_wall() {
        let mut right = fighter(Side::Right, vec![]);
        right.place(4);
        assert!(right.is_at_wall(5));
        right.place(0);
        assert!(right.is_at_wall(5));
        right.place(3);
        assert!(!right.is_at_wall(5));
    }
}
