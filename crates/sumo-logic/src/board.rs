//! Board layout
//!
//! The board is a line of evenly spaced columns between two anchor
//! points. Column 0 is the left wall, the last column the right wall.

use glam::DVec3;
use serde::Serialize;

use crate::combatant::Side;

/// Smallest playable board
pub const MIN_COLUMNS: usize = 3;

/// Anchors closer than this are treated as coincident
const ANCHOR_EPSILON: f64 = 1e-6;

/// Coerce a requested column count to an odd number of at least 3
pub fn coerce_columns(requested: usize) -> usize {
    let columns = requested.max(MIN_COLUMNS);
    if columns % 2 == 0 {
        columns + 1
    } else {
        columns
    }
}

/// Immutable column positions for one match setup
///
/// Only `setup` builds one, so the column count is always odd and at
/// least 3. It serializes for the presentation layer but is never read
/// back.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BoardLayout {
    positions: Vec<DVec3>,
    axis: DVec3,
    midpoint: DVec3,
}

impl BoardLayout {
    /// Lay out `columns` points between two anchors.
    ///
    /// The column count is forced odd and at least 3, the span multiplier
    /// non-negative. Points run from the `anchor_a` side to the
    /// `anchor_b` side, centered on their midpoint and spanning
    /// `distance(a, b) * span_multiplier`. If the anchors coincide the
    /// board runs along +X.
    pub fn setup(anchor_a: DVec3, anchor_b: DVec3, columns: usize, span_multiplier: f64) -> Self {
        let count = coerce_columns(columns);
        if count != columns {
            log::warn!("board column count {} coerced to {}", columns, count);
        }
        let multiplier = if span_multiplier.is_finite() && span_multiplier > 0.0 {
            span_multiplier
        } else {
            if span_multiplier != 0.0 {
                log::warn!("board span multiplier {} coerced to 0", span_multiplier);
            }
            0.0
        };

        let midpoint = anchor_a.lerp(anchor_b, 0.5);
        let delta = anchor_b - anchor_a;
        let distance = delta.length();
        let axis = if distance < ANCHOR_EPSILON {
            DVec3::X
        } else {
            delta / distance
        };

        let span = distance * multiplier;
        let half = span * 0.5;
        let step = span / (count - 1) as f64;

        let positions = (0..count)
            .map(|i| midpoint + axis * (-half + step * i as f64))
            .collect();

        Self { positions, axis, midpoint }
    }

    pub fn positions(&self) -> &[DVec3] {
        &self.positions
    }

    pub fn column_count(&self) -> usize {
        self.positions.len()
    }

    pub fn center_index(&self) -> usize {
        self.positions.len() / 2
    }

    pub fn last_index(&self) -> usize {
        self.positions.len() - 1
    }

    pub fn midpoint(&self) -> DVec3 {
        self.midpoint
    }

    /// Unit direction from the left wall toward the right wall
    pub fn axis(&self) -> DVec3 {
        self.axis
    }

    pub fn position(&self, index: usize) -> Option<DVec3> {
        self.positions.get(index).copied()
    }

    pub fn is_wall(&self, index: usize) -> bool {
        index == 0 || index == self.last_index()
    }

    /// Where a combatant stands on a column: the column point pushed
    /// back toward its own side so two fighters sharing a column do not
    /// overlap.
    pub fn stance(&self, side: Side, index: usize, lateral_separation: f64) -> Option<DVec3> {
        let base = self.position(index)?;
        let offset = match side {
            Side::Left => -lateral_separation,
            Side::Right => lateral_separation,
        };
        Some(base + self.axis * offset)
    }
}
