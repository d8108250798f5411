//! Series configuration
//!
//! Everything the embedding application supplies before a series
//! starts. Loaded from JSON with every field optional; missing fields
//! take the defaults below.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::combatant::{Combatant, EscalationRule, EscalationTable, Side};
use crate::error::{Result, SumoError};
use crate::sampler::{Distribution, MoveSampler};

/// Values the engine only carries for the presentation layer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    /// Scene units per second when a fighter is pushed
    pub push_speed: f64,
    /// Offset of each fighter from its column, away from the opponent
    pub lateral_separation: f64,
    pub feedback_duration: f64,
    pub feedback_nudge: f64,
    pub feedback_scale: f64,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            push_speed: 4.0,
            lateral_separation: 0.6,
            feedback_duration: 0.25,
            feedback_nudge: 0.22,
            feedback_scale: 1.12,
        }
    }
}

/// Board and series rules plus advisory timing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchSettings {
    pub columns: usize,
    pub span_multiplier: f64,
    /// Series length in matches; forced odd and at least 1
    pub best_of: u32,
    /// Seconds counted down before each throw (advisory)
    pub countdown_start: u32,
    /// Seconds between rounds (advisory)
    pub round_delay: f64,
    pub presentation: PresentationConfig,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            columns: 5,
            span_multiplier: 1.0,
            best_of: 3,
            countdown_start: 3,
            round_delay: 1.0,
            presentation: PresentationConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatantConfig {
    pub name: String,
    pub distributions: Vec<Distribution>,
    /// Distribution active at the start; defaults to the first one
    pub initial_distribution: Option<String>,
    pub escalation: Vec<EscalationRule>,
}

impl Default for CombatantConfig {
    fn default() -> Self {
        Self {
            name: "Fighter".to_string(),
            distributions: vec![Distribution::default()],
            initial_distribution: None,
            escalation: Vec::new(),
        }
    }
}

impl CombatantConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn build(&self, side: Side) -> Result<Combatant> {
        let mut sampler = MoveSampler::new(self.distributions.clone())?;
        if let Some(initial) = &self.initial_distribution {
            if !sampler.select(initial) {
                return Err(SumoError::UnknownDistribution(initial.clone()));
            }
        }
        let escalation = EscalationTable::new(self.escalation.clone())?;
        Combatant::new(self.name.clone(), side, sampler, escalation)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SumoConfig {
    pub settings: MatchSettings,
    pub left_anchor: Option<DVec3>,
    pub right_anchor: Option<DVec3>,
    pub left: CombatantConfig,
    pub right: CombatantConfig,
}

impl Default for SumoConfig {
    fn default() -> Self {
        Self {
            settings: MatchSettings::default(),
            left_anchor: None,
            right_anchor: None,
            left: CombatantConfig::named("Left"),
            right: CombatantConfig::named("Right"),
        }
    }
}

impl SumoConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Both anchors, or None if neither was given.
    ///
    /// Exactly one anchor is a configuration error.
    pub fn anchors(&self) -> Result<Option<(DVec3, DVec3)>> {
        match (self.left_anchor, self.right_anchor) {
            (Some(a), Some(b)) => Ok(Some((a, b))),
            (None, None) => Ok(None),
            (Some(_), None) => Err(SumoError::InvalidConfig("right_anchor is missing".into())),
            (None, Some(_)) => Err(SumoError::InvalidConfig("left_anchor is missing".into())),
        }
    }
}
