//! WASM bindings for a browser presentation layer

#![cfg(feature = "wasm")]

use glam::DVec3;
use wasm_bindgen::prelude::*;

use crate::{run_series, MatchEngine, SeededRng, Side, SumoConfig};

fn parse_seed(seed: &[u8]) -> Result<[u8; 32], JsError> {
    seed.try_into()
        .map_err(|_| JsError::new("Seed must be exactly 32 bytes"))
}

fn seeded_engine(config_json: &str, seed: &[u8]) -> Result<MatchEngine<SeededRng>, JsError> {
    let config = SumoConfig::from_json(config_json)
        .map_err(|e| JsError::new(&format!("Invalid config: {}", e)))?;
    let base = SeededRng::new(&parse_seed(seed)?, 0);
    Ok(MatchEngine::from_config(&config, base.for_side(Side::Left), base.for_side(Side::Right))?)
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// A live series driven one round at a time by the page.
///
/// The page animates between calls; the engine state is already final
/// when `resolveRound` returns.
#[wasm_bindgen]
pub struct SumoSession {
    engine: MatchEngine<SeededRng>,
}

#[wasm_bindgen]
impl SumoSession {
    /// `config_json` is a serialized SumoConfig (every field optional),
    /// `seed` 32 bytes.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, seed: &[u8]) -> Result<SumoSession, JsError> {
        Ok(SumoSession {
            engine: seeded_engine(config_json, seed)?,
        })
    }

    /// Lay out the board between two scene points. Returns the column
    /// positions flattened as x, y, z triples.
    pub fn setup(&mut self, ax: f64, ay: f64, az: f64, bx: f64, by: f64, bz: f64) -> js_sys::Float64Array {
        let board = self.engine.setup(DVec3::new(ax, ay, az), DVec3::new(bx, by, bz));
        let flat: Vec<f64> = board
            .positions()
            .iter()
            .flat_map(|p| [p.x, p.y, p.z])
            .collect();
        js_sys::Float64Array::from(&flat[..])
    }

    /// Play one round; returns the RoundReport with its events
    #[wasm_bindgen(js_name = resolveRound)]
    pub fn resolve_round(&mut self) -> Result<JsValue, JsError> {
        let report = self.engine.resolve_round()?;
        to_js(&report)
    }

    /// HUD lines for the last report's events, in order
    #[wasm_bindgen(js_name = statusLines)]
    pub fn status_lines(&self, report: JsValue) -> Result<Vec<String>, JsError> {
        let report: crate::RoundReport = serde_wasm_bindgen::from_value(report)
            .map_err(|e| JsError::new(&format!("Invalid report: {}", e)))?;
        let left = self.engine.combatant(Side::Left).name();
        let right = self.engine.combatant(Side::Right).name();
        Ok(report
            .events
            .iter()
            .filter_map(|e| e.status_line(left, right))
            .collect())
    }

    /// Round wins, match wins, best-of and wins needed
    pub fn scores(&self) -> Result<JsValue, JsError> {
        to_js(self.engine.scores())
    }

    pub fn snapshot(&self) -> Result<JsValue, JsError> {
        to_js(&self.engine.snapshot())
    }

    pub fn restart(&mut self) {
        self.engine.restart();
    }

    #[wasm_bindgen(js_name = isComplete)]
    pub fn is_complete(&self) -> bool {
        self.engine.is_complete()
    }
}

/// Play a whole series without a page in the loop
///
/// # Returns
/// Serialized SeriesResult
#[wasm_bindgen]
pub fn replay_series(config_json: &str, seed: &[u8], max_rounds: u32) -> Result<JsValue, JsError> {
    let mut engine = seeded_engine(config_json, seed)?;
    if engine.board().is_none() {
        return Err(JsError::new("Config needs left_anchor and right_anchor to replay"));
    }
    let result = run_series(&mut engine, max_rounds)?;
    to_js(&result)
}

/// Default configuration as JSON, for editors to start from
#[wasm_bindgen]
pub fn default_config() -> Result<String, JsError> {
    Ok(SumoConfig::default().to_json()?)
}

#[derive(serde::Serialize)]
struct ValidationResult {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Validate a config without starting a series
///
/// Returns `{valid: true}` or `{valid: false, error: "..."}`.
/// Never throws; validation errors are returned as structured data.
#[wasm_bindgen]
pub fn validate_config(config_json: &str) -> JsValue {
    let checked = SumoConfig::from_json(config_json).and_then(|config| {
        config.anchors()?;
        config.left.build(Side::Left)?;
        config.right.build(Side::Right)?;
        Ok(())
    });
    let result = match checked {
        Ok(()) => ValidationResult { valid: true, error: None },
        Err(e) => ValidationResult { valid: false, error: Some(e.to_string()) },
    };
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

#[derive(serde::Serialize)]
struct MoveInfo {
    id: String,
    beats: Vec<String>,
    description: String,
}

/// All throws with what each one beats
#[wasm_bindgen]
pub fn describe_move_types() -> Result<JsValue, JsError> {
    let describe = |mv: crate::Move| match mv {
        crate::Move::Rock => "Crushes scissors.",
        crate::Move::Paper => "Covers rock.",
        crate::Move::Scissors => "Cuts paper.",
        crate::Move::Super => "Very rare. Beats every other throw.",
    };
    let types: Vec<MoveInfo> = crate::Move::ALL
        .iter()
        .map(|mv| MoveInfo {
            id: mv.name().to_string(),
            beats: crate::Move::ALL
                .iter()
                .filter(|other| mv.beats(**other))
                .map(|other| other.name().to_string())
                .collect(),
            description: describe(*mv).to_string(),
        })
        .collect();
    to_js(&types)
}
