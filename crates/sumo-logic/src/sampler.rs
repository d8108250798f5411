//! Moves, weighted distributions and sampling

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SumoError};

/// A throw in sumo rock-paper-scissors
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Rock,
    Paper,
    Scissors,
    /// Very rare throw that beats everything but itself
    Super,
}

impl Move {
    pub const ALL: [Move; 4] = [Move::Rock, Move::Paper, Move::Scissors, Move::Super];

    /// True if `self` strictly beats `other`
    pub fn beats(self, other: Move) -> bool {
        match (self, other) {
            (Move::Super, Move::Super) => false,
            (Move::Super, _) => true,
            (_, Move::Super) => false,
            (Move::Rock, Move::Scissors) | (Move::Paper, Move::Rock) | (Move::Scissors, Move::Paper) => true,
            _ => false,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Move::Rock => "Rock",
            Move::Paper => "Paper",
            Move::Scissors => "Scissors",
            Move::Super => "Super",
        }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub const DEFAULT_DISTRIBUTION: &str = "Default";

fn default_name() -> String {
    DEFAULT_DISTRIBUTION.to_string()
}

/// Named weights over the four moves. Weights left out of a config
/// file are 0, and a deserialized distribution is already normalized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "DistributionParts")]
pub struct Distribution {
    pub name: String,
    pub rock: f64,
    pub paper: f64,
    pub scissors: f64,
    #[serde(rename = "super")]
    pub super_move: f64,
}

#[derive(Deserialize)]
struct DistributionParts {
    #[serde(default = "default_name")]
    name: String,
    #[serde(default)]
    rock: f64,
    #[serde(default)]
    paper: f64,
    #[serde(default)]
    scissors: f64,
    #[serde(default, rename = "super")]
    super_move: f64,
}

impl From<DistributionParts> for Distribution {
    fn from(parts: DistributionParts) -> Self {
        let mut d = Distribution::new(parts.name, parts.rock, parts.paper, parts.scissors, parts.super_move);
        d.normalize();
        d
    }
}

impl Default for Distribution {
    fn default() -> Self {
        Self {
            name: DEFAULT_DISTRIBUTION.to_string(),
            rock: 0.33,
            paper: 0.33,
            scissors: 0.33,
            super_move: 0.01,
        }
    }
}

impl Distribution {
    pub fn new(name: impl Into<String>, rock: f64, paper: f64, scissors: f64, super_move: f64) -> Self {
        Self {
            name: name.into(),
            rock,
            paper,
            scissors,
            super_move,
        }
    }

    /// All weight on a single move
    pub fn only(name: impl Into<String>, mv: Move) -> Self {
        let mut d = Self::new(name, 0.0, 0.0, 0.0, 0.0);
        match mv {
            Move::Rock => d.rock = 1.0,
            Move::Paper => d.paper = 1.0,
            Move::Scissors => d.scissors = 1.0,
            Move::Super => d.super_move = 1.0,
        }
        d
    }

    pub fn weights(&self) -> [f64; 4] {
        [self.rock, self.paper, self.scissors, self.super_move]
    }

    pub fn weight(&self, mv: Move) -> f64 {
        match mv {
            Move::Rock => self.rock,
            Move::Paper => self.paper,
            Move::Scissors => self.scissors,
            Move::Super => self.super_move,
        }
    }

    /// Scale weights to sum to 1.
    ///
    /// Negative and non-finite weights count as 0. A non-positive sum
    /// falls back to an even split over rock, paper and scissors.
    pub fn normalize(&mut self) {
        for w in [&mut self.rock, &mut self.paper, &mut self.scissors, &mut self.super_move] {
            if !w.is_finite() || *w < 0.0 {
                *w = 0.0;
            }
        }
        let sum: f64 = self.weights().iter().sum();
        if sum <= 0.0 {
            log::warn!("distribution {:?} has no weight; using uniform rock/paper/scissors", self.name);
            self.rock = 1.0 / 3.0;
            self.paper = 1.0 / 3.0;
            self.scissors = 1.0 / 3.0;
            self.super_move = 0.0;
            return;
        }
        self.rock /= sum;
        self.paper /= sum;
        self.scissors /= sum;
        self.super_move /= sum;
    }

    /// Map a draw in [0, 1) onto the cumulative bands
    /// Rock, Paper, Scissors, Super.
    pub fn pick(&self, r: f64) -> Move {
        let mut acc = 0.0;
        for mv in [Move::Rock, Move::Paper, Move::Scissors] {
            acc += self.weight(mv);
            if r < acc {
                return mv;
            }
        }
        Move::Super
    }
}

/// A combatant's set of distributions with one marked active
///
/// Never empty and names are unique. Deserializing goes through
/// [`MoveSampler::new`], so JSON cannot break either rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SamplerParts")]
pub struct MoveSampler {
    distributions: Vec<Distribution>,
    current: usize,
}

#[derive(Deserialize)]
struct SamplerParts {
    distributions: Vec<Distribution>,
    #[serde(default)]
    current: usize,
}

impl TryFrom<SamplerParts> for MoveSampler {
    type Error = SumoError;

    fn try_from(parts: SamplerParts) -> Result<Self> {
        let mut sampler = MoveSampler::new(parts.distributions)?;
        if !sampler.select_index(parts.current) {
            return Err(SumoError::InvalidConfig(format!(
                "active distribution {} out of range for {} distributions",
                parts.current,
                sampler.len()
            )));
        }
        Ok(sampler)
    }
}

impl Default for MoveSampler {
    fn default() -> Self {
        Self {
            distributions: vec![Distribution::default()],
            current: 0,
        }
    }
}

impl MoveSampler {
    /// Build from one or more distributions; each is normalized and the
    /// first becomes active.
    pub fn new(distributions: Vec<Distribution>) -> Result<Self> {
        if distributions.is_empty() {
            return Err(SumoError::EmptyDistributions);
        }
        let mut normalized: Vec<Distribution> = Vec::with_capacity(distributions.len());
        for mut d in distributions {
            if normalized.iter().any(|n| n.name == d.name) {
                return Err(SumoError::DuplicateDistribution(d.name));
            }
            d.normalize();
            normalized.push(d);
        }
        Ok(Self {
            distributions: normalized,
            current: 0,
        })
    }

    pub fn get(&self, name: &str) -> Option<&Distribution> {
        self.distributions.iter().find(|d| d.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<&str> {
        self.distributions.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.distributions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distributions.is_empty()
    }

    pub fn current(&self) -> &Distribution {
        &self.distributions[self.current]
    }

    pub fn current_name(&self) -> &str {
        &self.current().name
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Draw one move from the named distribution
    pub fn sample<R: Rng + ?Sized>(&self, name: &str, rng: &mut R) -> Result<Move> {
        let dist = self
            .get(name)
            .ok_or_else(|| SumoError::UnknownDistribution(name.to_string()))?;
        let r: f64 = rng.gen();
        Ok(dist.pick(r))
    }

    /// Activate a distribution by name. Returns false and leaves the
    /// active one untouched if no distribution has that name.
    pub fn select(&mut self, name: &str) -> bool {
        match self.distributions.iter().position(|d| d.name == name) {
            Some(idx) => {
                self.current = idx;
                true
            }
            None => false,
        }
    }

    /// Activate a distribution by position; out of range is ignored
    pub fn select_index(&mut self, index: usize) -> bool {
        if index < self.distributions.len() {
            self.current = index;
            true
        } else {
            false
        }
    }

    pub fn next(&mut self) {
        self.current = (self.current + 1) % self.distributions.len();
    }

    pub fn prev(&mut self) {
        let n = self.distributions.len();
        self.current = (self.current + n - 1) % n;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SeededRng;
    use proptest::prelude::*;

    fn sum(d: &Distribution) -> f64 {
        d.weights().iter().sum()
    }

    #[test]
    fn test_beats_table() {
        assert!(Move::Rock.beats(Move::Scissors));
        assert!(Move::Scissors.beats(Move::Paper));
        assert!(Move::Paper.beats(Move::Rock));
        assert!(!Move::Scissors.beats(Move::Rock));
        assert!(!Move::Rock.beats(Move::Rock));
        for mv in [Move::Rock, Move::Paper, Move::Scissors] {
            assert!(Move::Super.beats(mv));
            assert!(!mv.beats(Move::Super));
        }
        assert!(!Move::Super.beats(Move::Super));
    }

    #[test]
    fn test_dominance_is_antisymmetric() {
        for a in Move::ALL {
            for b in Move::ALL {
                if a == b {
                    assert!(!a.beats(b));
                } else {
                    assert!(a.beats(b) ^ b.beats(a), "{} vs {}", a, b);
                }
            }
        }
    }

    #[test]
    fn test_default_normalizes() {
        let mut d = Distribution::default();
        d.normalize();
        assert!((sum(&d) - 1.0).abs() < 1e-12);
        assert!((d.super_move - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_zero_sum_falls_back_to_uniform() {
        let mut d = Distribution::new("Empty", 0.0, 0.0, 0.0, 0.0);
        d.normalize();
        assert_eq!(d.rock, 1.0 / 3.0);
        assert_eq!(d.paper, 1.0 / 3.0);
        assert_eq!(d.scissors, 1.0 / 3.0);
        assert_eq!(d.super_move, 0.0);
    }

    #[test]
    fn test_negative_weights_ignored() {
        let mut d = Distribution::new("Neg", -1.0, 2.0, 0.0, 0.0);
        d.normalize();
        assert_eq!(d.rock, 0.0);
        assert_eq!(d.paper, 1.0);
    }

    #[test]
    fn test_pick_bands() {
        let d = Distribution::new("Even", 0.25, 0.25, 0.25, 0.25);
        assert_eq!(d.pick(0.0), Move::Rock);
        assert_eq!(d.pick(0.3), Move::Paper);
        assert_eq!(d.pick(0.6), Move::Scissors);
        assert_eq!(d.pick(0.9), Move::Super);
        // Past every band closes on Super
        assert_eq!(d.pick(1.5), Move::Super);
    }

    #[test]
    fn test_forced_distributions() {
        assert_eq!(Distribution::only("R", Move::Rock).pick(0.0), Move::Rock);
        assert_eq!(Distribution::only("S", Move::Scissors).pick(0.0), Move::Scissors);
        assert_eq!(Distribution::only("S", Move::Scissors).pick(0.999), Move::Scissors);
    }

    #[test]
    fn test_sample_unknown_name() {
        let sampler = MoveSampler::default();
        let mut rng = SeededRng::from_seed_u64(1);
        assert_eq!(
            sampler.sample("Missing", &mut rng),
            Err(SumoError::UnknownDistribution("Missing".into()))
        );
    }

    #[test]
    fn test_empty_and_duplicate_rejected() {
        assert_eq!(MoveSampler::new(vec![]), Err(SumoError::EmptyDistributions));
        let dup = vec![Distribution::default(), Distribution::default()];
        assert_eq!(MoveSampler::new(dup), Err(SumoError::DuplicateDistribution("Default".into())));
    }

    #[test]
    fn test_select_by_name_and_index() {
        let mut sampler = MoveSampler::new(vec![
            Distribution::default(),
            Distribution::only("Angry", Move::Rock),
            Distribution::only("Calm", Move::Paper),
        ])
        .unwrap();
        assert_eq!(sampler.current_name(), "Default");
        assert!(sampler.select("Calm"));
        assert_eq!(sampler.current_name(), "Calm");
        assert!(!sampler.select("calm"));
        assert_eq!(sampler.current_name(), "Calm");
        assert!(sampler.select_index(1));
        assert_eq!(sampler.current_name(), "Angry");
        assert!(!sampler.select_index(3));
        assert_eq!(sampler.names(), vec!["Default", "Angry", "Calm"]);
    }

    #[test]
    fn test_cycle_wraps() {
        let mut sampler = MoveSampler::new(vec![
            Distribution::only("A", Move::Rock),
            Distribution::only("B", Move::Paper),
        ])
        .unwrap();
        sampler.prev();
        assert_eq!(sampler.current_name(), "B");
        sampler.next();
        assert_eq!(sampler.current_name(), "A");
    }

    #[test]
    fn test_sampling_frequencies() {
        let sampler = MoveSampler::new(vec![Distribution::new("Skew", 0.7, 0.2, 0.1, 0.0)]).unwrap();
        let mut rng = SeededRng::from_seed_u64(99);
        let mut counts = [0u32; 4];
        for _ in 0..10_000 {
            let mv = sampler.sample("Skew", &mut rng).unwrap();
            counts[mv as usize] += 1;
        }
        assert_eq!(counts[3], 0);
        assert!(counts[0] > 6_500 && counts[0] < 7_500, "rock {}", counts[0]);
        assert!(counts[1] > 1_600 && counts[1] < 2_400, "paper {}", counts[1]);
    }

    #[test]
    fn test_deserialized_sampler_is_validated() {
        let empty = serde_json::from_str::<MoveSampler>(r#"{"distributions":[],"current":0}"#);
        assert!(empty.is_err());

        let dup = r#"{"distributions":[{"name":"A","rock":1},{"name":"A","paper":1}]}"#;
        assert!(serde_json::from_str::<MoveSampler>(dup).is_err());

        let past_end = r#"{"distributions":[{"name":"A","rock":1}],"current":1}"#;
        assert!(serde_json::from_str::<MoveSampler>(past_end).is_err());

        let ok = r#"{"distributions":[{"name":"A","rock":1},{"name":"B","paper":1}],"current":1}"#;
        let mut sampler: MoveSampler = serde_json::from_str(ok).unwrap();
        assert_eq!(sampler.current_name(), "B");
        sampler.next();
        assert_eq!(sampler.current_name(), "A");
    }

    #[test]
    fn test_deserialized_distribution_is_normalized() {
        let d: Distribution = serde_json::from_str(r#"{"name":"A","rock":5,"paper":5}"#).unwrap();
        assert_eq!(d.weights(), [0.5, 0.5, 0.0, 0.0]);

        let blank: Distribution = serde_json::from_str("{}").unwrap();
        assert_eq!(blank.name, DEFAULT_DISTRIBUTION);
        assert_eq!(blank.super_move, 0.0);
        assert!((sum(&blank) - 1.0).abs() < 1e-12);

        let sampler: MoveSampler =
            serde_json::from_str(r#"{"distributions":[{"name":"A","rock":5,"paper":5}]}"#).unwrap();
        assert_eq!(sampler.current().weights(), [0.5, 0.5, 0.0, 0.0]);
    }

    #[test]
    fn test_sampler_serde_keeps_active() {
        let mut sampler = MoveSampler::new(vec![
            Distribution::only("A", Move::Rock),
            Distribution::only("B", Move::Scissors),
        ])
        .unwrap();
        sampler.select("B");
        let back: MoveSampler = serde_json::from_str(&serde_json::to_string(&sampler).unwrap()).unwrap();
        assert_eq!(back, sampler);
    }

    proptest! {
        #[test]
        fn prop_normalize_sums_to_one(
            rock in -1.0f64..10.0,
            paper in -1.0f64..10.0,
            scissors in -1.0f64..10.0,
            sup in -1.0f64..10.0,
        ) {
            let mut d = Distribution::new("P", rock, paper, scissors, sup);
            d.normalize();
            prop_assert!((sum(&d) - 1.0).abs() < 1e-9);
            prop_assert!(d.weights().iter().all(|w| *w >= 0.0));

            let once = d.clone();
            d.normalize();
            for (a, b) in once.weights().iter().zip(d.weights().iter()) {
                prop_assert!((a - b).abs() < 1e-12);
            }
        }
    }
}
