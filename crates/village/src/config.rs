use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::Role;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path} at {field_path}: {message}")]
    Parse {
        path: PathBuf,
        field_path: String,
        message: String,
    },
    #[error("invalid config value {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BirthIntervals {
    pub farmer: f64,
    pub guard: f64,
    pub miner: f64,
}

impl Default for BirthIntervals {
    fn default() -> Self {
        Self {
            farmer: 5.0,
            guard: 7.0,
            miner: 10.0,
        }
    }
}

impl BirthIntervals {
    pub fn for_role(&self, role: Role) -> f64 {
        match role {
            Role::Farmer => self.farmer,
            Role::Guard => self.guard,
            Role::Miner => self.miner,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InitialPopulation {
    pub farmers: i32,
    pub guards: i32,
    pub miners: i32,
}

impl Default for InitialPopulation {
    fn default() -> Self {
        Self {
            farmers: 1,
            guards: 1,
            miners: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MiningConfig {
    pub decay_interval: f64,
    /// Sparkle period at one miner; divided by the (capped) miner count.
    pub sparkle_scale: f64,
    pub max_rate_miners: i32,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            decay_interval: 8.0,
            sparkle_scale: 2.0,
            max_rate_miners: 10,
        }
    }
}

/// Invader path lengths are measured in the same units as `speed`, which is
/// applied once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InvasionConfig {
    pub initial_delay: f64,
    pub min_interval: f64,
    pub max_interval: f64,
    pub time_scale: f64,
    pub interval_floor: f64,
    pub speed: f64,
    pub approach_distance: f64,
    pub corridor_distance: f64,
    pub inner_distance: f64,
    pub breach_farmer_cost: i32,
}

impl Default for InvasionConfig {
    fn default() -> Self {
        Self {
            initial_delay: 12.0,
            min_interval: 6.0,
            max_interval: 12.0,
            time_scale: 60.0,
            interval_floor: 0.1,
            speed: 0.05,
            approach_distance: 5.0,
            corridor_distance: 1.5,
            inner_distance: 7.0,
            breach_farmer_cost: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    pub seed: u64,
    pub selection_debounce: f64,
    pub initial_population: InitialPopulation,
    pub birth_intervals: BirthIntervals,
    pub mining: MiningConfig,
    pub invasion: InvasionConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed_0f_1a11,
            selection_debounce: 0.5,
            initial_population: InitialPopulation::default(),
            birth_intervals: BirthIntervals::default(),
            mining: MiningConfig::default(),
            invasion: InvasionConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_negative("selection_debounce", self.selection_debounce)?;
        require_positive("birth_intervals.farmer", self.birth_intervals.farmer)?;
        require_positive("birth_intervals.guard", self.birth_intervals.guard)?;
        require_positive("birth_intervals.miner", self.birth_intervals.miner)?;
        require_positive("mining.decay_interval", self.mining.decay_interval)?;
        require_positive("mining.sparkle_scale", self.mining.sparkle_scale)?;
        if self.mining.max_rate_miners < 1 {
            return Err(invalid(
                "mining.max_rate_miners",
                format!("must be at least 1, got {}", self.mining.max_rate_miners),
            ));
        }

        let population = &self.initial_population;
        for (field, value) in [
            ("initial_population.guards", population.guards),
            ("initial_population.miners", population.miners),
        ] {
            if value < 0 {
                return Err(invalid(field, format!("must not be negative, got {value}")));
            }
        }
        if population.farmers < 1 {
            return Err(invalid(
                "initial_population.farmers",
                format!("must be at least 1, got {}", population.farmers),
            ));
        }

        let invasion = &self.invasion;
        require_non_negative("invasion.initial_delay", invasion.initial_delay)?;
        require_positive("invasion.min_interval", invasion.min_interval)?;
        require_positive("invasion.max_interval", invasion.max_interval)?;
        require_positive("invasion.time_scale", invasion.time_scale)?;
        require_positive("invasion.interval_floor", invasion.interval_floor)?;
        require_positive("invasion.speed", invasion.speed)?;
        require_positive("invasion.approach_distance", invasion.approach_distance)?;
        require_positive("invasion.corridor_distance", invasion.corridor_distance)?;
        require_positive("invasion.inner_distance", invasion.inner_distance)?;
        if invasion.min_interval > invasion.max_interval {
            return Err(invalid(
                "invasion.min_interval",
                format!(
                    "must not exceed max_interval ({} > {})",
                    invasion.min_interval, invasion.max_interval
                ),
            ));
        }
        if invasion.breach_farmer_cost < 1 {
            return Err(invalid(
                "invasion.breach_farmer_cost",
                format!("must be at least 1, got {}", invasion.breach_farmer_cost),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub target_tps: u32,
    pub max_seconds: Option<f32>,
    pub realtime: bool,
    pub exit_on_death: bool,
    pub axis_threshold: f32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            target_tps: 60,
            max_seconds: Some(300.0),
            realtime: false,
            exit_on_death: true,
            axis_threshold: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VillageConfig {
    pub sim: SimConfig,
    pub run: RunConfig,
}

impl VillageConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse_json(path, &raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn parse_json(path: &Path, raw: &str) -> Result<Self, ConfigError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        serde_path_to_error::deserialize::<_, VillageConfig>(&mut deserializer).map_err(|error| {
            let field_path = error.path().to_string();
            let source = error.into_inner();
            ConfigError::Parse {
                path: path.to_path_buf(),
                field_path: if field_path.is_empty() {
                    ".".to_string()
                } else {
                    field_path
                },
                message: source.to_string(),
            }
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sim.validate()?;
        if let Some(seconds) = self.run.max_seconds {
            require_positive("run.max_seconds", f64::from(seconds))?;
        }
        if !self.run.axis_threshold.is_finite()
            || self.run.axis_threshold < 0.0
            || self.run.axis_threshold >= 1.0
        {
            return Err(invalid(
                "run.axis_threshold",
                format!("must be within [0, 1), got {}", self.run.axis_threshold),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, message: String) -> ConfigError {
    ConfigError::Invalid { field, message }
}

fn require_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("expected a positive number, got {value}")))
    }
}

fn require_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(
            field,
            format!("expected a non-negative number, got {value}"),
        ))
    }
}
