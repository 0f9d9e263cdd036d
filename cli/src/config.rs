//! YAML config layer: mirrors `SimulationInput` field-for-field and converts
//! into the engine's native types, the way the driver crate this is modeled
//! on deserializes its own rule struct from an external file.

use std::fs;
use std::path::Path;

use blackjack_engine::betting::{BetRamp, RampEntry};
use blackjack_engine::deviation::{CountCondition, DeviationCategory, DeviationRule};
use blackjack_engine::reality::SimulationInput;
use blackjack_engine::rules::Rules;
use blackjack_engine::strategy::Action;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub rules: ConfigRules,
    pub betting: ConfigBetting,
    pub run: ConfigRun,
    #[serde(default)]
    pub deviations: Vec<ConfigDeviationRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigRules {
    pub decks: u8,
    pub dealer_hits_soft_17: bool,
    pub double_after_split: bool,
    pub surrender_allowed: bool,
    pub blackjack_payout: f64,
    pub penetration: f64,
}

impl From<ConfigRules> for Rules {
    fn from(c: ConfigRules) -> Self {
        Rules {
            decks: c.decks,
            dealer_hits_soft_17: c.dealer_hits_soft_17,
            double_after_split: c.double_after_split,
            surrender_allowed: c.surrender_allowed,
            blackjack_payout: c.blackjack_payout,
            penetration: c.penetration,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigRampEntry {
    pub true_count_threshold: i32,
    pub bet: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigBetting {
    pub min_bet: f64,
    #[serde(default)]
    pub entries: Vec<ConfigRampEntry>,
}

impl From<ConfigBetting> for BetRamp {
    fn from(c: ConfigBetting) -> Self {
        BetRamp {
            min_bet: c.min_bet,
            entries: c
                .entries
                .into_iter()
                .map(|e| RampEntry {
                    true_count_threshold: e.true_count_threshold,
                    bet: e.bet,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigRun {
    pub hours_to_simulate: f64,
    pub hands_per_hour: u32,
    pub num_realities: u32,
    pub bankroll: f64,
    pub take_insurance: bool,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub debug: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigCountCondition {
    TrueCountAtLeast { k: i32 },
    TrueCountAtMost { k: i32 },
    RunningPositive,
    RunningNegative,
}

impl From<ConfigCountCondition> for CountCondition {
    fn from(c: ConfigCountCondition) -> Self {
        match c {
            ConfigCountCondition::TrueCountAtLeast { k } => CountCondition::TrueCountAtLeast(k),
            ConfigCountCondition::TrueCountAtMost { k } => CountCondition::TrueCountAtMost(k),
            ConfigCountCondition::RunningPositive => CountCondition::RunningPositive,
            ConfigCountCondition::RunningNegative => CountCondition::RunningNegative,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigDeviationRule {
    pub category: String,
    pub player_total: u16,
    pub is_soft: bool,
    #[serde(default)]
    pub pair_rank: Option<u8>,
    pub dealer_value: u8,
    pub action: String,
    pub count_condition: ConfigCountCondition,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl TryFrom<ConfigDeviationRule> for DeviationRule {
    type Error = ConfigError;

    fn try_from(c: ConfigDeviationRule) -> Result<Self, Self::Error> {
        let category = match c.category.as_str() {
            "hit17" => DeviationCategory::Hit17,
            "stand17" => DeviationCategory::Stand17,
            "all" => DeviationCategory::All,
            other => return Err(ConfigError::Invalid(format!("unknown deviation category: {other}"))),
        };
        let action = match c.action.as_str() {
            "hit" => Action::Hit,
            "stand" => Action::Stand,
            "double" => Action::Double,
            "split" => Action::Split,
            "surrender" => Action::Surrender,
            other => return Err(ConfigError::Invalid(format!("unknown action: {other}"))),
        };
        Ok(DeviationRule {
            category,
            player_total: c.player_total,
            is_soft: c.is_soft,
            pair_rank: c.pair_rank,
            dealer_value: c.dealer_value,
            action,
            count_condition: c.count_condition.into(),
            enabled: c.enabled,
        })
    }
}

impl TryFrom<Config> for SimulationInput {
    type Error = ConfigError;

    fn try_from(c: Config) -> Result<Self, Self::Error> {
        let deviations = c
            .deviations
            .into_iter()
            .map(DeviationRule::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SimulationInput {
            rules: c.rules.into(),
            betting: c.betting.into(),
            hours_to_simulate: c.run.hours_to_simulate,
            hands_per_hour: c.run.hands_per_hour,
            num_realities: c.run.num_realities,
            bankroll: c.run.bankroll,
            take_insurance: c.run.take_insurance,
            deviations,
            seed: c.run.seed,
            debug: c.run.debug,
        })
    }
}

/// Reads and parses a config file, converting it into a `SimulationInput`
/// ready to hand to `blackjack_engine::simulate`.
pub fn parse_config_from_file(path: &Path) -> Result<SimulationInput, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let config: Config = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    SimulationInput::try_from(config)
}
