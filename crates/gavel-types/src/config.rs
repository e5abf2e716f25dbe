//! Engine configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! overrides.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{GavelError, HoldBackPolicy, Result, Settings, constants};

/// Simulation driver tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Pause between simulated commands.
    pub step_delay_ms: u64,
    /// RNG seed. `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Teams required before a simulation may start.
    pub min_teams: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            step_delay_ms: constants::DEFAULT_SIM_STEP_DELAY_MS,
            seed: None,
            min_teams: constants::MIN_SIMULATION_TEAMS,
        }
    }
}

/// Configuration for one auction session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Countdown tick period.
    pub tick_interval_ms: u64,
    /// Broadcast buffer per subscriber before it starts lagging.
    pub event_buffer: usize,
    /// Depth of the command queue in front of the session actor.
    pub command_queue: usize,
    /// Restricted-release policy. Restricted mode is on iff this is present
    /// and enabled.
    pub hold_back: Option<HoldBackPolicy>,
    pub simulation: SimulationConfig,
    /// Settings the session starts with (and returns to on reset).
    pub initial_settings: Settings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: constants::DEFAULT_TICK_INTERVAL_MS,
            event_buffer: constants::DEFAULT_EVENT_BUFFER,
            command_queue: constants::DEFAULT_COMMAND_QUEUE,
            hold_back: None,
            simulation: SimulationConfig::default(),
            initial_settings: Settings::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| GavelError::Configuration(format!("invalid engine config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            GavelError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(GavelError::Configuration(
                "tick_interval_ms must be positive".into(),
            ));
        }
        if self.event_buffer == 0 || self.command_queue == 0 {
            return Err(GavelError::Configuration(
                "event_buffer and command_queue must be positive".into(),
            ));
        }
        if let Some(policy) = &self.hold_back {
            if !(0.0..=1.0).contains(&policy.release_sold_fraction) {
                return Err(GavelError::Configuration(format!(
                    "release_sold_fraction must be within [0, 1], got {}",
                    policy.release_sold_fraction
                )));
            }
        }
        self.initial_settings.bid_increments.validate()
    }

    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// The active hold-back policy, if restricted mode is on.
    #[must_use]
    pub fn restricted_policy(&self) -> Option<&HoldBackPolicy> {
        self.hold_back.as_ref().filter(|policy| policy.enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Category, ConditionalHold, UnlockRule};

    #[test]
    fn defaults() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.tick_interval(), Duration::from_secs(1));
        assert_eq!(cfg.simulation.min_teams, 2);
        assert!(cfg.restricted_policy().is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg = EngineConfig::from_json(r#"{"tick_interval_ms": 250}"#).unwrap();
        assert_eq!(cfg.tick_interval_ms, 250);
        assert_eq!(cfg.command_queue, constants::DEFAULT_COMMAND_QUEUE);
        assert_eq!(cfg.initial_settings, Settings::default());
    }

    #[test]
    fn hold_back_from_json() {
        let json = r#"{
            "hold_back": {
                "enabled": true,
                "held_back": ["Star One"],
                "conditional": [
                    {"name": "Late Bloomer",
                     "rule": {"category_sold_at_least": {"category": "Platinum", "count": 4}}},
                    {"name": "Closer", "rule": {"pool_at_most": {"remaining": 5}}}
                ],
                "release_sold_fraction": 0.6
            }
        }"#;
        let cfg = EngineConfig::from_json(json).unwrap();
        let policy = cfg.restricted_policy().unwrap();
        assert_eq!(policy.held_back, vec!["Star One".to_string()]);
        assert_eq!(
            policy.conditional[0],
            ConditionalHold {
                name: "Late Bloomer".into(),
                rule: UnlockRule::CategorySoldAtLeast {
                    category: Category::Platinum,
                    count: 4
                }
            }
        );
    }

    #[test]
    fn disabled_policy_is_not_restricted() {
        let cfg = EngineConfig {
            hold_back: Some(HoldBackPolicy::default()),
            ..EngineConfig::default()
        };
        assert!(cfg.restricted_policy().is_none());
    }

    #[test]
    fn zero_tick_rejected() {
        let err = EngineConfig::from_json(r#"{"tick_interval_ms": 0}"#).unwrap_err();
        assert!(matches!(err, GavelError::Configuration(_)));
    }

    #[test]
    fn missing_file_is_configuration_error() {
        let err = EngineConfig::load("/nonexistent/gavel.json").unwrap_err();
        assert!(err.to_string().starts_with("GV_ERR_902"));
    }
}
