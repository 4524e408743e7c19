//! Agent hyperparameters and training settings

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, AgentResult};
use crate::learner::QLearner;

/// Default ply cap per self-play episode
///
/// Random self-play games often run past 500 plies before the rules engine
/// ends them, and a capped episode never sees its terminal reward. The cap
/// only guards against a rules engine that never reports game over; with the
/// 75-move rule, natural games stay well below it.
pub const DEFAULT_MAX_PLIES: usize = 10_000;

/// Configuration fixed at agent construction
///
/// Every field has a default so partial JSON settings files deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Step size alpha of the Q-learning update
    pub learning_rate: f64,
    /// Discount gamma applied to the next state's best value
    pub discount_factor: f64,
    /// Probability epsilon of playing a random move
    pub exploration_rate: f64,
    /// Persist the table after every this many completed training episodes
    pub snapshot_interval: usize,
    /// Maximum plies per self-play episode, `None` relies on the rules engine alone
    pub max_plies: Option<usize>,
    /// Seed for the interactive and training RNGs, `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.9,
            exploration_rate: 0.3,
            snapshot_interval: 10,
            max_plies: Some(DEFAULT_MAX_PLIES),
            seed: None,
        }
    }
}

impl AgentConfig {
    pub fn learner(&self) -> QLearner {
        QLearner::new(self.learning_rate, self.discount_factor)
    }

    pub fn validate(&self) -> AgentResult<()> {
        for (name, value) in [
            ("learning_rate", self.learning_rate),
            ("discount_factor", self.discount_factor),
            ("exploration_rate", self.exploration_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(AgentError::Config {
                    message: format!("{name} must be within [0, 1], got {value}"),
                });
            }
        }
        if self.snapshot_interval == 0 {
            return Err(AgentError::Config {
                message: "snapshot_interval must be at least 1".to_string(),
            });
        }
        if self.max_plies == Some(0) {
            return Err(AgentError::Config {
                message: "max_plies must be at least 1 when set".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.learning_rate, 0.1);
        assert_eq!(config.discount_factor, 0.9);
        assert_eq!(config.exploration_rate, 0.3);
        assert_eq!(config.snapshot_interval, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AgentConfig =
            serde_json::from_str(r#"{"exploration_rate": 0.05}"#).expect("deserializes");
        assert_eq!(config.exploration_rate, 0.05);
        assert_eq!(config.learning_rate, 0.1);
        assert_eq!(config.max_plies, Some(DEFAULT_MAX_PLIES));
    }

    #[test]
    fn test_default_cap_leaves_room_for_long_games() {
        //! Random games past 500 plies are common and must reach their ending
        let config = AgentConfig::default();
        assert!(config.max_plies.is_some_and(|cap| cap >= 5_000));
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let config = AgentConfig {
            exploration_rate: 1.5,
            ..AgentConfig::default()
        };
        assert!(matches!(config.validate(), Err(AgentError::Config { .. })));

        let config = AgentConfig {
            learning_rate: f64::NAN,
            ..AgentConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AgentConfig {
            snapshot_interval: 0,
            ..AgentConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AgentConfig {
            max_plies: Some(0),
            ..AgentConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
