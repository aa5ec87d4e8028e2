use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What happens when an agent without a power-up touches an enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactRule {
    /// Score penalty and respawn at the level start cell.
    #[default]
    Lenient,
    /// The session ends immediately.
    Strict,
}

/// How enemies pick whom to chase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyBehaviorMode {
    /// Always pursue whichever agent is nearer.
    #[default]
    Greedy,
    /// Commit to a close target for a bounded number of moves.
    LockOn,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("tick_ms must be greater than zero")]
    ZeroTick,
    #[error("max_catch_up_ticks must be at least 1")]
    ZeroCatchUp,
    #[error("agent_speed ({speed}) must be positive and divide cell_size ({cell_size}) evenly")]
    SpeedMismatch { speed: f32, cell_size: f32 },
    #[error("align_tolerance ({tolerance}) must be non-negative and below agent_speed ({speed})")]
    Tolerance { tolerance: f32, speed: f32 },
    #[error("{name} must lie in [0, 1], got {value}")]
    Probability { name: &'static str, value: f64 },
    #[error("base_enemies must be at least 1")]
    NoEnemies,
    #[error("enemy_interval_floor_ms must be greater than zero")]
    ZeroEnemyInterval,
}

/// Every tunable of the engine. Missing fields fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub tick_ms: u64,
    /// Upper bound on simulation ticks run for a single host frame.
    pub max_catch_up_ticks: u32,
    pub cell_size: f32,
    /// Pixels per tick.
    pub agent_speed: f32,
    pub align_tolerance: f32,

    pub power_up_duration_ms: u64,
    pub level_transition_ms: u64,
    pub grab_animation_ticks: u32,

    pub collectible_points: u32,
    pub power_up_points: u32,
    pub enemy_defeat_points: u32,
    pub hit_penalty: u32,

    pub base_enemies: usize,
    pub max_extra_enemies: usize,
    pub enemy_interval_base_ms: u64,
    pub enemy_interval_step_ms: u64,
    pub enemy_interval_floor_ms: u64,
    pub enemy_behavior: EnemyBehaviorMode,
    pub lock_on_radius: usize,
    pub lock_on_moves: u32,

    pub ally_flee_radius: usize,
    pub ally_power_seek_radius: usize,
    pub ally_danger_radius: usize,
    pub ally_danger_penalty: usize,
    pub ally_random_move_chance: f64,
    pub ally_history_len: usize,

    pub contact_rule: ContactRule,
    /// Ends the session after this many completed levels.
    pub max_levels: Option<u32>,
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            tick_ms: 16,
            max_catch_up_ticks: 5,
            cell_size: 20.0,
            agent_speed: 2.0,
            align_tolerance: 1.0,
            power_up_duration_ms: 10_000,
            level_transition_ms: 2_000,
            grab_animation_ticks: 12,
            collectible_points: 100,
            power_up_points: 500,
            enemy_defeat_points: 500,
            hit_penalty: 200,
            base_enemies: 4,
            max_extra_enemies: 4,
            enemy_interval_base_ms: 200,
            enemy_interval_step_ms: 20,
            enemy_interval_floor_ms: 80,
            enemy_behavior: EnemyBehaviorMode::Greedy,
            lock_on_radius: 2,
            lock_on_moves: 7,
            ally_flee_radius: 3,
            ally_power_seek_radius: 5,
            ally_danger_radius: 3,
            ally_danger_penalty: 10,
            ally_random_move_chance: 0.05,
            ally_history_len: 3,
            contact_rule: ContactRule::Lenient,
            max_levels: None,
            seed: 0x5EED_CA5E,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::ZeroTick);
        }
        if self.max_catch_up_ticks == 0 {
            return Err(ConfigError::ZeroCatchUp);
        }
        let crossings = self.cell_size / self.agent_speed;
        if !(self.agent_speed > 0.0) || crossings.fract() != 0.0 {
            return Err(ConfigError::SpeedMismatch {
                speed: self.agent_speed,
                cell_size: self.cell_size,
            });
        }
        if !(self.align_tolerance >= 0.0 && self.align_tolerance < self.agent_speed) {
            return Err(ConfigError::Tolerance {
                tolerance: self.align_tolerance,
                speed: self.agent_speed,
            });
        }
        if !(0.0..=1.0).contains(&self.ally_random_move_chance) {
            return Err(ConfigError::Probability {
                name: "ally_random_move_chance",
                value: self.ally_random_move_chance,
            });
        }
        if self.base_enemies == 0 {
            return Err(ConfigError::NoEnemies);
        }
        if self.enemy_interval_floor_ms == 0 {
            return Err(ConfigError::ZeroEnemyInterval);
        }
        Ok(())
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Enemy cadence for a level: faster each level, never below the floor.
    pub fn enemy_interval_ms(&self, level_index: u32) -> u64 {
        self.enemy_interval_base_ms
            .saturating_sub(u64::from(level_index) * self.enemy_interval_step_ms)
            .max(self.enemy_interval_floor_ms)
    }

    pub fn enemy_count(&self, level_index: u32) -> usize {
        self.base_enemies + (level_index as usize).min(self.max_extra_enemies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_zero_catch_up() {
        let config = GameConfig {
            max_catch_up_ticks: 0,
            ..GameConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroCatchUp));
    }

    #[test]
    fn enemy_cadence_speeds_up_to_floor() {
        let config = GameConfig::default();
        assert_eq!(config.enemy_interval_ms(0), 200);
        assert_eq!(config.enemy_interval_ms(3), 140);
        assert_eq!(config.enemy_interval_ms(6), 80);
        assert_eq!(config.enemy_interval_ms(40), 80);
    }

    #[test]
    fn enemy_count_caps_extras() {
        let config = GameConfig::default();
        assert_eq!(config.enemy_count(0), 4);
        assert_eq!(config.enemy_count(2), 6);
        assert_eq!(config.enemy_count(9), 8);
    }

    #[test]
    fn rejects_uncoupled_speed_and_tolerance() {
        let config = GameConfig {
            agent_speed: 3.0,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::SpeedMismatch { .. })));

        let config = GameConfig {
            align_tolerance: 2.0,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Tolerance { .. })));

        let config = GameConfig {
            ally_random_move_chance: 1.5,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Probability { .. })));
    }
}
