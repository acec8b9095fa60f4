//! Tunable parameters of a world.

use std::time::Duration;

use garden_defence_core::{ObstructionMode, Rect, Size};
use garden_defence_system_placement::DEFAULT_CLEARANCE;
use garden_defence_system_spawning::{
    Config as SpawningConfig, WaveOrder, DEFAULT_ESCALATION_FACTOR, DEFAULT_SPAWN_INTERVAL,
};
use serde::{Deserialize, Serialize};

/// Reasons a [`WorldConfig`] is refused.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The escalation factor is not a finite value in `(0, 1]`.
    #[error("escalation factor must lie in (0, 1], got {0}")]
    EscalationFactor(f64),
    /// The spawn interval is negative or not finite.
    #[error("spawn interval must be a finite, non-negative number of seconds, got {0}")]
    SpawnInterval(f64),
}

/// Parameters used to build a [`World`](crate::World).
///
/// Every field has a default, so a TOML table only needs to name the values
/// it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// Money available when the game starts.
    pub starting_money: i64,
    /// Defender health when the game starts.
    pub starting_health: i64,
    /// Width of the playing field.
    pub field_width: i32,
    /// Height of the playing field.
    pub field_height: i32,
    /// Width of the menu panel to the right of the field.
    pub menu_width: i32,
    /// Clearance kept between structures and the path.
    pub clearance_radius: i32,
    /// How thoroughly placements are kept off the path.
    pub obstruction_mode: ObstructionMode,
    /// Seconds that must pass before an exhausted defender loses.
    pub game_over_grace_secs: f64,
    /// Distance a projectile may travel before it vanishes.
    pub projectile_max_travel: f64,
    /// Side length of a projectile's square bounding box.
    pub projectile_size: i32,
    /// Seconds a decal stays on the field.
    pub decal_life_span_secs: f64,
    /// Seconds between spawns during the first wave.
    pub spawn_interval_secs: f64,
    /// Multiplier applied to the spawn interval after every wave.
    pub escalation_factor: f64,
    /// Units released during each wave.
    pub wave_order: WaveOrder,
    /// Seed used to shuffle the wave order; `None` keeps it as written.
    pub wave_shuffle_seed: Option<u64>,
}

impl WorldConfig {
    /// Checks the wave parameters that would otherwise misbehave once the
    /// scheduler escalates.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let factor = self.escalation_factor;
        if !(factor > 0.0 && factor <= 1.0) {
            return Err(ConfigError::EscalationFactor(factor));
        }
        let interval = self.spawn_interval_secs;
        if !interval.is_finite() || interval < 0.0 {
            return Err(ConfigError::SpawnInterval(interval));
        }
        Ok(())
    }

    /// Area in which structures may be placed.
    #[must_use]
    pub const fn field(&self) -> Rect {
        Rect::new(0, 0, self.field_width, self.field_height)
    }

    /// Area occupied by the menu panel.
    #[must_use]
    pub const fn menu(&self) -> Rect {
        Rect::new(self.field_width, 0, self.menu_width, self.field_height)
    }

    /// Bounding box of every projectile.
    #[must_use]
    pub const fn projectile_bounds(&self) -> Size {
        Size::new(self.projectile_size, self.projectile_size)
    }

    /// Grace period before the game can end.
    #[must_use]
    pub fn game_over_grace(&self) -> Duration {
        seconds(self.game_over_grace_secs)
    }

    /// Wave scheduler configuration, with the order shuffled when a seed is set.
    #[must_use]
    pub fn spawning(&self) -> SpawningConfig {
        let order = match self.wave_shuffle_seed {
            Some(seed) => self.wave_order.shuffled(seed),
            None => self.wave_order.clone(),
        };
        SpawningConfig::new(
            seconds(self.spawn_interval_secs),
            self.escalation_factor,
            order,
        )
    }
}

fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            starting_money: 10_000,
            starting_health: 100,
            field_width: 600,
            field_height: 600,
            menu_width: 200,
            clearance_radius: DEFAULT_CLEARANCE,
            obstruction_mode: ObstructionMode::default(),
            game_over_grace_secs: 30.0,
            projectile_max_travel: 300.0,
            projectile_size: 8,
            decal_life_span_secs: 3.0,
            spawn_interval_secs: DEFAULT_SPAWN_INTERVAL.as_secs_f64(),
            escalation_factor: DEFAULT_ESCALATION_FACTOR,
            wave_order: WaveOrder::default(),
            wave_shuffle_seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: WorldConfig = toml::from_str(
            "starting_money = 250\nobstruction_mode = \"segments\"\nwave_order = \"c s\"\n",
        )
        .expect("valid config");
        assert_eq!(config.starting_money, 250);
        assert_eq!(config.obstruction_mode, ObstructionMode::Segments);
        assert_eq!(config.wave_order.len(), 2);
        assert_eq!(config.starting_health, 100);
        assert_eq!(config.field(), Rect::new(0, 0, 600, 600));
    }

    #[test]
    fn rejects_invalid_wave_order() {
        let result = toml::from_str::<WorldConfig>("wave_order = \"s q\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn validate_accepts_defaults_and_full_factor() {
        assert_eq!(WorldConfig::default().validate(), Ok(()));
        let config = WorldConfig {
            escalation_factor: 1.0,
            ..WorldConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_escalation_outside_unit_interval() {
        for factor in [0.0, -0.5, 1.5, f64::INFINITY] {
            let config = WorldConfig {
                escalation_factor: factor,
                ..WorldConfig::default()
            };
            assert_eq!(config.validate(), Err(ConfigError::EscalationFactor(factor)));
        }
        let config = WorldConfig {
            escalation_factor: f64::NAN,
            ..WorldConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EscalationFactor(factor)) if factor.is_nan()
        ));
    }

    #[test]
    fn validate_rejects_negative_spawn_interval() {
        let config = WorldConfig {
            spawn_interval_secs: -1.0,
            ..WorldConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::SpawnInterval(-1.0)));
    }

    #[test]
    fn menu_sits_right_of_field() {
        let config = WorldConfig::default();
        assert_eq!(config.menu(), Rect::new(600, 0, 200, 600));
        assert_eq!(config.game_over_grace(), Duration::from_secs(30));
    }
}
