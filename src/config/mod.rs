//! Configuration module - simulation tunables

/// Numeric tunables for one arena world.
///
/// All distances are world units, all durations are milliseconds. The config
/// carries no behavior beyond validation; the host wires one instance into
/// each room it creates.
#[derive(Clone, Debug)]
pub struct WorldConfig {
    /// Radius of the circular arena
    pub world_radius: f32,
    /// Player hitbox radius
    pub player_radius: f32,
    /// Orb hitbox radius
    pub orb_radius: f32,
    /// Fixed simulation tick interval (ms)
    pub tick_interval_ms: f32,

    /// Maximum player speed outside a dash
    pub max_speed: f32,
    /// Maximum acceleration toward the desired velocity
    pub max_acceleration: f32,
    /// Velocity retained per tick (1.0 = no friction)
    pub friction: f32,

    /// How long a dash keeps the speed cap raised (ms)
    pub dash_duration_ms: f32,
    /// Lockout before the next dash can trigger (ms)
    pub dash_cooldown_ms: f32,
    /// Extra speed added along the input direction on dash trigger
    pub dash_speed_boost: f32,
    /// Client-side dash effect duration (ms), published for renderers
    pub dash_fx_duration_ms: f32,

    /// Maximum distance at which a dashing player can tag a target
    pub tag_radius: f32,
    /// How long a tagged player stays slowed (ms)
    pub tag_slow_duration_ms: f32,
    /// Velocity/acceleration multiplier applied while slowed
    pub tag_slow_multiplier: f32,

    /// Live orb count the world tops itself up to
    pub starting_orb_count: usize,
    /// Delay between an orb's collection and its replacement spawning (ms)
    pub orb_respawn_delay_ms: f32,
    /// Score awarded per collected orb
    pub orb_value: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            world_radius: 1200.0,
            player_radius: 24.0,
            orb_radius: 10.0,
            tick_interval_ms: 50.0,

            max_speed: 260.0,
            max_acceleration: 900.0,
            friction: 0.9,

            dash_duration_ms: 250.0,
            dash_cooldown_ms: 1500.0,
            dash_speed_boost: 340.0,
            dash_fx_duration_ms: 400.0,

            tag_radius: 72.0,
            tag_slow_duration_ms: 2000.0,
            tag_slow_multiplier: 0.45,

            starting_orb_count: 12,
            orb_respawn_delay_ms: 3000.0,
            orb_value: 1,
        }
    }
}

impl WorldConfig {
    /// Check the invariants the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.world_radius > 0.0) {
            return Err(ConfigError::NotPositive("world_radius"));
        }
        if !(self.player_radius > 0.0) {
            return Err(ConfigError::NotPositive("player_radius"));
        }
        if !(self.orb_radius > 0.0) {
            return Err(ConfigError::NotPositive("orb_radius"));
        }
        if !(self.tick_interval_ms > 0.0) {
            return Err(ConfigError::NotPositive("tick_interval_ms"));
        }
        if !(self.max_speed > 0.0) {
            return Err(ConfigError::NotPositive("max_speed"));
        }
        if !(self.tag_radius > 0.0) {
            return Err(ConfigError::NotPositive("tag_radius"));
        }
        if self.player_radius >= self.world_radius {
            return Err(ConfigError::PlayerLargerThanWorld);
        }
        // Orb placement draws from 0..(world_radius - orb_radius * 2)
        if self.orb_radius * 2.0 >= self.world_radius {
            return Err(ConfigError::OrbLargerThanWorld);
        }
        if !(self.friction > 0.0 && self.friction <= 1.0) {
            return Err(ConfigError::FrictionOutOfRange(self.friction));
        }
        if self.dash_speed_boost < 0.0 {
            return Err(ConfigError::NegativeDashBoost(self.dash_speed_boost));
        }
        if !(self.tag_slow_multiplier > 0.0 && self.tag_slow_multiplier <= 1.0) {
            return Err(ConfigError::SlowMultiplierOutOfRange(self.tag_slow_multiplier));
        }
        Ok(())
    }

    /// Tick interval as seconds, for velocity integration.
    pub fn tick_seconds(&self) -> f32 {
        self.tick_interval_ms / 1000.0
    }

    /// Furthest a player center may sit from the arena center.
    pub fn player_bound(&self) -> f32 {
        self.world_radius - self.player_radius
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be positive")]
    NotPositive(&'static str),

    #[error("player_radius must be smaller than world_radius")]
    PlayerLargerThanWorld,

    #[error("orb_radius must be smaller than half of world_radius")]
    OrbLargerThanWorld,

    #[error("friction must be within (0, 1], got {0}")]
    FrictionOutOfRange(f32),

    #[error("dash_speed_boost must not be negative, got {0}")]
    NegativeDashBoost(f32),

    #[error("tag_slow_multiplier must be within (0, 1], got {0}")]
    SlowMultiplierOutOfRange(f32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        WorldConfig::default().validate().expect("default config");
    }

    #[test]
    fn rejects_bad_friction() {
        let mut config = WorldConfig::default();
        config.friction = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::FrictionOutOfRange(_))
        ));

        config.friction = 1.2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_orb_radius_filling_the_world() {
        // Would leave the orb placement draw with an empty range.
        let mut config = WorldConfig::default();
        config.orb_radius = config.world_radius / 2.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OrbLargerThanWorld)
        ));

        config.orb_radius = config.world_radius / 2.0 - 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_tag_radius() {
        let mut config = WorldConfig::default();
        config.tag_radius = 0.0;
        assert!(config.validate().is_err());
    }
}
