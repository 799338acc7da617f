//! Player state and ability timers

use uuid::Uuid;

/// Authoritative state for one player.
///
/// Timers count down in milliseconds and are decremented exactly once per
/// tick; outside their trigger points they only ever decrease.
#[derive(Debug, Clone)]
pub struct PlayerState {
    pub id: Uuid,
    pub display_name: String,

    // Position and movement
    pub x: f32,
    pub y: f32,
    pub vel_x: f32,
    pub vel_y: f32,

    // Abilities
    pub dash_cooldown_ms: f32,
    pub dash_remaining_ms: f32,
    pub dash_fx_ms: f32,
    pub tag_slow_ms: f32,
    /// Who inflicted the current slow; cleared exactly when the slow expires
    pub tagged_by: Option<Uuid>,

    pub score: u32,
    /// Highest intent sequence the simulation has consumed for this player
    pub last_input_seq: u32,
}

impl PlayerState {
    pub fn new(id: Uuid, display_name: String, spawn_x: f32, spawn_y: f32) -> Self {
        Self {
            id,
            display_name,
            x: spawn_x,
            y: spawn_y,
            vel_x: 0.0,
            vel_y: 0.0,
            dash_cooldown_ms: 0.0,
            dash_remaining_ms: 0.0,
            dash_fx_ms: 0.0,
            tag_slow_ms: 0.0,
            tagged_by: None,
            score: 0,
            last_input_seq: 0,
        }
    }

    pub fn speed(&self) -> f32 {
        (self.vel_x * self.vel_x + self.vel_y * self.vel_y).sqrt()
    }

    /// Dashing means the duration window is still open. The cooldown gates
    /// re-entry independently and usually outlives it.
    pub fn is_dashing(&self) -> bool {
        self.dash_remaining_ms > 0.0
    }

    pub fn can_dash(&self) -> bool {
        self.dash_cooldown_ms <= 0.0
    }

    pub fn is_slowed(&self) -> bool {
        self.tag_slow_ms > 0.0
    }

    pub fn trigger_dash(&mut self, duration_ms: f32, cooldown_ms: f32, fx_ms: f32) {
        self.dash_remaining_ms = duration_ms;
        self.dash_cooldown_ms = cooldown_ms;
        self.dash_fx_ms = fx_ms;
    }

    pub fn apply_tag_slow(&mut self, duration_ms: f32, tagged_by: Uuid) {
        self.tag_slow_ms = duration_ms;
        self.tagged_by = Some(tagged_by);
    }

    /// Advance all countdown timers by one tick's elapsed milliseconds,
    /// flooring at zero.
    pub fn tick_timers(&mut self, delta_ms: f32) {
        self.dash_cooldown_ms = (self.dash_cooldown_ms - delta_ms).max(0.0);
        self.dash_remaining_ms = (self.dash_remaining_ms - delta_ms).max(0.0);
        self.dash_fx_ms = (self.dash_fx_ms - delta_ms).max(0.0);
        self.tag_slow_ms = (self.tag_slow_ms - delta_ms).max(0.0);
        if self.tag_slow_ms == 0.0 {
            self.tagged_by = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> PlayerState {
        PlayerState::new(Uuid::new_v4(), "tester".to_string(), 0.0, 0.0)
    }

    #[test]
    fn new_player_starts_idle() {
        let p = player();
        assert_eq!(p.speed(), 0.0);
        assert!(!p.is_dashing());
        assert!(p.can_dash());
        assert!(!p.is_slowed());
        assert_eq!(p.score, 0);
    }

    #[test]
    fn timers_floor_at_zero() {
        let mut p = player();
        p.trigger_dash(250.0, 1500.0, 400.0);
        p.tick_timers(10_000.0);
        assert_eq!(p.dash_remaining_ms, 0.0);
        assert_eq!(p.dash_cooldown_ms, 0.0);
        assert_eq!(p.dash_fx_ms, 0.0);
    }

    #[test]
    fn dash_can_end_while_cooldown_persists() {
        let mut p = player();
        p.trigger_dash(250.0, 1500.0, 400.0);
        p.tick_timers(300.0);
        assert!(!p.is_dashing());
        assert!(!p.can_dash());
    }

    #[test]
    fn tagged_by_clears_exactly_when_slow_expires() {
        let tagger = Uuid::new_v4();
        let mut p = player();
        p.apply_tag_slow(100.0, tagger);

        p.tick_timers(50.0);
        assert_eq!(p.tagged_by, Some(tagger));

        p.tick_timers(50.0);
        assert_eq!(p.tag_slow_ms, 0.0);
        assert_eq!(p.tagged_by, None);
    }
}
