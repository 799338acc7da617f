//! Collectible orbs and their respawn lifecycle

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::warn;
use uuid::Uuid;

use crate::config::WorldConfig;
use crate::game::physics::PhysicsSystem;
use crate::game::player::PlayerState;

/// Placement attempts before giving up on spacing and spawning anyway.
const PLACEMENT_ATTEMPTS: u32 = 8;

/// A live collectible orb.
#[derive(Debug, Clone)]
pub struct Orb {
    pub id: Uuid,
    pub x: f32,
    pub y: f32,
    pub value: u32,
}

/// A collected orb waiting to be replaced.
#[derive(Debug, Clone)]
pub struct OrbRespawn {
    /// Id of the collected orb, kept for log correlation
    pub orb_id: Uuid,
    /// Milliseconds until the replacement spawns
    pub remaining_ms: f32,
}

/// Pick a spawn position for a new orb.
///
/// Tries a bounded number of random draws, rejecting positions too close to
/// a player or another orb. Exhaustion is not an error: the last resort is
/// an unchecked draw, because keeping the orb count alive outweighs spacing.
pub fn place_orb<'a>(
    rng: &mut ChaCha8Rng,
    config: &WorldConfig,
    players: impl Iterator<Item = &'a PlayerState> + Clone,
    orbs: &[Orb],
) -> (f32, f32) {
    for _ in 0..PLACEMENT_ATTEMPTS {
        let (x, y) = random_orb_position(rng, config);
        if is_space_free(x, y, config, players.clone(), orbs) {
            return (x, y);
        }
    }

    warn!("orb placement exhausted {PLACEMENT_ATTEMPTS} attempts, spawning unchecked");
    random_orb_position(rng, config)
}

fn random_orb_position(rng: &mut ChaCha8Rng, config: &WorldConfig) -> (f32, f32) {
    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    let distance = rng.gen_range(0.0..(config.world_radius - config.orb_radius * 2.0));
    (angle.cos() * distance, angle.sin() * distance)
}

fn is_space_free<'a>(
    x: f32,
    y: f32,
    config: &WorldConfig,
    players: impl Iterator<Item = &'a PlayerState>,
    orbs: &[Orb],
) -> bool {
    for player in players {
        if PhysicsSystem::circles_overlap(
            player.x,
            player.y,
            x,
            y,
            config.player_radius + config.orb_radius,
        ) {
            return false;
        }
    }
    for orb in orbs {
        if PhysicsSystem::circles_overlap(orb.x, orb.y, x, y, config.orb_radius * 2.0) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn placement_stays_inside_the_world() {
        let config = WorldConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..200 {
            let (x, y) = place_orb(&mut rng, &config, std::iter::empty(), &[]);
            let dist = (x * x + y * y).sqrt();
            assert!(dist <= config.world_radius - config.orb_radius * 2.0);
        }
    }

    #[test]
    fn placement_avoids_existing_orbs_when_possible() {
        let config = WorldConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let orbs: Vec<Orb> = (0..4)
            .map(|i| Orb {
                id: Uuid::new_v4(),
                x: i as f32 * 50.0,
                y: 0.0,
                value: 1,
            })
            .collect();

        let (x, y) = place_orb(&mut rng, &config, std::iter::empty(), &orbs);
        for orb in &orbs {
            let dx = orb.x - x;
            let dy = orb.y - y;
            assert!((dx * dx + dy * dy).sqrt() >= config.orb_radius * 2.0);
        }
    }

    #[test]
    fn exhausted_search_still_yields_a_position() {
        // Shrink the world so every draw collides with the player at origin.
        let mut config = WorldConfig::default();
        config.world_radius = 30.0;
        config.player_radius = 8.0;
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let blocker = PlayerState::new(Uuid::new_v4(), "blocker".into(), 0.0, 0.0);
        let players = [blocker];

        // Must fall back rather than starve.
        let (x, y) = place_orb(&mut rng, &config, players.iter(), &[]);
        assert!(x.is_finite() && y.is_finite());
    }
}
