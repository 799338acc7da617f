//! World state and the authoritative tick

use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{ConfigError, WorldConfig};
use crate::game::intent::{InputIntent, IntentQueue, ResolvedIntent};
use crate::game::orb::{place_orb, Orb, OrbRespawn};
use crate::game::physics::PhysicsSystem;
use crate::game::player::PlayerState;
use crate::game::snapshot::{OrbSnapshot, PlayerSnapshot, WorldSnapshot};

/// Authoritative state for one room.
///
/// Owned exclusively by the room's task: `tick` and the ingestion entry
/// points must never run concurrently for the same room. Ingestion only
/// buffers; every mutation of simulation state happens inside `tick`.
pub struct WorldState {
    config: WorldConfig,
    players: HashMap<Uuid, PlayerState>,
    orbs: Vec<Orb>,
    respawn_queue: Vec<OrbRespawn>,
    intents: IntentQueue,
    rng: ChaCha8Rng,
    /// Singleton tagger role: first joiner, deterministically reassigned
    tagger: Option<Uuid>,
    tick_counter: u64,
    time_ms: f64,
}

impl WorldState {
    /// Create a world and stock it with its starting orbs.
    pub fn new(config: WorldConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut world = Self {
            config,
            players: HashMap::new(),
            orbs: Vec::new(),
            respawn_queue: Vec::new(),
            intents: IntentQueue::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            tagger: None,
            tick_counter: 0,
            time_ms: 0.0,
        };
        world.top_up_orbs();
        Ok(world)
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn player(&self, id: &Uuid) -> Option<&PlayerState> {
        self.players.get(id)
    }

    pub fn players(&self) -> impl Iterator<Item = &PlayerState> {
        self.players.values()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn orb_count(&self) -> usize {
        self.orbs.len()
    }

    pub fn tagger(&self) -> Option<Uuid> {
        self.tagger
    }

    pub fn time_ms(&self) -> f64 {
        self.time_ms
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    /// Add a player at a random in-bounds spawn with zero velocity, score,
    /// and timers. The first joiner receives the tagger role.
    pub fn join(&mut self, player_id: Uuid, display_name: impl Into<String>) {
        if self.players.contains_key(&player_id) {
            warn!(player_id = %player_id, "player already in world, join ignored");
            return;
        }

        let (x, y) = self.random_spawn_position();
        self.players
            .insert(player_id, PlayerState::new(player_id, display_name.into(), x, y));
        self.intents.insert_player(player_id);

        if self.tagger.is_none() {
            self.tagger = Some(player_id);
        }

        info!(
            player_id = %player_id,
            player_count = self.players.len(),
            "player joined"
        );
    }

    /// Remove a player, discarding any buffered intents. A departing role
    /// holder passes the tagger role to the lowest remaining player id, an
    /// order-independent rule rather than an iteration-order artifact.
    pub fn leave(&mut self, player_id: &Uuid) {
        if self.players.remove(player_id).is_none() {
            return;
        }
        self.intents.remove_player(player_id);

        if self.tagger == Some(*player_id) {
            self.tagger = self.players.keys().min().copied();
        }

        info!(
            player_id = %player_id,
            player_count = self.players.len(),
            "player left"
        );
    }

    /// Buffer a raw intent. Never applied synchronously; the next tick
    /// resolves it. Intents for unknown players are dropped.
    pub fn submit_intent(&mut self, player_id: Uuid, intent: InputIntent) {
        self.intents.enqueue(player_id, intent);
    }

    /// Advance the simulation by one tick of `delta_ms` milliseconds and
    /// build the resulting full snapshot.
    pub fn tick(&mut self, delta_ms: f32) -> WorldSnapshot {
        let mut ordered_ids: Vec<Uuid> = self.players.keys().copied().collect();
        ordered_ids.sort();

        for id in &ordered_ids {
            let fallback_seq = self
                .players
                .get(id)
                .map(|p| p.last_input_seq)
                .unwrap_or(0);
            let intent = self.intents.consume(id, fallback_seq);

            self.resolve_dash(id, &intent);
            self.resolve_tag(id, &intent);
            self.step_player(id, &intent, delta_ms);
        }

        self.collect_orbs(&ordered_ids);
        self.tick_orb_respawns(delta_ms);
        self.top_up_orbs();
        self.resolve_player_collisions(&ordered_ids);

        self.tick_counter += 1;
        self.time_ms += f64::from(delta_ms);

        self.build_snapshot(&ordered_ids)
    }

    fn random_spawn_position(&mut self) -> (f32, f32) {
        let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
        let distance = self.rng.gen_range(0.0..self.config.player_bound() * 0.75);
        (angle.cos() * distance, angle.sin() * distance)
    }

    /// Dash trigger: requires the cooldown to have elapsed, the dash flag,
    /// and a nonzero input direction.
    fn resolve_dash(&mut self, player_id: &Uuid, intent: &ResolvedIntent) {
        if !intent.dash || !intent.has_direction() {
            return;
        }
        let config = &self.config;
        if let Some(player) = self.players.get_mut(player_id) {
            if !player.can_dash() {
                return;
            }
            player.trigger_dash(
                config.dash_duration_ms,
                config.dash_cooldown_ms,
                config.dash_fx_duration_ms,
            );
            player.vel_x += intent.dir_x * config.dash_speed_boost;
            player.vel_y += intent.dir_y * config.dash_speed_boost;
            debug!(player_id = %player_id, "dash triggered");
        }
    }

    /// Tag resolution: only a currently-dashing player can tag, and only a
    /// target inside `tag_radius`. A target that already left is ignored.
    fn resolve_tag(&mut self, player_id: &Uuid, intent: &ResolvedIntent) {
        let Some(target_id) = intent.tag_target else {
            return;
        };
        let Some((px, py)) = self
            .players
            .get(player_id)
            .filter(|p| p.is_dashing())
            .map(|p| (p.x, p.y))
        else {
            return;
        };

        let config = &self.config;
        let Some(target) = self.players.get_mut(&target_id) else {
            return;
        };
        let dx = target.x - px;
        let dy = target.y - py;
        if (dx * dx + dy * dy).sqrt() > config.tag_radius {
            return;
        }

        target.apply_tag_slow(config.tag_slow_duration_ms, *player_id);
        target.vel_x *= config.tag_slow_multiplier;
        target.vel_y *= config.tag_slow_multiplier;
        debug!(tagger = %player_id, target = %target_id, "tag landed");
    }

    /// Acceleration, friction, speed cap, integration, bounds, and timers
    /// for one player.
    fn step_player(&mut self, player_id: &Uuid, intent: &ResolvedIntent, delta_ms: f32) {
        let dt = delta_ms / 1000.0;
        let config = &self.config;
        let Some(player) = self.players.get_mut(player_id) else {
            return;
        };

        let slowed = player.is_slowed();
        let accel = if slowed {
            config.max_acceleration * config.tag_slow_multiplier
        } else {
            config.max_acceleration
        };

        let (vx, vy) = PhysicsSystem::steer_velocity(
            player.vel_x,
            player.vel_y,
            intent.dir_x * config.max_speed,
            intent.dir_y * config.max_speed,
            accel,
            dt,
        );
        player.vel_x = vx;
        player.vel_y = vy;

        // Steeper effective friction while slowed
        let friction = if slowed {
            config.friction.powf(1.5)
        } else {
            config.friction
        };
        player.vel_x *= friction;
        player.vel_y *= friction;

        let speed_cap = if player.is_dashing() {
            config.max_speed + config.dash_speed_boost
        } else {
            config.max_speed
        };
        let (vx, vy) = PhysicsSystem::clamp_speed(player.vel_x, player.vel_y, speed_cap);
        player.vel_x = vx;
        player.vel_y = vy;

        player.x += player.vel_x * dt;
        player.y += player.vel_y * dt;

        let (x, y, clamped) = PhysicsSystem::clamp_to_arena(player.x, player.y, config.player_bound());
        player.x = x;
        player.y = y;
        if clamped {
            player.vel_x = 0.0;
            player.vel_y = 0.0;
        }

        player.tick_timers(delta_ms);
        player.last_input_seq = intent.seq;
    }

    /// Orb collection, player-major then orb-minor. When several players
    /// could claim the same orb in one tick, the first player in iteration
    /// order wins; this tie-break is documented, not globally fair.
    fn collect_orbs(&mut self, ordered_ids: &[Uuid]) {
        for id in ordered_ids {
            let Some((px, py)) = self.players.get(id).map(|p| (p.x, p.y)) else {
                continue;
            };

            let mut i = 0;
            while i < self.orbs.len() {
                let orb = &self.orbs[i];
                let touching = PhysicsSystem::circles_overlap(
                    px,
                    py,
                    orb.x,
                    orb.y,
                    self.config.player_radius + self.config.orb_radius,
                );
                if !touching {
                    i += 1;
                    continue;
                }

                let orb = self.orbs.remove(i);
                if let Some(player) = self.players.get_mut(id) {
                    player.score += orb.value;
                }
                debug!(player_id = %id, orb_id = %orb.id, "orb collected");
                self.respawn_queue.push(OrbRespawn {
                    orb_id: orb.id,
                    remaining_ms: self.config.orb_respawn_delay_ms,
                });
            }
        }
    }

    fn tick_orb_respawns(&mut self, delta_ms: f32) {
        let mut due = 0usize;
        self.respawn_queue.retain_mut(|respawn| {
            respawn.remaining_ms -= delta_ms;
            if respawn.remaining_ms <= 0.0 {
                due += 1;
                false
            } else {
                true
            }
        });

        for _ in 0..due {
            self.spawn_orb();
        }
    }

    /// Keep the orb population at the configured starting count. Orbs
    /// waiting in the respawn queue still count toward the population, so
    /// a collected orb is replaced once, after its delay, not instantly.
    fn top_up_orbs(&mut self) {
        while self.orbs.len() + self.respawn_queue.len() < self.config.starting_orb_count {
            self.spawn_orb();
        }
    }

    fn spawn_orb(&mut self) {
        let (x, y) = place_orb(
            &mut self.rng,
            &self.config,
            self.players.values(),
            &self.orbs,
        );
        let orb = Orb {
            id: Uuid::new_v4(),
            x,
            y,
            value: self.config.orb_value,
        };
        debug!(orb_id = %orb.id, "orb spawned");
        self.orbs.push(orb);
    }

    /// Pairwise positional separation, recomputed fresh each tick. The push
    /// can shove a pair at the wall past the arena bound, so each adjusted
    /// position is re-clamped; the pair may stay slightly overlapped there
    /// until one moves off the wall.
    fn resolve_player_collisions(&mut self, ordered_ids: &[Uuid]) {
        let bound = self.config.player_bound();
        for i in 0..ordered_ids.len() {
            for j in (i + 1)..ordered_ids.len() {
                let (Some(a), Some(b)) = (
                    self.players.get(&ordered_ids[i]),
                    self.players.get(&ordered_ids[j]),
                ) else {
                    continue;
                };

                let resolved = PhysicsSystem::resolve_player_overlap(
                    a.x,
                    a.y,
                    b.x,
                    b.y,
                    self.config.player_radius,
                );
                if let Some(((ax, ay), (bx, by))) = resolved {
                    if let Some(a) = self.players.get_mut(&ordered_ids[i]) {
                        let (x, y, _) = PhysicsSystem::clamp_to_arena(ax, ay, bound);
                        a.x = x;
                        a.y = y;
                    }
                    if let Some(b) = self.players.get_mut(&ordered_ids[j]) {
                        let (x, y, _) = PhysicsSystem::clamp_to_arena(bx, by, bound);
                        b.x = x;
                        b.y = y;
                    }
                }
            }
        }
    }

    fn build_snapshot(&self, ordered_ids: &[Uuid]) -> WorldSnapshot {
        let players = ordered_ids
            .iter()
            .filter_map(|id| self.players.get(id))
            .map(|p| PlayerSnapshot {
                id: p.id,
                display_name: p.display_name.clone(),
                x: p.x,
                y: p.y,
                vel_x: p.vel_x,
                vel_y: p.vel_y,
                score: p.score,
                dashing: p.is_dashing(),
                dash_cooldown_ms: p.dash_cooldown_ms,
                dash_fx_ms: p.dash_fx_ms,
                tag_slow_ms: p.tag_slow_ms,
                tagged_by: p.tagged_by,
                last_input_seq: p.last_input_seq,
            })
            .collect();

        let orbs = self
            .orbs
            .iter()
            .map(|orb| OrbSnapshot {
                id: orb.id,
                x: orb.x,
                y: orb.y,
                value: orb.value,
            })
            .collect();

        WorldSnapshot {
            tick: self.tick_counter,
            time_ms: self.time_ms,
            tagger: self.tagger,
            players,
            orbs,
        }
    }
}
