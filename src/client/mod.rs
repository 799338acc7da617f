//! Client-side smoothing of authoritative snapshots
//!
//! The server publishes discrete per-tick snapshots; a render loop runs at
//! its own, usually higher, frequency. The predictor keeps an eased rendered
//! position per entity so motion looks continuous, and advances the local
//! input sequence counter as the server acknowledges inputs.

use std::collections::HashMap;

use uuid::Uuid;

use crate::game::snapshot::{PlayerSnapshot, WorldSnapshot};

/// Default exponential smoothing rate (per second).
pub const DEFAULT_SMOOTHING_RATE: f32 = 12.0;

/// One remote entity as the client renders it.
///
/// Authoritative updates replace only the target state; the rendered
/// position eases toward it every frame and never overshoots.
#[derive(Debug, Clone)]
pub struct InterpolatedEntity {
    pub id: Uuid,
    pub display_name: String,

    target_x: f32,
    target_y: f32,
    target_vel_x: f32,
    target_vel_y: f32,

    rendered_x: f32,
    rendered_y: f32,

    pub score: u32,
    pub dashing: bool,
    pub dash_fx_ms: f32,
    pub tag_slow_ms: f32,
    pub tagged_by: Option<Uuid>,
}

impl InterpolatedEntity {
    /// Track a newly observed entity. The rendered position snaps straight
    /// to the authoritative one; easing only starts on later updates.
    pub fn new(snapshot: &PlayerSnapshot) -> Self {
        let mut entity = Self {
            id: snapshot.id,
            display_name: snapshot.display_name.clone(),
            target_x: 0.0,
            target_y: 0.0,
            target_vel_x: 0.0,
            target_vel_y: 0.0,
            rendered_x: 0.0,
            rendered_y: 0.0,
            score: 0,
            dashing: false,
            dash_fx_ms: 0.0,
            tag_slow_ms: 0.0,
            tagged_by: None,
        };
        entity.set_target(snapshot);
        entity.snap_to_target();
        entity
    }

    /// Replace the target state from an authoritative update. The rendered
    /// position is left untouched.
    pub fn set_target(&mut self, snapshot: &PlayerSnapshot) {
        self.display_name = snapshot.display_name.clone();
        self.target_x = snapshot.x;
        self.target_y = snapshot.y;
        self.target_vel_x = snapshot.vel_x;
        self.target_vel_y = snapshot.vel_y;
        self.score = snapshot.score;
        self.dashing = snapshot.dashing;
        self.dash_fx_ms = snapshot.dash_fx_ms;
        self.tag_slow_ms = snapshot.tag_slow_ms;
        self.tagged_by = snapshot.tagged_by;
    }

    pub fn snap_to_target(&mut self) {
        self.rendered_x = self.target_x;
        self.rendered_y = self.target_y;
    }

    /// Ease the rendered position toward the target by
    /// `1 - e^(-rate * dt)`, which converges for any frame timing.
    pub fn update(&mut self, dt: f32, smoothing_rate: f32) {
        let lerp = 1.0 - (-smoothing_rate * dt).exp();
        self.rendered_x += (self.target_x - self.rendered_x) * lerp;
        self.rendered_y += (self.target_y - self.rendered_y) * lerp;
    }

    pub fn render_x(&self) -> f32 {
        self.rendered_x
    }

    pub fn render_y(&self) -> f32 {
        self.rendered_y
    }

    pub fn target_x(&self) -> f32 {
        self.target_x
    }

    pub fn target_y(&self) -> f32 {
        self.target_y
    }

    pub fn target_velocity(&self) -> (f32, f32) {
        (self.target_vel_x, self.target_vel_y)
    }
}

/// A client-visible orb. Orbs never move while alive, so they are tracked
/// add/remove only, without easing.
#[derive(Debug, Clone)]
pub struct OrbView {
    pub id: Uuid,
    pub x: f32,
    pub y: f32,
    pub value: u32,
}

/// Rendering-side view of a room: interpolated players, orbs, and the
/// outgoing input sequence bookkeeping for the locally controlled entity.
pub struct ClientPredictor {
    players: HashMap<Uuid, InterpolatedEntity>,
    orbs: HashMap<Uuid, OrbView>,
    local_player_id: Option<Uuid>,
    input_sequence: u32,
    smoothing_rate: f32,
    last_tick: Option<u64>,
}

impl ClientPredictor {
    pub fn new() -> Self {
        Self::with_smoothing_rate(DEFAULT_SMOOTHING_RATE)
    }

    pub fn with_smoothing_rate(smoothing_rate: f32) -> Self {
        Self {
            players: HashMap::new(),
            orbs: HashMap::new(),
            local_player_id: None,
            input_sequence: 0,
            smoothing_rate,
            last_tick: None,
        }
    }

    /// Mark which entity the local client controls, for reconciliation.
    pub fn set_local_player(&mut self, player_id: Uuid) {
        self.local_player_id = Some(player_id);
    }

    pub fn local_player(&self) -> Option<&InterpolatedEntity> {
        self.players.get(&self.local_player_id?)
    }

    pub fn player(&self, id: &Uuid) -> Option<&InterpolatedEntity> {
        self.players.get(id)
    }

    pub fn players(&self) -> impl Iterator<Item = &InterpolatedEntity> {
        self.players.values()
    }

    pub fn orbs(&self) -> impl Iterator<Item = &OrbView> {
        self.orbs.values()
    }

    /// Sequence number for the next outgoing intent.
    pub fn next_input_sequence(&mut self) -> u32 {
        self.input_sequence += 1;
        self.input_sequence
    }

    pub fn current_input_sequence(&self) -> u32 {
        self.input_sequence
    }

    /// Ingest one authoritative snapshot: new entities snap, known entities
    /// get new targets, vanished entities are dropped, and a snapshot for
    /// the local player advances the outgoing sequence counter to at least
    /// the acknowledged value.
    ///
    /// Safe to call zero, one, or many times between render frames.
    pub fn apply_snapshot(&mut self, snapshot: &WorldSnapshot) {
        self.last_tick = Some(snapshot.tick);

        for player in &snapshot.players {
            match self.players.get_mut(&player.id) {
                Some(entity) => entity.set_target(player),
                None => {
                    self.players.insert(player.id, InterpolatedEntity::new(player));
                }
            }

            if Some(player.id) == self.local_player_id {
                self.reconcile(player.last_input_seq);
            }
        }

        // Snapshots are full state: anything absent no longer exists.
        self.players
            .retain(|id, _| snapshot.players.iter().any(|p| p.id == *id));

        self.orbs.clear();
        for orb in &snapshot.orbs {
            self.orbs.insert(
                orb.id,
                OrbView {
                    id: orb.id,
                    x: orb.x,
                    y: orb.y,
                    value: orb.value,
                },
            );
        }
    }

    /// Advance every rendered position by one frame of `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        for entity in self.players.values_mut() {
            entity.update(dt, self.smoothing_rate);
        }
    }

    pub fn last_tick(&self) -> Option<u64> {
        self.last_tick
    }

    /// The server has incorporated inputs up to `acknowledged_seq`; never
    /// let the local counter fall behind it. Bookkeeping only today, a
    /// foundation for input replay rather than a full prediction system.
    fn reconcile(&mut self, acknowledged_seq: u32) {
        self.input_sequence = self.input_sequence.max(acknowledged_seq);
    }
}

impl Default for ClientPredictor {
    fn default() -> Self {
        Self::new()
    }
}
