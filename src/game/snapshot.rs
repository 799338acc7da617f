//! Full-state snapshots emitted once per tick

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One player's state as published to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: Uuid,
    pub display_name: String,
    pub x: f32,
    pub y: f32,
    pub vel_x: f32,
    pub vel_y: f32,
    pub score: u32,
    /// True while the dash speed window is open
    pub dashing: bool,
    /// Cooldown remaining before the next dash (ms)
    pub dash_cooldown_ms: f32,
    /// Dash visual effect remaining (ms), for renderers
    pub dash_fx_ms: f32,
    /// Slow remaining (ms); 0 when unslowed
    pub tag_slow_ms: f32,
    /// Who inflicted the current slow, if any
    pub tagged_by: Option<Uuid>,
    /// Highest input sequence the server has incorporated
    pub last_input_seq: u32,
}

/// One orb's state as published to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrbSnapshot {
    pub id: Uuid,
    pub x: f32,
    pub y: f32,
    pub value: u32,
}

/// The full authoritative state after one tick.
///
/// Wire encoding and delta compression are the host's concern; this type
/// only fixes what a snapshot contains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Tick counter since room start
    pub tick: u64,
    /// Simulation clock, elapsed milliseconds since room start
    pub time_ms: f64,
    /// Current tagger-role holder, if the room is non-empty
    pub tagger: Option<Uuid>,
    pub players: Vec<PlayerSnapshot>,
    pub orbs: Vec<OrbSnapshot>,
}
