//! Buffered client input intents and per-tick resolution

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction magnitudes below this are treated as no input.
const DIRECTION_EPSILON: f32 = 1e-4;

/// A raw movement/ability command from a client.
///
/// Clients emit one of these on every input change. They may arrive
/// out of order or duplicated; only the highest sequence received since the
/// previous tick is physically meaningful.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputIntent {
    /// Client-monotonic sequence number
    pub seq: u32,
    /// Raw movement vector X (unnormalized)
    pub move_x: f32,
    /// Raw movement vector Y (unnormalized)
    pub move_y: f32,
    /// Dash requested this intent
    pub dash: bool,
    /// Player the client is trying to tag, if any
    pub tag_target: Option<Uuid>,
}

/// One effective intent for a tick, with the movement vector normalized to a
/// unit direction (or zero when below epsilon).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedIntent {
    pub seq: u32,
    pub dir_x: f32,
    pub dir_y: f32,
    pub dash: bool,
    pub tag_target: Option<Uuid>,
}

impl ResolvedIntent {
    /// Neutral intent: no movement, no abilities. Carries the player's
    /// previously acknowledged sequence so bookkeeping never regresses.
    pub fn neutral(seq: u32) -> Self {
        Self {
            seq,
            dir_x: 0.0,
            dir_y: 0.0,
            dash: false,
            tag_target: None,
        }
    }

    pub fn has_direction(&self) -> bool {
        self.dir_x != 0.0 || self.dir_y != 0.0
    }

    fn from_raw(intent: &InputIntent) -> Self {
        let magnitude = (intent.move_x * intent.move_x + intent.move_y * intent.move_y).sqrt();
        let (dir_x, dir_y) = if magnitude < DIRECTION_EPSILON {
            (0.0, 0.0)
        } else {
            (intent.move_x / magnitude, intent.move_y / magnitude)
        };
        Self {
            seq: intent.seq,
            dir_x,
            dir_y,
            dash: intent.dash,
            tag_target: intent.tag_target,
        }
    }
}

/// Per-player buffers of raw intents, drained once per tick.
#[derive(Debug, Default)]
pub struct IntentQueue {
    buffers: HashMap<Uuid, Vec<InputIntent>>,
}

impl IntentQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start buffering for a newly joined player.
    pub fn insert_player(&mut self, player_id: Uuid) {
        self.buffers.entry(player_id).or_default();
    }

    /// Drop a leaving player's buffer, discarding anything queued.
    pub fn remove_player(&mut self, player_id: &Uuid) {
        self.buffers.remove(player_id);
    }

    /// Append a raw intent. Unknown player ids are a silent no-op: the
    /// player was already removed and the intent raced the leave.
    pub fn enqueue(&mut self, player_id: Uuid, intent: InputIntent) {
        if let Some(buffer) = self.buffers.get_mut(&player_id) {
            buffer.push(intent);
        }
    }

    /// Drain the buffer and resolve it to the single effective intent for
    /// this tick: the highest sequence wins, arrival order breaks ties.
    /// An empty buffer yields a neutral intent carrying `fallback_seq`.
    pub fn consume(&mut self, player_id: &Uuid, fallback_seq: u32) -> ResolvedIntent {
        let Some(buffer) = self.buffers.get_mut(player_id) else {
            return ResolvedIntent::neutral(fallback_seq);
        };
        if buffer.is_empty() {
            return ResolvedIntent::neutral(fallback_seq);
        }

        // Stable sort keeps arrival order among equal sequences; the last
        // element is then the latest-arrived intent of the highest sequence.
        buffer.sort_by_key(|intent| intent.seq);
        let latest = buffer.last().map(ResolvedIntent::from_raw);
        buffer.clear();
        latest.unwrap_or_else(|| ResolvedIntent::neutral(fallback_seq))
    }
}
