//! Per-room hosting: one tokio task owns one world
//!
//! The task is the "surrounding scheduler" the simulation core assumes:
//! every join/leave/intent arrives through a buffered command channel and is
//! applied between ticks, so the world only ever sees a consistent view and
//! needs no internal locking. Distinct rooms share nothing and run fully in
//! parallel. Snapshot broadcast is fire-and-forget; lagging subscribers
//! miss snapshots rather than stalling the simulation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{broadcast, mpsc};
use tokio::time::interval;
use tracing::info;
use uuid::Uuid;

use crate::config::{ConfigError, WorldConfig};
use crate::game::intent::InputIntent;
use crate::game::snapshot::WorldSnapshot;
use crate::game::world::WorldState;

const COMMAND_BUFFER: usize = 256;
const SNAPSHOT_BUFFER: usize = 64;

/// Host-facing events delivered to a room's task.
#[derive(Debug, Clone)]
pub enum RoomCommand {
    Join {
        player_id: Uuid,
        display_name: String,
    },
    Leave {
        player_id: Uuid,
    },
    Intent {
        player_id: Uuid,
        intent: InputIntent,
    },
}

/// Errors from posting commands to a room.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    #[error("room task has shut down")]
    Closed,
}

/// Handle to a running room.
#[derive(Clone)]
pub struct RoomHandle {
    pub id: Uuid,
    command_tx: mpsc::Sender<RoomCommand>,
    snapshot_tx: broadcast::Sender<WorldSnapshot>,
    player_count: Arc<AtomicUsize>,
}

impl RoomHandle {
    pub async fn join(
        &self,
        player_id: Uuid,
        display_name: impl Into<String>,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Join {
            player_id,
            display_name: display_name.into(),
        })
        .await
    }

    pub async fn leave(&self, player_id: Uuid) -> Result<(), RoomError> {
        self.send(RoomCommand::Leave { player_id }).await
    }

    pub async fn submit_intent(
        &self,
        player_id: Uuid,
        intent: InputIntent,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Intent { player_id, intent }).await
    }

    /// Subscribe to the per-tick snapshot stream.
    pub fn subscribe(&self) -> broadcast::Receiver<WorldSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn player_count(&self) -> usize {
        self.player_count.load(Ordering::Relaxed)
    }

    async fn send(&self, command: RoomCommand) -> Result<(), RoomError> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| RoomError::Closed)
    }
}

/// A room's simulation task: owns the world, ticks it at the configured
/// cadence, and broadcasts one full snapshot per tick.
pub struct GameRoom {
    id: Uuid,
    world: WorldState,
    command_rx: mpsc::Receiver<RoomCommand>,
    snapshot_tx: broadcast::Sender<WorldSnapshot>,
    player_count: Arc<AtomicUsize>,
    /// Whether anyone ever joined; an empty room only ends after that
    had_players: bool,
}

impl GameRoom {
    pub fn new(id: Uuid, config: WorldConfig, seed: u64) -> Result<(Self, RoomHandle), ConfigError> {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_tx, _) = broadcast::channel(SNAPSHOT_BUFFER);
        let player_count = Arc::new(AtomicUsize::new(0));

        let handle = RoomHandle {
            id,
            command_tx,
            snapshot_tx: snapshot_tx.clone(),
            player_count: player_count.clone(),
        };

        let room = Self {
            id,
            world: WorldState::new(config, seed)?,
            command_rx,
            snapshot_tx,
            player_count,
            had_players: false,
        };

        Ok((room, handle))
    }

    /// Run the fixed-cadence tick loop until the last player leaves or every
    /// handle is dropped.
    pub async fn run(mut self) {
        info!(room_id = %self.id, "room started");

        let tick_ms = self.world.config().tick_interval_ms;
        let mut tick_interval =
            interval(Duration::from_micros((tick_ms * 1000.0) as u64));
        tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tick_interval.tick().await;

            let open = self.drain_commands();

            let snapshot = self.world.tick(tick_ms);
            let _ = self.snapshot_tx.send(snapshot);

            if self.had_players && self.world.player_count() == 0 {
                info!(room_id = %self.id, "all players left, room ending");
                break;
            }
            if !open {
                info!(room_id = %self.id, "all handles dropped, room ending");
                break;
            }
        }
    }

    /// Apply everything buffered since the previous tick. Returns false once
    /// the command channel is closed.
    fn drain_commands(&mut self) -> bool {
        loop {
            match self.command_rx.try_recv() {
                Ok(RoomCommand::Join {
                    player_id,
                    display_name,
                }) => {
                    self.world.join(player_id, display_name);
                    self.had_players = true;
                }
                Ok(RoomCommand::Leave { player_id }) => {
                    self.world.leave(&player_id);
                }
                Ok(RoomCommand::Intent { player_id, intent }) => {
                    self.world.submit_intent(player_id, intent);
                }
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    self.player_count
                        .store(self.world.player_count(), Ordering::Relaxed);
                    return false;
                }
            }
        }
        self.player_count
            .store(self.world.player_count(), Ordering::Relaxed);
        true
    }
}

/// Registry of all active rooms.
pub struct RoomRegistry {
    rooms: DashMap<Uuid, RoomHandle>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    pub fn get(&self, id: &Uuid) -> Option<RoomHandle> {
        self.rooms.get(id).map(|r| r.value().clone())
    }

    pub fn insert(&self, handle: RoomHandle) {
        self.rooms.insert(handle.id, handle);
    }

    pub fn remove(&self, id: &Uuid) -> Option<RoomHandle> {
        self.rooms.remove(id).map(|(_, h)| h)
    }

    pub fn active_rooms(&self) -> usize {
        self.rooms.len()
    }

    pub fn total_players(&self) -> usize {
        self.rooms.iter().map(|r| r.value().player_count()).sum()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{timeout, Duration};

    fn fast_config() -> WorldConfig {
        init_logging();
        let mut config = WorldConfig::default();
        config.tick_interval_ms = 5.0;
        config
    }

    /// Route room logs through a subscriber; `RUST_LOG` overrides the level.
    fn init_logging() {
        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_test_writer()
            .try_init();
    }

    #[tokio::test]
    async fn room_broadcasts_snapshots_and_applies_commands() {
        let (room, handle) = GameRoom::new(Uuid::new_v4(), fast_config(), 42).unwrap();
        let mut snapshots = handle.subscribe();
        let task = tokio::spawn(room.run());

        let player_id = Uuid::new_v4();
        handle.join(player_id, "netplayer").await.unwrap();
        handle
            .submit_intent(
                player_id,
                InputIntent {
                    seq: 1,
                    move_x: 1.0,
                    move_y: 0.0,
                    dash: false,
                    tag_target: None,
                },
            )
            .await
            .unwrap();

        // Wait until a snapshot shows the processed input.
        let mut acknowledged = false;
        for _ in 0..100 {
            let snapshot = timeout(Duration::from_secs(2), snapshots.recv())
                .await
                .expect("snapshot timely")
                .expect("stream open");
            if let Some(player) = snapshot.players.iter().find(|p| p.id == player_id) {
                if player.last_input_seq == 1 {
                    acknowledged = true;
                    break;
                }
            }
        }
        assert!(acknowledged, "input never acknowledged in snapshots");

        handle.leave(player_id).await.unwrap();
        timeout(Duration::from_secs(2), task)
            .await
            .expect("room task ends after last leave")
            .unwrap();
    }

    #[tokio::test]
    async fn room_ends_when_all_handles_drop() {
        let (room, handle) = GameRoom::new(Uuid::new_v4(), fast_config(), 7).unwrap();
        let task = tokio::spawn(room.run());

        drop(handle);
        timeout(Duration::from_secs(2), task)
            .await
            .expect("room task ends once handles are gone")
            .unwrap();
    }

    #[tokio::test]
    async fn commands_to_a_finished_room_fail() {
        let (room, handle) = GameRoom::new(Uuid::new_v4(), fast_config(), 9).unwrap();
        let task = tokio::spawn(room.run());

        let player_id = Uuid::new_v4();
        handle.join(player_id, "drifter").await.unwrap();
        handle.leave(player_id).await.unwrap();
        task.await.unwrap();

        assert!(matches!(
            handle.leave(player_id).await,
            Err(RoomError::Closed)
        ));
    }

    #[tokio::test]
    async fn registry_tracks_rooms() {
        let registry = RoomRegistry::new();
        let (_room, handle) = GameRoom::new(Uuid::new_v4(), fast_config(), 1).unwrap();
        let id = handle.id;

        registry.insert(handle);
        assert_eq!(registry.active_rooms(), 1);
        assert!(registry.get(&id).is_some());

        registry.remove(&id);
        assert_eq!(registry.active_rooms(), 0);
    }
}
