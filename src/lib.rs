//! Authoritative simulation core for a multiplayer tag arena.
//!
//! One [`WorldState`] per room advances players, the dash ability, the
//! tag-and-slow mechanic, collectible orbs, and player separation at a fixed
//! tick, consuming buffered client intents and emitting one full snapshot per
//! tick. The [`room`] module hosts a world on a dedicated tokio task; the
//! [`client`] module smooths discrete snapshots into continuous rendered
//! motion on the receiving side.
//!
//! Transport, matchmaking, and rendering are the host's concern: it feeds
//! join/leave events and raw intents in, and forwards snapshots out.

pub mod client;
pub mod config;
pub mod game;
pub mod room;

pub use client::{ClientPredictor, InterpolatedEntity};
pub use config::{ConfigError, WorldConfig};
pub use game::intent::InputIntent;
pub use game::snapshot::{OrbSnapshot, PlayerSnapshot, WorldSnapshot};
pub use game::world::WorldState;
pub use room::{GameRoom, RoomError, RoomHandle, RoomRegistry};
