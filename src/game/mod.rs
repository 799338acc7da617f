//! Game simulation modules

pub mod intent;
pub mod orb;
pub mod physics;
pub mod player;
pub mod snapshot;
pub mod world;

pub use intent::{InputIntent, IntentQueue, ResolvedIntent};
pub use orb::Orb;
pub use player::PlayerState;
pub use snapshot::{OrbSnapshot, PlayerSnapshot, WorldSnapshot};
pub use world::WorldState;
