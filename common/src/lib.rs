//! Shared core for the schoolhouse chase game: the deterministic tick
//! simulation (grid map, characters, items, transient effects) and the
//! wire protocol plus QUIC plumbing used by the position relay server.

pub mod collision;
pub mod components;
pub mod config;
pub mod constants;
pub mod events;
pub mod map;
pub mod net;
pub mod protocol;
pub mod sim;
pub mod systems;
