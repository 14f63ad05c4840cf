//! Per-archetype simulation systems, chained in a fixed order by the
//! [`Simulation`](crate::sim::Simulation) schedule.

pub mod baldi;
pub mod doors;
pub mod effects;
pub mod first_prize;
pub mod items;
pub mod player;
pub mod principal;

pub use baldi::baldi_system;
pub use doors::{door_close_system, door_trigger_system};
pub use effects::spray_system;
pub use first_prize::first_prize_system;
pub use items::item_pickup_system;
pub use player::player_movement_system;
pub use principal::principal_system;
