use bevy_ecs::prelude::*;

use crate::components::{Player, Position};
use crate::events::{SimEvent, SimEvents};
use crate::map::SchoolMap;
use crate::sim::TickClock;

// ============================================================================
// Door Systems
// ============================================================================

// The player standing on a door cell swings it open and rearms its close
// deadline; the other characters pass through doors without touching them.
// Only a closed-to-open transition emits the cue; lingering on the cell
// keeps pushing the deadline out silently.
pub fn door_trigger_system(
    clock: Res<TickClock>,
    mut map: ResMut<SchoolMap>,
    mut events: ResMut<SimEvents>,
    player: Query<&Position, With<Player>>,
) {
    let Ok(pos) = player.single() else {
        return;
    };
    if map.trigger_door(pos.x, pos.y, clock.0) {
        events.push(SimEvent::DoorOpened {
            cell: SchoolMap::cell_of(pos.x, pos.y),
        });
    }
}

// Runs last in the tick so a door opened this tick always gets its full
// delay before closing.
pub fn door_close_system(
    clock: Res<TickClock>,
    mut map: ResMut<SchoolMap>,
    mut events: ResMut<SimEvents>,
) {
    for cell in map.close_expired_doors(clock.0) {
        events.push(SimEvent::DoorClosed { cell });
    }
}
