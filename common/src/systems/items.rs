use bevy_ecs::prelude::*;

use crate::collision::boxes_overlap;
use crate::components::{Pickup, Player, Position};
use crate::constants::*;
use crate::events::{SimEvent, SimEvents};

// ============================================================================
// Item Pickup System
// ============================================================================

// Walking over a floor item equips it, replacing whatever was held; the
// replaced item is gone, not dropped.
pub fn item_pickup_system(
    mut commands: Commands,
    mut events: ResMut<SimEvents>,
    mut player_query: Query<(&Position, &mut Player)>,
    pickups: Query<(Entity, &Position, &Pickup), Without<Player>>,
) {
    let Ok((player_pos, mut player)) = player_query.single_mut() else {
        return;
    };

    for (entity, pos, pickup) in &pickups {
        if boxes_overlap(
            player_pos,
            CHARACTER_SIZE,
            CHARACTER_SIZE,
            pos,
            TILE_SIZE,
            TILE_SIZE,
        ) {
            player.held_item = Some(pickup.kind);
            events.push(SimEvent::ItemPicked { kind: pickup.kind });
            commands.entity(entity).despawn();
            break;
        }
    }
}
