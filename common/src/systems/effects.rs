use bevy_ecs::prelude::*;

use crate::collision::{boxes_overlap, slide};
use crate::components::{Baldi, Position, Principal, Spray};
use crate::constants::*;
use crate::map::SchoolMap;
use crate::sim::TickClock;

// ============================================================================
// Spray System
// ============================================================================

// Advance in-flight spray clouds. A cloud dies on wall contact, when its
// travel budget runs out, or at its tick deadline; while it overlaps Baldi
// or the principal it knocks them back along its own direction of flight.
pub fn spray_system(
    map: Res<SchoolMap>,
    clock: Res<TickClock>,
    mut commands: Commands,
    mut spray_query: Query<(Entity, &mut Position, &mut Spray)>,
    mut target_query: Query<
        &mut Position,
        (Or<(With<Baldi>, With<Principal>)>, Without<Spray>),
    >,
) {
    for (entity, mut pos, mut spray) in &mut spray_query {
        if clock.0 >= spray.expires_at_tick || spray.remaining_travel <= 0.0 {
            commands.entity(entity).despawn();
            continue;
        }

        let next_x = pos.x + spray.velocity.x;
        let next_y = pos.y + spray.velocity.y;
        if !map.is_walkable(next_x, next_y) {
            commands.entity(entity).despawn();
            continue;
        }
        pos.x = next_x;
        pos.y = next_y;
        spray.remaining_travel -= spray.velocity.length();

        // signum(0.0) is 1.0, so zero components must stay zero.
        let push = |v: f32| {
            if v == 0.0 {
                0.0
            } else {
                v.signum() * KNOCKBACK_STRENGTH
            }
        };
        for mut target_pos in &mut target_query {
            if boxes_overlap(
                &pos,
                SPRAY_SIZE,
                SPRAY_SIZE,
                &target_pos,
                CHARACTER_SIZE,
                CHARACTER_SIZE,
            ) {
                slide(
                    &map,
                    &mut target_pos,
                    push(spray.velocity.x),
                    push(spray.velocity.y),
                );
            }
        }
    }
}
