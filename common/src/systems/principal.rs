use bevy_ecs::prelude::*;
use bevy_math::Vec2;
use rand::Rng as _;

use crate::collision::{boxes_overlap, slide};
use crate::components::{Detention, Player, Position, Principal};
use crate::constants::*;
use crate::events::{Outcome, SimEvent, SimEvents};
use crate::map::SchoolMap;
use crate::sim::SimRng;

// ============================================================================
// Principal System
// ============================================================================

// Walk the cyclic patrol route; chase any player caught running inside the
// detection radius and put them in detention on contact. A stuck counter
// breaks deadlocks against walls with a randomized escape step.
pub fn principal_system(
    map: Res<SchoolMap>,
    outcome: Res<Outcome>,
    mut rng: ResMut<SimRng>,
    mut events: ResMut<SimEvents>,
    mut principal_query: Query<(&mut Position, &mut Principal)>,
    mut player_query: Query<(&Position, &mut Player), Without<Principal>>,
) {
    if outcome.0.is_some() {
        return;
    }
    let Ok((mut pos, mut principal)) = principal_query.single_mut() else {
        return;
    };
    let Ok((player_pos, mut player)) = player_query.single_mut() else {
        return;
    };

    let prev = pos.vec();
    let mut chasing = false;

    // Patrol leg
    let target = principal.waypoints[principal.waypoint_index];
    let delta = target - pos.vec();
    let distance = delta.length();
    if distance > PRINCIPAL_SPEED {
        let dir = delta / distance;
        step_with_sidestep(&map, &mut pos, dir * PRINCIPAL_SPEED, PRINCIPAL_SPEED);
    } else {
        principal.advance_waypoint();
    }

    // Pursuit of a running player; detained players are already standing
    // still and are left alone.
    if player.running && player.detention.is_none() {
        let player_delta = player_pos.vec() - pos.vec();
        let player_distance = player_delta.length();
        if player_distance < PRINCIPAL_DETECTION_RADIUS && player_distance > f32::EPSILON {
            chasing = true;
            let dir = player_delta / player_distance;
            step_with_sidestep(&map, &mut pos, dir * PRINCIPAL_SPEED * PRINCIPAL_CHASE_MULTIPLIER, PRINCIPAL_SPEED);

            if boxes_overlap(
                &pos,
                CHARACTER_SIZE,
                CHARACTER_SIZE,
                player_pos,
                CHARACTER_SIZE,
                CHARACTER_SIZE,
            ) {
                player.detention = Some(Detention {
                    ticks_left: DETENTION_TICKS,
                    restore_speed: player.speed,
                });
                player.speed = 0.0;
                events.push(SimEvent::DetentionStarted);
            }
        }
    }

    // Deadlock recovery
    let moved = (pos.vec() - prev).length();
    if moved < STUCK_MOVEMENT_EPSILON {
        principal.stuck_ticks += 1;
    } else {
        principal.stuck_ticks = 0;
    }

    if principal.stuck_ticks > STUCK_THRESHOLD_TICKS {
        const DIRS: [Vec2; 4] = [Vec2::X, Vec2::NEG_X, Vec2::Y, Vec2::NEG_Y];
        for _ in 0..DIRS.len() {
            let dir = DIRS[rng.0.random_range(0..DIRS.len())];
            let escape = dir * PRINCIPAL_SPEED * 2.0;
            if map.is_walkable(pos.x + escape.x, pos.y) {
                pos.x += escape.x;
                break;
            }
            if map.is_walkable(pos.x, pos.y + escape.y) {
                pos.y += escape.y;
                break;
            }
        }
        if !chasing {
            principal.advance_waypoint();
        }
        principal.stuck_ticks = 0;
    }
}

// Per-axis gated step; when both pushed axes are blocked, try a
// perpendicular sidestep so the patroller skirts around a corner instead
// of grinding it. An axis with no displacement never counts as blocked.
fn step_with_sidestep(map: &SchoolMap, pos: &mut Position, step: Vec2, sidestep_speed: f32) {
    let (moved_x, moved_y) = slide(map, pos, step.x, step.y);
    let blocked_x = step.x != 0.0 && !moved_x;
    let blocked_y = step.y != 0.0 && !moved_y;
    if blocked_x && blocked_y {
        let side_x = pos.x + step.y.signum() * sidestep_speed;
        let side_y = pos.y + step.x.signum() * sidestep_speed;
        if map.is_walkable(side_x, pos.y) {
            pos.x = side_x;
        } else if map.is_walkable(pos.x, side_y) {
            pos.y = side_y;
        }
    }
}
