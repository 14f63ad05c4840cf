use bevy_ecs::prelude::*;
use bevy_math::Vec2;
use rand::Rng as _;

use crate::collision::{boxes_overlap, slide};
use crate::components::{Facing, FirstPrize, Player, Position};
use crate::constants::*;
use crate::events::Outcome;
use crate::map::SchoolMap;
use crate::sim::{SimRng, TickClock};

// ============================================================================
// First Prize System
// ============================================================================

const WANDER_DIRS: [(f32, f32); 8] = [
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (0.0, -1.0),
    (1.0, 1.0),
    (-1.0, 1.0),
    (1.0, -1.0),
    (-1.0, -1.0),
];

// Wander on a periodically rerolled 8-way heading; on sight of the player,
// close in and, on contact, start a push that shoves the player along a
// fixed direction until both axes are blocked. The shove is a hindrance,
// never a loss condition.
pub fn first_prize_system(
    map: Res<SchoolMap>,
    clock: Res<TickClock>,
    outcome: Res<Outcome>,
    mut rng: ResMut<SimRng>,
    mut prize_query: Query<(&mut Position, &mut FirstPrize)>,
    mut player_query: Query<(&mut Position, &Facing), (With<Player>, Without<FirstPrize>)>,
) {
    if outcome.0.is_some() {
        return;
    }
    let Ok((mut pos, mut prize)) = prize_query.single_mut() else {
        return;
    };
    let Ok((mut player_pos, player_facing)) = player_query.single_mut() else {
        return;
    };

    let delta = player_pos.vec() - pos.vec();
    let distance = delta.length();

    if distance < FIRST_PRIZE_SIGHT_RADIUS {
        let dir = delta / distance.max(1.0);
        slide(
            &map,
            &mut pos,
            dir.x * FIRST_PRIZE_SPEED,
            dir.y * FIRST_PRIZE_SPEED,
        );

        if boxes_overlap(
            &pos,
            CHARACTER_SIZE,
            CHARACTER_SIZE,
            &player_pos,
            CHARACTER_SIZE,
            CHARACTER_SIZE,
        ) {
            // Shove along the player's own heading; a near-stationary player
            // is instead pushed straight away from the wanderer.
            let heading = player_facing.0;
            prize.push_dir = Some(if heading.length() < 0.2 { dir } else { heading });
        }
    } else {
        prize.push_dir = None;

        if clock.0 >= prize.reroll_at_tick || prize.wander_dir == Vec2::ZERO {
            let (x, y) = WANDER_DIRS[rng.0.random_range(0..WANDER_DIRS.len())];
            prize.wander_dir = Vec2::new(x, y).normalize();
            prize.reroll_at_tick =
                clock.0 + WANDER_MIN_TICKS + rng.0.random_range(0..WANDER_EXTRA_TICKS);
        }
        let step = prize.wander_dir * WANDER_SPEED;
        let (moved_x, moved_y) = slide(&map, &mut pos, step.x, step.y);
        if (step.x != 0.0 && !moved_x) || (step.y != 0.0 && !moved_y) {
            // Blocked: pick a new heading next tick.
            prize.reroll_at_tick = clock.0;
        }
    }

    // A running push displaces the player until every pushed axis is blocked.
    if let Some(dir) = prize.push_dir {
        let step = dir * FIRST_PRIZE_PUSH_STRENGTH;
        let (moved_x, moved_y) = slide(&map, &mut player_pos, step.x, step.y);
        let blocked_x = step.x != 0.0 && !moved_x;
        let blocked_y = step.y != 0.0 && !moved_y;
        if blocked_x && blocked_y {
            prize.push_dir = None;
        }
    }
}
