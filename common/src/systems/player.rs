use bevy_ecs::prelude::*;
use bevy_math::Vec2;

use crate::collision::slide;
use crate::components::{Facing, Player, Position};
use crate::constants::*;
use crate::events::{GameOutcome, Outcome, SimEvent, SimEvents};
use crate::map::SchoolMap;
use crate::sim::{InputState, MathPrompt};

// ============================================================================
// Player Movement System
// ============================================================================

// Integrate directional intents into a walkability-gated move, handle
// stamina, notebook pickups and the win check. Runs first in the tick.
pub fn player_movement_system(
    input: Res<InputState>,
    mut map: ResMut<SchoolMap>,
    mut prompt: ResMut<MathPrompt>,
    mut outcome: ResMut<Outcome>,
    mut events: ResMut<SimEvents>,
    mut query: Query<(&mut Position, &mut Facing, &mut Player)>,
) {
    if outcome.0.is_some() {
        return;
    }
    let Ok((mut pos, mut facing, mut player)) = query.single_mut() else {
        return;
    };

    // Detention countdown; the stashed speed is restored exactly.
    if let Some(mut detention) = player.detention {
        detention.ticks_left = detention.ticks_left.saturating_sub(1);
        if detention.ticks_left == 0 {
            player.speed = detention.restore_speed;
            player.detention = None;
            events.push(SimEvent::DetentionEnded);
        } else {
            player.speed = 0.0;
            player.detention = Some(detention);
        }
    }

    // Raw displacement: independent axis contributions, so diagonal input
    // is faster by sqrt(2). Intentional, inherited behavior.
    let mut dx = 0.0;
    let mut dy = 0.0;
    if input.up {
        dy -= player.speed;
    }
    if input.down {
        dy += player.speed;
    }
    if input.left {
        dx -= player.speed;
    }
    if input.right {
        dx += player.speed;
    }

    player.running = input.run && player.stamina > 0.0;
    if player.running && (dx != 0.0 || dy != 0.0) {
        dx *= RUN_MULTIPLIER;
        dy *= RUN_MULTIPLIER;
        player.stamina = (player.stamina - STAMINA_DRAIN).max(0.0);
    } else if player.stamina < STAMINA_MAX {
        player.stamina = (player.stamina + STAMINA_REGEN).min(STAMINA_MAX);
    }

    slide(&map, &mut pos, dx, dy);

    if dx != 0.0 || dy != 0.0 {
        facing.0 = Vec2::new(dx, dy).normalize_or_zero();
    }

    // Notebook pickup raises the modal math prompt; the whole simulation
    // freezes until the host resolves it.
    if map.has_notebook(pos.x, pos.y) {
        map.collect_notebook(pos.x, pos.y);
        player.notebooks += 1;
        prompt.active = true;
        events.push(SimEvent::NotebookCollected {
            total: player.notebooks,
        });
    }

    if player.notebooks >= WIN_NOTEBOOKS && map.is_exit(pos.x, pos.y) {
        outcome.0 = Some(GameOutcome::Won);
    }
}
