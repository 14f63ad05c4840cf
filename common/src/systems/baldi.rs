use bevy_ecs::prelude::*;

use crate::collision::{boxes_overlap, slide};
use crate::components::{Baldi, Player, Position};
use crate::constants::*;
use crate::events::{GameOutcome, Outcome, SimEvent, SimEvents};
use crate::map::SchoolMap;
use crate::sim::{MathPrompt, TickClock};

// ============================================================================
// Baldi System
// ============================================================================

// Calm Baldi stands still. Angry Baldi chases a deliberately stale player
// position: the chase target refreshes only when the hearing cooldown runs
// out, which is what makes hiding between refreshes viable.
pub fn baldi_system(
    map: Res<SchoolMap>,
    clock: Res<TickClock>,
    prompt: Res<MathPrompt>,
    mut outcome: ResMut<Outcome>,
    mut events: ResMut<SimEvents>,
    mut baldi_query: Query<(&mut Position, &mut Baldi)>,
    player_query: Query<(&Position, &Player), Without<Baldi>>,
) {
    if outcome.0.is_some() {
        return;
    }
    let Ok((mut pos, mut baldi)) = baldi_query.single_mut() else {
        return;
    };
    let Ok((player_pos, player)) = player_query.single() else {
        return;
    };

    if !baldi.angry {
        return;
    }

    let wrong_answers = prompt.wrong_answers;
    let speed = baldi.speed(player.notebooks, wrong_answers);

    if baldi.hearing_cooldown == 0 {
        baldi.last_known = player_pos.vec();
        baldi.hearing_cooldown = HEARING_COOLDOWN_TICKS;
    } else {
        baldi.hearing_cooldown -= 1;
    }

    let delta = baldi.last_known - pos.vec();
    let distance = delta.length();
    let closing_in = distance > speed;

    if distance > f32::EPSILON {
        // Scale down the final step so the target is never overshot.
        let step = distance.min(speed);
        let dir = delta / distance;
        slide(&map, &mut pos, dir.x * step, dir.y * step);
    }

    // Warning cue, faster with every wrong answer but never below the floor.
    if closing_in && clock.0 >= baldi.next_slap_tick {
        let interval = SLAP_BASE_INTERVAL_TICKS
            .saturating_sub(SLAP_INTERVAL_STEP_TICKS * u64::from(wrong_answers))
            .max(SLAP_MIN_INTERVAL_TICKS);
        baldi.next_slap_tick = clock.0 + interval;
        events.push(SimEvent::Slap);
    }

    if boxes_overlap(
        &pos,
        CHARACTER_SIZE,
        CHARACTER_SIZE,
        player_pos,
        CHARACTER_SIZE,
        CHARACTER_SIZE,
    ) {
        outcome.0 = Some(GameOutcome::Caught);
    }
}
