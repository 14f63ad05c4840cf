use bevy_ecs::prelude::*;
use bevy_math::Vec2;

use common::components::{Baldi, Detention, Facing, FirstPrize, ItemKind, Player, Position, Principal};
use common::constants::*;
use common::events::{GameOutcome, SimEvent};
use common::sim::{InputState, MathPrompt, Simulation};

// ============================================================================
// Helpers
// ============================================================================

fn set_pos<T: Component>(sim: &mut Simulation, cell_x: i32, cell_y: i32) {
    let world = sim.world_mut();
    let mut query = world.query_filtered::<&mut Position, With<T>>();
    let mut pos = query.single_mut(world).unwrap();
    *pos = Position::at_cell(cell_x, cell_y);
}

fn pos_of<T: Component>(sim: &mut Simulation) -> Position {
    let world = sim.world_mut();
    let mut query = world.query_filtered::<&Position, With<T>>();
    *query.single(world).unwrap()
}

fn edit_player(sim: &mut Simulation, edit: impl FnOnce(&mut Player)) {
    let world = sim.world_mut();
    let mut query = world.query::<&mut Player>();
    edit(&mut query.single_mut(world).unwrap());
}

fn player(sim: &mut Simulation) -> Player {
    let world = sim.world_mut();
    let mut query = world.query::<&Player>();
    query.single(world).unwrap().clone()
}

fn anger_baldi(sim: &mut Simulation) {
    let world = sim.world_mut();
    let mut query = world.query::<&mut Baldi>();
    query.single_mut(world).unwrap().angry = true;
}

fn baldi(sim: &mut Simulation) -> Baldi {
    let world = sim.world_mut();
    let mut query = world.query::<&Baldi>();
    query.single(world).unwrap().clone()
}

// The wanderer roams on its own; long-running tests park it in a far
// classroom so it cannot drift into shoving range of the player.
fn park_first_prize(sim: &mut Simulation) {
    set_pos::<FirstPrize>(sim, 28, 3);
}

fn first_prize(sim: &mut Simulation) -> FirstPrize {
    let world = sim.world_mut();
    let mut query = world.query::<&FirstPrize>();
    query.single(world).unwrap().clone()
}

fn set_facing(sim: &mut Simulation, dir: Vec2) {
    let world = sim.world_mut();
    let mut query = world.query_filtered::<&mut Facing, With<Player>>();
    query.single_mut(world).unwrap().0 = dir;
}

fn hold(up: bool, down: bool, left: bool, right: bool, run: bool) -> InputState {
    InputState {
        up,
        down,
        left,
        right,
        run,
    }
}

// ============================================================================
// Stamina
// ============================================================================

#[test]
fn stamina_stays_within_bounds_and_refills_exactly() {
    let mut sim = Simulation::new(7);
    park_first_prize(&mut sim);

    // Run up the open corridor until well past exhaustion.
    sim.set_input(hold(true, false, false, false, true));
    for _ in 0..220 {
        sim.tick();
        let stamina = player(&mut sim).stamina;
        assert!((0.0..=STAMINA_MAX).contains(&stamina));
    }
    assert!(player(&mut sim).stamina < STAMINA_MAX);

    // Standing still refills to the cap and no further.
    sim.set_input(InputState::default());
    for _ in 0..600 {
        sim.tick();
    }
    assert_eq!(player(&mut sim).stamina, STAMINA_MAX);
}

// ============================================================================
// Baldi
// ============================================================================

#[test]
fn chase_target_stays_stale_for_the_full_hearing_window() {
    let mut sim = Simulation::new(7);
    park_first_prize(&mut sim);
    anger_baldi(&mut sim);
    set_pos::<Baldi>(&mut sim, 8, 8);
    set_pos::<Player>(&mut sim, 14, 8);
    let old_target = Position::at_cell(14, 8).vec();

    // First tick locks in the player position for the whole window.
    sim.tick();
    set_pos::<Player>(&mut sim, 14, 16);

    for _ in 0..30 {
        sim.tick();
    }
    let b = baldi(&mut sim);
    assert_eq!(b.last_known, old_target);
    // Walking the stale heading: straight along the corridor row.
    let pos = pos_of::<Baldi>(&mut sim);
    assert!(pos.x > 8.0 * TILE_SIZE);
    assert_eq!(pos.y, 8.0 * TILE_SIZE);

    // Once the window lapses the target snaps to the current position.
    for _ in 0..75 {
        sim.tick();
    }
    assert_eq!(baldi(&mut sim).last_known, Position::at_cell(14, 16).vec());
}

#[test]
fn wrong_answers_make_the_chase_faster() {
    let run = |wrong_answers: u32| {
        let mut sim = Simulation::new(7);
        park_first_prize(&mut sim);
        anger_baldi(&mut sim);
        sim.world_mut().resource_mut::<MathPrompt>().wrong_answers = wrong_answers;
        set_pos::<Baldi>(&mut sim, 8, 8);
        set_pos::<Player>(&mut sim, 16, 8);
        for _ in 0..30 {
            sim.tick();
        }
        pos_of::<Baldi>(&mut sim).x
    };

    let calm = run(0);
    let one = run(1);
    let three = run(3);
    assert!(one > calm);
    assert!(three > one);
}

#[test]
fn angry_contact_loses_the_match() {
    let mut sim = Simulation::new(7);
    anger_baldi(&mut sim);
    set_pos::<Baldi>(&mut sim, 17, 12);
    sim.tick();
    assert_eq!(sim.outcome(), Some(GameOutcome::Caught));

    // Further ticks are no-ops.
    let before = pos_of::<Principal>(&mut sim);
    sim.tick();
    assert_eq!(pos_of::<Principal>(&mut sim), before);
}

#[test]
fn calm_contact_is_harmless() {
    let mut sim = Simulation::new(7);
    set_pos::<Baldi>(&mut sim, 17, 12);
    sim.tick();
    assert_eq!(sim.outcome(), None);
}

// ============================================================================
// Notebooks and the Math Prompt
// ============================================================================

#[test]
fn notebook_pickup_freezes_the_simulation_until_resolved() {
    let mut sim = Simulation::new(7);
    park_first_prize(&mut sim);
    set_pos::<Player>(&mut sim, 13, 3);

    sim.tick();
    assert!(sim.math_prompt_active());
    assert!(sim
        .drain_events()
        .contains(&SimEvent::NotebookCollected { total: 1 }));
    assert_eq!(player(&mut sim).notebooks, 1);

    // Frozen: the clock does not advance.
    let frozen_at = sim.tick_count();
    sim.tick();
    sim.tick();
    assert_eq!(sim.tick_count(), frozen_at);

    sim.resolve_math(false);
    assert!(!sim.math_prompt_active());
    assert_eq!(sim.wrong_answers(), 1);
    assert!(baldi(&mut sim).angry);

    sim.tick();
    assert_eq!(sim.tick_count(), frozen_at + 1);
}

#[test]
fn correct_answer_leaves_baldi_calm() {
    let mut sim = Simulation::new(7);
    park_first_prize(&mut sim);
    set_pos::<Player>(&mut sim, 13, 3);
    sim.tick();
    sim.resolve_math(true);
    assert_eq!(sim.wrong_answers(), 0);
    assert!(!baldi(&mut sim).angry);
}

#[test]
fn a_collected_notebook_is_gone_for_good() {
    let mut sim = Simulation::new(7);
    park_first_prize(&mut sim);
    set_pos::<Player>(&mut sim, 13, 3);
    sim.tick();
    sim.resolve_math(true);
    sim.tick();
    assert_eq!(player(&mut sim).notebooks, 1);
    assert_eq!(sim.map().notebooks_remaining(), 8);
}

// ============================================================================
// Win and Loss
// ============================================================================

#[test]
fn seven_notebooks_at_the_exit_wins() {
    let mut sim = Simulation::new(7);
    park_first_prize(&mut sim);
    edit_player(&mut sim, |p| p.notebooks = WIN_NOTEBOOKS);
    set_pos::<Player>(&mut sim, 17, 24);
    sim.tick();
    assert_eq!(sim.outcome(), Some(GameOutcome::Won));
}

#[test]
fn the_exit_does_nothing_below_the_threshold() {
    let mut sim = Simulation::new(7);
    park_first_prize(&mut sim);
    edit_player(&mut sim, |p| p.notebooks = WIN_NOTEBOOKS - 1);
    set_pos::<Player>(&mut sim, 17, 24);
    sim.tick();
    assert_eq!(sim.outcome(), None);
}

// ============================================================================
// Detention
// ============================================================================

#[test]
fn running_near_the_principal_earns_detention() {
    let mut sim = Simulation::new(7);
    park_first_prize(&mut sim);
    set_pos::<Player>(&mut sim, 10, 12);
    set_pos::<Principal>(&mut sim, 12, 12);

    // Standing still with the run key held still counts as running.
    sim.set_input(hold(false, false, false, false, true));
    for _ in 0..30 {
        sim.tick();
    }
    let p = player(&mut sim);
    assert!(p.detention.is_some());
    assert_eq!(p.speed, 0.0);
    assert!(sim.drain_events().contains(&SimEvent::DetentionStarted));
}

#[test]
fn detention_freezes_movement_and_restores_speed_exactly() {
    let mut sim = Simulation::new(7);
    park_first_prize(&mut sim);
    edit_player(&mut sim, |p| {
        p.detention = Some(Detention {
            ticks_left: 3,
            restore_speed: PLAYER_SPEED,
        });
        p.speed = 0.0;
    });
    let start = pos_of::<Player>(&mut sim);

    sim.set_input(hold(false, false, false, true, false));
    for _ in 0..3 {
        sim.tick();
        assert_eq!(pos_of::<Player>(&mut sim), start);
    }
    let p = player(&mut sim);
    assert!(p.detention.is_none());
    assert_eq!(p.speed, PLAYER_SPEED);
    assert!(sim.drain_events().contains(&SimEvent::DetentionEnded));

    sim.tick();
    assert_eq!(pos_of::<Player>(&mut sim).x, start.x + PLAYER_SPEED);
}

// ============================================================================
// Items and the Spray
// ============================================================================

#[test]
fn a_quarter_buys_from_the_machine_and_the_bar_refills_stamina() {
    let mut sim = Simulation::new(7);
    park_first_prize(&mut sim);
    set_pos::<Player>(&mut sim, 22, 11); // on the zesty machine cell
    edit_player(&mut sim, |p| {
        p.held_item = Some(ItemKind::Quarter);
        p.stamina = 10.0;
    });

    assert!(sim.use_or_purchase());
    assert_eq!(player(&mut sim).held_item, Some(ItemKind::EnergyBar));
    assert!(sim.use_or_purchase());
    let p = player(&mut sim);
    assert_eq!(p.held_item, None);
    assert_eq!(p.stamina, STAMINA_MAX);

    let events = sim.drain_events();
    assert!(events.iter().any(|e| matches!(e, SimEvent::Purchased { .. })));
    assert!(events.contains(&SimEvent::ItemUsed {
        kind: ItemKind::EnergyBar
    }));
}

#[test]
fn a_quarter_away_from_any_machine_is_kept() {
    let mut sim = Simulation::new(7);
    edit_player(&mut sim, |p| p.held_item = Some(ItemKind::Quarter));
    assert!(!sim.use_or_purchase());
    assert_eq!(player(&mut sim).held_item, Some(ItemKind::Quarter));
}

#[test]
fn the_spray_knocks_baldi_back() {
    let mut sim = Simulation::new(7);
    park_first_prize(&mut sim);
    set_pos::<Player>(&mut sim, 10, 12);
    set_pos::<Baldi>(&mut sim, 12, 12);
    {
        let world = sim.world_mut();
        let mut query = world.query_filtered::<&mut common::components::Facing, With<Player>>();
        query.single_mut(world).unwrap().0 = Vec2::X;
    }
    edit_player(&mut sim, |p| p.held_item = Some(ItemKind::Bsoda));

    let before = pos_of::<Baldi>(&mut sim).x;
    assert!(sim.use_or_purchase());
    assert_eq!(player(&mut sim).held_item, None);
    for _ in 0..6 {
        sim.tick();
    }
    let after = pos_of::<Baldi>(&mut sim).x;
    assert!(after >= before + KNOCKBACK_STRENGTH);
    assert!(sim.drain_events().contains(&SimEvent::SprayFired));
}

#[test]
fn walking_over_a_floor_item_replaces_the_held_one() {
    let mut sim = Simulation::new(7);
    park_first_prize(&mut sim);
    edit_player(&mut sim, |p| p.held_item = Some(ItemKind::Bsoda));
    set_pos::<Player>(&mut sim, 13, 8); // on top of a quarter
    sim.tick();
    assert_eq!(player(&mut sim).held_item, Some(ItemKind::Quarter));
    assert!(sim.drain_events().contains(&SimEvent::ItemPicked {
        kind: ItemKind::Quarter
    }));

    // The item is gone from the floor; only one equip happens.
    sim.tick();
    assert_eq!(player(&mut sim).held_item, Some(ItemKind::Quarter));
}

// ============================================================================
// Doors
// ============================================================================

#[test]
fn a_door_cues_once_on_opening_and_closes_after_the_delay() {
    let mut sim = Simulation::new(7);
    park_first_prize(&mut sim);
    set_pos::<Player>(&mut sim, 4, 6); // a classroom doorway

    sim.tick();
    let opened = |events: &[SimEvent]| {
        events
            .iter()
            .filter(|e| matches!(e, SimEvent::DoorOpened { cell: (4, 6) }))
            .count()
    };
    assert_eq!(opened(&sim.drain_events()), 1);

    // Lingering on the open door re-arms it silently.
    sim.tick();
    assert_eq!(opened(&sim.drain_events()), 0);

    // Step off; the close fires exactly once after the delay.
    set_pos::<Player>(&mut sim, 4, 8);
    let mut closes = 0;
    for _ in 0..DOOR_CLOSE_DELAY_TICKS + 5 {
        sim.tick();
        closes += sim
            .drain_events()
            .iter()
            .filter(|e| matches!(e, SimEvent::DoorClosed { cell: (4, 6) }))
            .count();
    }
    assert_eq!(closes, 1);
}

#[test]
fn only_the_player_swings_doors() {
    let mut sim = Simulation::new(7);
    park_first_prize(&mut sim);
    // Baldi parked on a doorway, the principal patrolling through the
    // office door cell on his way to the first waypoint.
    set_pos::<Baldi>(&mut sim, 13, 6);

    for _ in 0..60 {
        sim.tick();
        assert!(sim
            .drain_events()
            .iter()
            .all(|e| !matches!(e, SimEvent::DoorOpened { .. })));
    }
}

// ============================================================================
// The Wanderer
// ============================================================================

#[test]
fn the_wanderer_closes_in_on_a_seen_player() {
    let mut sim = Simulation::new(7);
    set_pos::<FirstPrize>(&mut sim, 21, 15);
    set_pos::<Player>(&mut sim, 24, 15);

    let gap = |sim: &mut Simulation| {
        (pos_of::<Player>(sim).vec() - pos_of::<FirstPrize>(sim).vec()).length()
    };
    let before = gap(&mut sim);
    assert!(before < FIRST_PRIZE_SIGHT_RADIUS);

    for _ in 0..10 {
        sim.tick();
    }
    assert!(gap(&mut sim) < before - 5.0);
}

#[test]
fn the_push_follows_the_player_heading() {
    let mut sim = Simulation::new(7);
    set_pos::<FirstPrize>(&mut sim, 24, 15);
    set_pos::<Player>(&mut sim, 25, 15);
    // Facing south while the wanderer closes in from the west: a shove
    // aimed at the player would go east, one along the heading goes south.
    set_facing(&mut sim, Vec2::Y);

    let start = pos_of::<Player>(&mut sim);
    for _ in 0..12 {
        sim.tick();
    }
    let after = pos_of::<Player>(&mut sim);
    assert!(after.y > start.y + 25.0);
    assert_eq!(after.x, start.x);
}

#[test]
fn a_stationary_player_is_shoved_straight_away() {
    let mut sim = Simulation::new(7);
    set_pos::<FirstPrize>(&mut sim, 24, 15);
    set_pos::<Player>(&mut sim, 25, 15);
    // No meaningful heading, so the shove falls back to pointing from the
    // wanderer at the player.
    set_facing(&mut sim, Vec2::ZERO);

    let start = pos_of::<Player>(&mut sim);
    for _ in 0..12 {
        sim.tick();
    }
    let after = pos_of::<Player>(&mut sim);
    assert!(after.x > start.x + 25.0);
    assert_eq!(after.y, start.y);
}

#[test]
fn the_push_gives_out_against_a_corner() {
    let mut sim = Simulation::new(7);
    set_pos::<FirstPrize>(&mut sim, 28, 13);
    set_pos::<Player>(&mut sim, 29, 13);
    set_facing(&mut sim, Vec2::new(1.0, 1.0).normalize());

    for _ in 0..60 {
        sim.tick();
    }

    // Wedged into the cafeteria's south-east corner, within one push step
    // of each wall, and the shove has been dropped.
    let pinned = pos_of::<Player>(&mut sim);
    assert!(pinned.x > 31.0 * TILE_SIZE - FIRST_PRIZE_PUSH_STRENGTH);
    assert!(pinned.x < 31.0 * TILE_SIZE);
    assert!(pinned.y > 14.0 * TILE_SIZE - FIRST_PRIZE_PUSH_STRENGTH);
    assert!(pinned.y < 14.0 * TILE_SIZE);
    assert!(first_prize(&mut sim).push_dir.is_none());

    for _ in 0..5 {
        sim.tick();
    }
    assert_eq!(pos_of::<Player>(&mut sim), pinned);
}
