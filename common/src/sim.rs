use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;
use bevy_math::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng as _;

use crate::collision::boxes_overlap;
use crate::components::{
    Baldi, Facing, FirstPrize, ItemKind, MachineKind, Pickup, Player, Position, Principal, Spray,
    VendingMachine,
};
use crate::constants::*;
use crate::events::{GameOutcome, Outcome, SimEvent, SimEvents};
use crate::map::SchoolMap;
use crate::systems::{
    baldi_system, door_close_system, door_trigger_system, first_prize_system, item_pickup_system,
    player_movement_system, principal_system, spray_system,
};

// ============================================================================
// Resources
// ============================================================================

/// Directional intents plus the run modifier, as captured for the current
/// tick. Held, not edge-triggered; the host re-submits them every tick.
#[derive(Debug, Clone, Copy, Default, Resource)]
pub struct InputState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub run: bool,
}

/// Monotone tick counter; every duration in the simulation is a deadline
/// against this clock, so a frozen clock freezes every timer with it.
#[derive(Debug, Clone, Copy, Default, Resource)]
pub struct TickClock(pub u64);

/// The modal math prompt. While active the whole simulation is frozen; the
/// cumulative wrong answer count never resets.
#[derive(Debug, Clone, Copy, Default, Resource)]
pub struct MathPrompt {
    pub active: bool,
    pub wrong_answers: u32,
}

/// Seeded simulation RNG; the only source of randomness in a run.
#[derive(Resource)]
pub struct SimRng(pub StdRng);

// ============================================================================
// Simulation
// ============================================================================

// The spawn layout, in grid cells.
const PLAYER_SPAWN: (i32, i32) = (17, 12);
const BALDI_SPAWN: (i32, i32) = (4, 3);
const PRINCIPAL_SPAWN: (i32, i32) = (4, 12);
const FIRST_PRIZE_SPAWN: (i32, i32) = (25, 13);

const PICKUP_SPAWNS: [(ItemKind, i32, i32); 4] = [
    (ItemKind::Quarter, 13, 8),
    (ItemKind::EnergyBar, 25, 12),
    (ItemKind::Quarter, 21, 8),
    (ItemKind::EnergyBar, 29, 20),
];

const MACHINE_SPAWNS: [(MachineKind, i32, i32); 2] =
    [(MachineKind::Zesty, 22, 11), (MachineKind::Bsoda, 30, 11)];

// The patrol loop through the hallways, in grid cells. The east legs go
// around the cafeteria through the outer corridor.
const PATROL_ROUTE: [(i32, i32); 12] = [
    (8, 12),
    (12, 12),
    (17, 12),
    (17, 8),
    (24, 8),
    (30, 8),
    (33, 8),
    (33, 16),
    (24, 16),
    (17, 16),
    (12, 16),
    (8, 16),
];

/// A complete single-match simulation: the ECS world plus the fixed-order
/// schedule that advances it one tick at a time. The caller owns the pacing;
/// [`Simulation::tick`] never sleeps.
pub struct Simulation {
    world: World,
    schedule: Schedule,
}

impl Simulation {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let mut world = World::new();
        world.insert_resource(SchoolMap::school());
        world.insert_resource(InputState::default());
        world.insert_resource(TickClock::default());
        world.insert_resource(MathPrompt::default());
        world.insert_resource(SimRng(StdRng::seed_from_u64(seed)));
        world.insert_resource(SimEvents::default());
        world.insert_resource(Outcome::default());

        world.spawn((
            Position::at_cell(PLAYER_SPAWN.0, PLAYER_SPAWN.1),
            Facing(Vec2::NEG_Y),
            Player::default(),
        ));
        world.spawn((Position::at_cell(BALDI_SPAWN.0, BALDI_SPAWN.1), Baldi::new()));
        world.spawn((
            Position::at_cell(PRINCIPAL_SPAWN.0, PRINCIPAL_SPAWN.1),
            Principal::new(
                PATROL_ROUTE
                    .iter()
                    .map(|&(x, y)| Position::at_cell(x, y).vec())
                    .collect(),
            ),
        ));
        world.spawn((
            Position::at_cell(FIRST_PRIZE_SPAWN.0, FIRST_PRIZE_SPAWN.1),
            FirstPrize::new(),
        ));
        for (kind, x, y) in PICKUP_SPAWNS {
            world.spawn((Position::at_cell(x, y), Pickup { kind }));
        }
        for (kind, x, y) in MACHINE_SPAWNS {
            world.spawn((Position::at_cell(x, y), VendingMachine { kind }));
        }

        let mut schedule = Schedule::default();
        schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        schedule.add_systems(
            (
                player_movement_system,
                door_trigger_system,
                baldi_system,
                principal_system,
                first_prize_system,
                item_pickup_system,
                spray_system,
                door_close_system,
            )
                .chain(),
        );

        Self { world, schedule }
    }

    /// Advance the world by one tick. A no-op while the math prompt is up or
    /// once the match has been decided.
    pub fn tick(&mut self) {
        if self.world.resource::<MathPrompt>().active
            || self.world.resource::<Outcome>().0.is_some()
        {
            return;
        }
        self.schedule.run(&mut self.world);
        self.world.resource_mut::<TickClock>().0 += 1;
    }

    pub fn set_input(&mut self, input: InputState) {
        *self.world.resource_mut::<InputState>() = input;
    }

    /// Resolve the active math prompt. A wrong answer permanently angers the
    /// pursuer and bumps the cumulative wrong count; either way the prompt
    /// drops and the simulation unfreezes.
    pub fn resolve_math(&mut self, correct: bool) {
        {
            let mut prompt = self.world.resource_mut::<MathPrompt>();
            if !prompt.active {
                return;
            }
            prompt.active = false;
            if !correct {
                prompt.wrong_answers += 1;
            }
        }
        if !correct {
            let mut query = self.world.query::<&mut Baldi>();
            if let Ok(mut baldi) = query.single_mut(&mut self.world) {
                baldi.angry = true;
            }
        }
    }

    /// Use the held item, or spend a held quarter at an adjacent vending
    /// machine. Returns whether anything was consumed.
    pub fn use_or_purchase(&mut self) -> bool {
        let mut player_query = self.world.query::<(&Position, &Facing, &Player)>();
        let Ok((pos, facing, player)) = player_query.single(&self.world) else {
            return false;
        };
        let (pos, facing_dir, held) = (*pos, facing.0, player.held_item);

        match held {
            Some(ItemKind::Quarter) => {
                let mut machines = self.world.query::<(&Position, &VendingMachine)>();
                let product = machines
                    .iter(&self.world)
                    .find(|(machine_pos, _)| {
                        boxes_overlap(
                            &pos,
                            CHARACTER_SIZE,
                            CHARACTER_SIZE,
                            machine_pos,
                            TILE_SIZE,
                            TILE_SIZE,
                        )
                    })
                    .map(|(_, machine)| (machine.kind, machine.kind.product()));
                let Some((machine, product)) = product else {
                    return false;
                };
                let mut query = self.world.query::<&mut Player>();
                if let Ok(mut player) = query.single_mut(&mut self.world) {
                    player.held_item = Some(product);
                }
                self.world
                    .resource_mut::<SimEvents>()
                    .push(SimEvent::Purchased { machine, product });
                true
            }
            Some(ItemKind::Bsoda) => {
                if facing_dir == Vec2::ZERO {
                    return false;
                }
                let spawn = pos.vec() + facing_dir * SPRAY_SPAWN_OFFSET;
                let expires = self.world.resource::<TickClock>().0 + SPRAY_LIFETIME_TICKS;
                let mut query = self.world.query::<&mut Player>();
                if let Ok(mut player) = query.single_mut(&mut self.world) {
                    player.held_item = None;
                }
                self.world.spawn((
                    Position::new(spawn.x, spawn.y),
                    Spray {
                        velocity: facing_dir * SPRAY_SPEED,
                        remaining_travel: SPRAY_TRAVEL_BUDGET,
                        expires_at_tick: expires,
                    },
                ));
                self.world
                    .resource_mut::<SimEvents>()
                    .push(SimEvent::SprayFired);
                true
            }
            Some(ItemKind::EnergyBar) => {
                let mut query = self.world.query::<&mut Player>();
                let used = query
                    .single_mut(&mut self.world)
                    .map(|mut player| player.use_item())
                    .unwrap_or(false);
                if used {
                    self.world
                        .resource_mut::<SimEvents>()
                        .push(SimEvent::ItemUsed {
                            kind: ItemKind::EnergyBar,
                        });
                }
                used
            }
            None => false,
        }
    }

    /// Drain the cue events accumulated since the last call.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.world.resource_mut::<SimEvents>().0)
    }

    #[must_use]
    pub fn outcome(&self) -> Option<GameOutcome> {
        self.world.resource::<Outcome>().0
    }

    #[must_use]
    pub fn math_prompt_active(&self) -> bool {
        self.world.resource::<MathPrompt>().active
    }

    #[must_use]
    pub fn wrong_answers(&self) -> u32 {
        self.world.resource::<MathPrompt>().wrong_answers
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.world.resource::<TickClock>().0
    }

    #[must_use]
    pub fn map(&self) -> &SchoolMap {
        self.world.resource::<SchoolMap>()
    }

    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    pub const fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}
