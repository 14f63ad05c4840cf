use bevy_ecs::prelude::*;
use bevy_math::Vec2;

use crate::constants::*;

// ============================================================================
// Shared Components
// ============================================================================

// Position component - continuous coordinates of the entity's reference
// corner (top-left); not grid aligned.
#[derive(Debug, Clone, Copy, Component, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    // Convenience constructor from grid cell coordinates.
    #[must_use]
    pub fn at_cell(cell_x: i32, cell_y: i32) -> Self {
        Self::new(cell_x as f32 * TILE_SIZE, cell_y as f32 * TILE_SIZE)
    }

    #[must_use]
    pub fn vec(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

// Facing direction as a unit vector; updated from the latest non-zero
// displacement.
#[derive(Debug, Clone, Copy, Component)]
pub struct Facing(pub Vec2);

// ============================================================================
// Items
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Quarter,
    EnergyBar,
    Bsoda,
}

// A collectible item lying on the floor.
#[derive(Debug, Clone, Copy, Component)]
pub struct Pickup {
    pub kind: ItemKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineKind {
    Zesty,
    Bsoda,
}

impl MachineKind {
    // What a quarter buys from this machine.
    #[must_use]
    pub const fn product(self) -> ItemKind {
        match self {
            Self::Zesty => ItemKind::EnergyBar,
            Self::Bsoda => ItemKind::Bsoda,
        }
    }
}

// A static vending machine.
#[derive(Debug, Clone, Copy, Component)]
pub struct VendingMachine {
    pub kind: MachineKind,
}

// ============================================================================
// Characters
// ============================================================================

/// The player-controlled character.
#[derive(Debug, Clone, Component)]
pub struct Player {
    pub speed: f32,
    pub stamina: f32,
    pub running: bool,
    pub notebooks: u32,
    pub held_item: Option<ItemKind>,
    /// Remaining detention ticks and the exact speed to restore afterwards.
    /// While set, the speed stays zero no matter what (freeze wins).
    pub detention: Option<Detention>,
}

#[derive(Debug, Clone, Copy)]
pub struct Detention {
    pub ticks_left: u64,
    pub restore_speed: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            speed: PLAYER_SPEED,
            stamina: STAMINA_MAX,
            running: false,
            notebooks: 0,
            held_item: None,
            detention: None,
        }
    }
}

impl Player {
    /// Consume the held energy bar, restoring stamina to maximum. Any other
    /// held item is inert under this action.
    pub fn use_item(&mut self) -> bool {
        if self.held_item == Some(ItemKind::EnergyBar) {
            self.stamina = STAMINA_MAX;
            self.held_item = None;
            return true;
        }
        false
    }
}

/// The pursuer. Calm until a wrong answer angers him, permanently.
#[derive(Debug, Clone, Component)]
pub struct Baldi {
    pub angry: bool,
    /// Stale chase target, refreshed only when the hearing cooldown hits zero.
    pub last_known: Vec2,
    pub hearing_cooldown: u64,
    pub next_slap_tick: u64,
}

impl Baldi {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            angry: false,
            last_known: Vec2::ZERO,
            hearing_cooldown: 0,
            next_slap_tick: 0,
        }
    }

    // Effective chase speed; monotone in both inputs.
    #[must_use]
    pub fn speed(&self, notebooks: u32, wrong_answers: u32) -> f32 {
        BALDI_BASE_SPEED
            + BALDI_SPEED_PER_NOTEBOOK * notebooks as f32
            + BALDI_SPEED_PER_WRONG_ANSWER * wrong_answers as f32
    }
}

impl Default for Baldi {
    fn default() -> Self {
        Self::new()
    }
}

/// The patroller. Walks a cyclic waypoint route and chases running players.
#[derive(Debug, Clone, Component)]
pub struct Principal {
    pub waypoints: Vec<Vec2>,
    pub waypoint_index: usize,
    pub stuck_ticks: u32,
}

impl Principal {
    #[must_use]
    pub fn new(waypoints: Vec<Vec2>) -> Self {
        Self {
            waypoints,
            waypoint_index: 0,
            stuck_ticks: 0,
        }
    }

    pub fn advance_waypoint(&mut self) {
        self.waypoint_index = (self.waypoint_index + 1) % self.waypoints.len();
    }
}

/// The wanderer. Drifts randomly until the player comes into sight, then
/// chases and, on contact, pushes the player along a fixed direction.
#[derive(Debug, Clone, Component)]
pub struct FirstPrize {
    pub wander_dir: Vec2,
    pub reroll_at_tick: u64,
    pub push_dir: Option<Vec2>,
}

impl FirstPrize {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            wander_dir: Vec2::ZERO,
            reroll_at_tick: 0,
            push_dir: None,
        }
    }
}

impl Default for FirstPrize {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Transient Effects
// ============================================================================

// An in-flight spray cloud. Expires on wall contact, travel exhaustion, or
// its tick deadline, whichever comes first.
#[derive(Debug, Clone, Copy, Component)]
pub struct Spray {
    pub velocity: Vec2,
    pub remaining_travel: f32,
    pub expires_at_tick: u64,
}
