// ============================================================================
// Ticks
// ============================================================================

// The simulation advances one tick per rendered frame; all durations below
// are tick counts assuming the reference 60 Hz frame rate.
pub const TICKS_PER_SECOND: u64 = 60;

// ============================================================================
// Grid
// ============================================================================

pub const TILE_SIZE: f32 = 32.0; // each grid cell in distance units
pub const MAP_WIDTH: i32 = 35; // cells
pub const MAP_HEIGHT: i32 = 25; // cells

// ============================================================================
// Characters
// ============================================================================

// All characters share the same bounding box.
pub const CHARACTER_SIZE: f32 = 32.0;

// Player
pub const PLAYER_SPEED: f32 = 3.0; // distance units per tick
pub const RUN_MULTIPLIER: f32 = 1.5;
pub const STAMINA_MAX: f32 = 100.0;
pub const STAMINA_DRAIN: f32 = 0.5; // per tick while running and moving
pub const STAMINA_REGEN: f32 = 0.2; // per tick otherwise
pub const WIN_NOTEBOOKS: u32 = 7;

// Baldi
pub const BALDI_BASE_SPEED: f32 = 1.0;
pub const BALDI_SPEED_PER_NOTEBOOK: f32 = 0.2;
pub const BALDI_SPEED_PER_WRONG_ANSWER: f32 = 0.3;
pub const HEARING_COOLDOWN_TICKS: u64 = 100;
// Slap cue cadence: 900 ms base, 120 ms faster per wrong answer, 250 ms floor.
pub const SLAP_BASE_INTERVAL_TICKS: u64 = 54;
pub const SLAP_INTERVAL_STEP_TICKS: u64 = 7;
pub const SLAP_MIN_INTERVAL_TICKS: u64 = 15;

// Principal
pub const PRINCIPAL_SPEED: f32 = 2.2;
pub const PRINCIPAL_CHASE_MULTIPLIER: f32 = 1.6;
pub const PRINCIPAL_DETECTION_RADIUS: f32 = 160.0;
pub const STUCK_MOVEMENT_EPSILON: f32 = 0.25; // net movement below this counts as stuck
pub const STUCK_THRESHOLD_TICKS: u32 = 45;
pub const DETENTION_TICKS: u64 = 5 * TICKS_PER_SECOND;

// First Prize
pub const FIRST_PRIZE_SPEED: f32 = 1.2;
pub const FIRST_PRIZE_SIGHT_RADIUS: f32 = 220.0;
pub const FIRST_PRIZE_PUSH_STRENGTH: f32 = 3.0;
pub const WANDER_SPEED: f32 = 0.6;
pub const WANDER_MIN_TICKS: u64 = 72; // 1.2 s
pub const WANDER_EXTRA_TICKS: u64 = 90; // + up to 1.5 s

// ============================================================================
// Doors
// ============================================================================

pub const DOOR_CLOSE_DELAY_TICKS: u64 = 3 * TICKS_PER_SECOND;

// ============================================================================
// Spray Effect
// ============================================================================

pub const SPRAY_SPEED: f32 = 8.0; // distance units per tick
pub const SPRAY_SIZE: f32 = 20.0;
pub const SPRAY_SPAWN_OFFSET: f32 = 24.0; // in front of the player
pub const SPRAY_TRAVEL_BUDGET: f32 = 300.0; // total travel distance
pub const SPRAY_LIFETIME_TICKS: u64 = 36; // 600 ms
pub const KNOCKBACK_STRENGTH: f32 = 24.0; // per hit tick, along the velocity sign

// ============================================================================
// Relay
// ============================================================================

pub const ROOM_CAPACITY: usize = 5;
pub const ROOM_CODE_LEN: usize = 4;
pub const PLAYER_TOKEN_LEN: usize = 6;
// Position updates from one session are forwarded at most this often (20 Hz).
pub const UPDATE_FORWARD_INTERVAL_MS: u64 = 50;
