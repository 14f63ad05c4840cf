use bevy_ecs::prelude::*;
use std::collections::BTreeMap;

use crate::constants::*;

// ============================================================================
// Tiles
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Floor,
    Wall,
    Door,
    Exit,
    Carpet,
}

// Open/close state for a door cell. Doors are traversable regardless of
// state; the state only drives rendering and the auto-close cue.
#[derive(Debug, Clone, Copy)]
pub struct DoorState {
    pub open: bool,
    pub close_at_tick: u64,
}

// ============================================================================
// School Map
// ============================================================================

/// The static tile grid plus the two pieces of mutable per-session state
/// that live on it: uncollected notebooks and door open/close state.
#[derive(Resource)]
pub struct SchoolMap {
    width: i32,
    height: i32,
    grid: Vec<Vec<Tile>>,
    notebooks: Vec<(i32, i32)>,
    doors: BTreeMap<(i32, i32), DoorState>,
}

impl SchoolMap {
    /// Build the fixed 35x25 school layout: eight carpeted classrooms,
    /// the principal's office, the cafeteria, hallway lockers, and one
    /// exit cell in the outer border.
    #[must_use]
    pub fn school() -> Self {
        let width = MAP_WIDTH;
        let height = MAP_HEIGHT;
        let mut grid = vec![vec![Tile::Floor; width as usize]; height as usize];

        // Outer border
        for x in 0..width as usize {
            grid[0][x] = Tile::Wall;
            grid[height as usize - 1][x] = Tile::Wall;
        }
        for row in grid.iter_mut() {
            row[0] = Tile::Wall;
            row[width as usize - 1] = Tile::Wall;
        }

        // Classrooms, top row
        carve_room(&mut grid, 1, 1, 6, 6, true);
        carve_room(&mut grid, 10, 1, 6, 6, true);
        carve_room(&mut grid, 18, 1, 6, 6, true);
        carve_room(&mut grid, 26, 1, 7, 6, true);

        // Classrooms, bottom row
        carve_room(&mut grid, 1, 17, 6, 6, true);
        carve_room(&mut grid, 10, 17, 6, 6, true);
        carve_room(&mut grid, 18, 17, 6, 6, true);
        carve_room(&mut grid, 26, 17, 7, 6, true);

        // Principal's office and cafeteria (no carpet)
        carve_room(&mut grid, 1, 9, 6, 6, false);
        carve_room(&mut grid, 18, 9, 14, 6, false);

        // One door per classroom, punched through the hallway-facing wall
        for x in [4, 13, 21, 29] {
            grid[6][x] = Tile::Door;
            grid[17][x] = Tile::Door;
        }
        // Special room doors
        grid[12][6] = Tile::Door; // principal's office, right wall
        grid[12][18] = Tile::Door; // cafeteria, left wall

        // Main entrance/exit in the bottom border
        grid[height as usize - 1][17] = Tile::Exit;

        // Locker obstructions along the two hallway corridors
        for y in (9..15).step_by(2) {
            for x in [9, 16] {
                if grid[y][x] == Tile::Floor {
                    grid[y][x] = Tile::Wall;
                }
            }
        }

        let notebooks = vec![
            // Top row classrooms
            (4, 3),
            (13, 3),
            (21, 3),
            (29, 3),
            // Bottom row classrooms
            (4, 20),
            (13, 20),
            (21, 20),
            // Cafeteria and principal's office
            (25, 12),
            (4, 12),
        ];

        let mut doors = BTreeMap::new();
        for (y, row) in grid.iter().enumerate() {
            for (x, tile) in row.iter().enumerate() {
                if *tile == Tile::Door {
                    doors.insert(
                        (x as i32, y as i32),
                        DoorState {
                            open: false,
                            close_at_tick: 0,
                        },
                    );
                }
            }
        }

        Self {
            width,
            height,
            grid,
            notebooks,
            doors,
        }
    }

    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    // Convert a continuous coordinate to its covering grid cell.
    #[must_use]
    pub fn cell_of(x: f32, y: f32) -> (i32, i32) {
        ((x / TILE_SIZE).floor() as i32, (y / TILE_SIZE).floor() as i32)
    }

    #[must_use]
    pub fn tile(&self, cell_x: i32, cell_y: i32) -> Option<Tile> {
        if cell_x < 0 || cell_x >= self.width || cell_y < 0 || cell_y >= self.height {
            return None;
        }
        Some(self.grid[cell_y as usize][cell_x as usize])
    }

    /// Walkability over continuous coordinates: false out of bounds or on a
    /// wall cell; every other tile kind is traversable, doors included and
    /// regardless of their open/closed state.
    #[must_use]
    pub fn is_walkable(&self, x: f32, y: f32) -> bool {
        let (cell_x, cell_y) = Self::cell_of(x, y);
        self.tile(cell_x, cell_y).is_some_and(|tile| tile != Tile::Wall)
    }

    #[must_use]
    pub fn is_exit(&self, x: f32, y: f32) -> bool {
        let (cell_x, cell_y) = Self::cell_of(x, y);
        self.tile(cell_x, cell_y) == Some(Tile::Exit)
    }

    // ========================================================================
    // Notebooks
    // ========================================================================

    #[must_use]
    pub fn has_notebook(&self, x: f32, y: f32) -> bool {
        let cell = Self::cell_of(x, y);
        self.notebooks.contains(&cell)
    }

    /// Remove every notebook at the covering cell. Idempotent; returns true
    /// if anything was removed.
    pub fn collect_notebook(&mut self, x: f32, y: f32) -> bool {
        let cell = Self::cell_of(x, y);
        let before = self.notebooks.len();
        self.notebooks.retain(|pos| *pos != cell);
        self.notebooks.len() != before
    }

    #[must_use]
    pub fn notebooks_remaining(&self) -> usize {
        self.notebooks.len()
    }

    pub fn notebook_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.notebooks.iter().copied()
    }

    // ========================================================================
    // Doors
    // ========================================================================

    /// Open the door at the covering cell (no-op on any other tile) and
    /// (re)arm its auto-close deadline, replacing any pending one. Returns
    /// true only on a closed-to-open transition so the cue fires once.
    pub fn trigger_door(&mut self, x: f32, y: f32, now: u64) -> bool {
        let cell = Self::cell_of(x, y);
        let Some(door) = self.doors.get_mut(&cell) else {
            return false;
        };
        let fresh = !door.open;
        door.open = true;
        door.close_at_tick = now + DOOR_CLOSE_DELAY_TICKS;
        fresh
    }

    /// Close every open door whose deadline has passed; returns the cells
    /// that closed this tick in ascending cell order, so a run with a given
    /// seed emits the same event sequence every time.
    pub fn close_expired_doors(&mut self, now: u64) -> Vec<(i32, i32)> {
        let mut closed = Vec::new();
        for (cell, door) in &mut self.doors {
            if door.open && now >= door.close_at_tick {
                door.open = false;
                closed.push(*cell);
            }
        }
        closed
    }

    #[must_use]
    pub fn door_state(&self, cell_x: i32, cell_y: i32) -> Option<DoorState> {
        self.doors.get(&(cell_x, cell_y)).copied()
    }
}

// Carve a wall-bounded rectangular room; classrooms get a carpet interior.
fn carve_room(grid: &mut [Vec<Tile>], start_x: usize, start_y: usize, width: usize, height: usize, carpet: bool) {
    if carpet {
        for row in grid.iter_mut().skip(start_y + 1).take(height - 2) {
            for tile in row.iter_mut().skip(start_x + 1).take(width - 2) {
                *tile = Tile::Carpet;
            }
        }
    }
    for x in start_x..start_x + width {
        grid[start_y][x] = Tile::Wall;
        grid[start_y + height - 1][x] = Tile::Wall;
    }
    for row in grid.iter_mut().skip(start_y).take(height) {
        row[start_x] = Tile::Wall;
        row[start_x + width - 1] = Tile::Wall;
    }
}

// ============================================================================
// Tests
// ============================================================================
