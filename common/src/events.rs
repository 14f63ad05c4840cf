use bevy_ecs::prelude::*;

use crate::components::{ItemKind, MachineKind};

// ============================================================================
// Simulation Events
// ============================================================================

// Gameplay cues surfaced to the host layer (UI, audio). Drained once per
// tick by the embedder; the simulation never reads them back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    /// A notebook was collected; the math prompt is now active and the
    /// simulation is frozen until `resolve_math` is called.
    NotebookCollected { total: u32 },
    DoorOpened { cell: (i32, i32) },
    DoorClosed { cell: (i32, i32) },
    /// Baldi's periodic warning cue while closing in.
    Slap,
    DetentionStarted,
    DetentionEnded,
    ItemPicked { kind: ItemKind },
    ItemUsed { kind: ItemKind },
    Purchased { machine: MachineKind, product: ItemKind },
    SprayFired,
}

#[derive(Resource, Default)]
pub struct SimEvents(pub Vec<SimEvent>);

impl SimEvents {
    pub fn push(&mut self, event: SimEvent) {
        self.0.push(event);
    }
}

// ============================================================================
// Terminal Outcomes
// ============================================================================

// Win/loss are terminal simulation outcomes, not errors: once set, further
// ticks are no-ops and the host reads the final state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    /// Seven notebooks collected and the exit reached.
    Won,
    /// Caught by an angry Baldi.
    Caught,
}

#[derive(Resource, Default)]
pub struct Outcome(pub Option<GameOutcome>);
