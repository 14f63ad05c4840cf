use serde::{Deserialize, Serialize};

// ============================================================================
// Wire Messages
// ============================================================================

// JSON messages, externally tagged through a `type` field with camelCase
// tags and fields. Both enums are closed: anything else on the wire is an
// unknown kind and gets ignored by the receiver.

/// Client to server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Open a fresh room and become its host.
    CreateRoom,
    /// Join an existing room by its 4-digit code.
    JoinRoom { room_code: String },
    /// Latest position of this session's own character. Unvalidated; the
    /// relay forwards it verbatim.
    PlayerUpdate { x: f32, y: f32, running: bool },
}

/// Server to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    RoomCreated {
        room_code: String,
        player_id: String,
    },
    Joined {
        room_code: String,
        player_id: String,
    },
    /// Current occupancy, sent to a session right after it enters a room.
    RoomInfo {
        room_code: String,
        count: usize,
    },
    PlayerJoined {
        player_id: String,
    },
    PlayerUpdate {
        player_id: String,
        x: f32,
        y: f32,
        running: bool,
    },
    /// A member left its room. Host reassignment is server-internal and not
    /// surfaced on the wire.
    PlayerLeft {
        player_id: String,
    },
    /// Non-fatal refusal (room full, unknown code). The connection stays up.
    Error {
        message: String,
    },
}

// ============================================================================
// Tests
// ============================================================================
