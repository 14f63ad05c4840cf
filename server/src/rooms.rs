use crate::net::{per_session_network_io_task, SessionToServer};
use common::constants::{PLAYER_TOKEN_LEN, ROOM_CAPACITY, UPDATE_FORWARD_INTERVAL_MS};
use common::protocol::{ClientMessage, ServerMessage};
use quinn::Incoming;
use rand::Rng as _;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tracing::{debug, error, instrument, warn};

// ============================================================================
// Constants
// ============================================================================

const TOKEN_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

// ============================================================================
// Relay Server
// ============================================================================

#[derive(Debug)]
struct Session {
    to_session: UnboundedSender<ServerMessage>,
    /// Public player token, assigned when the session enters a room.
    player_id: Option<String>,
    room_code: Option<String>,
    /// When this session's last position update was forwarded.
    last_forward: Option<Instant>,
}

#[derive(Debug)]
struct Room {
    /// Session ids in join order.
    members: Vec<u32>,
    host: u32,
}

/// Position relay with no game logic: rooms of up to five sessions whose
/// position updates are forwarded to the other members, unvalidated.
///
/// Business logic only, no I/O. I/O is handled by per-session tasks.
#[derive(Debug)]
pub struct RelayServer {
    /// Map of session ID to session state
    sessions: HashMap<u32, Session>,
    /// Map of room code to room state
    rooms: HashMap<String, Room>,
    /// Counter for generating unique session IDs
    next_id: u32,
}

impl RelayServer {
    // ============================================================================
    // Constructor
    // ============================================================================

    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            rooms: HashMap::new(),
            next_id: 1,
        }
    }

    // ============================================================================
    // Helper functions
    // ============================================================================

    fn advance_id(&mut self) {
        loop {
            self.next_id = self.next_id.checked_add(1).unwrap_or(1);
            if !self.sessions.contains_key(&self.next_id) {
                break;
            }
        }
    }

    fn add_session(&mut self, tx: UnboundedSender<ServerMessage>) -> u32 {
        let id = self.next_id;
        self.advance_id();
        self.sessions.insert(
            id,
            Session {
                to_session: tx,
                player_id: None,
                room_code: None,
                last_forward: None,
            },
        );
        id
    }

    /// 4-digit code in 1000..=9999, retried against codes currently in use.
    /// Codes of deleted rooms go back into the pool.
    fn generate_room_code(&self) -> String {
        let mut rng = rand::rng();
        loop {
            let code = rng.random_range(1000..10000u32).to_string();
            if !self.rooms.contains_key(&code) {
                return code;
            }
        }
    }

    fn generate_player_token() -> String {
        let mut rng = rand::rng();
        (0..PLAYER_TOKEN_LEN)
            .map(|_| char::from(TOKEN_CHARS[rng.random_range(0..TOKEN_CHARS.len())]))
            .collect()
    }

    fn send_to(&self, id: u32, msg: &ServerMessage) {
        let Some(session) = self.sessions.get(&id) else {
            return;
        };
        if let Err(e) = session.to_session.send(msg.clone()) {
            debug!("failed to send to session: {}", e);
        }
    }

    /// Send to every member of a room, except `exclude` if set.
    fn send_to_room(&self, code: &str, exclude: Option<u32>, msg: &ServerMessage) {
        let Some(room) = self.rooms.get(code) else {
            return;
        };
        for &member in &room.members {
            if Some(member) != exclude {
                self.send_to(member, msg);
            }
        }
    }

    /// Occupancy snapshot, sent only to the session that just entered.
    fn send_room_info(&self, id: u32, code: &str) {
        let Some(room) = self.rooms.get(code) else {
            return;
        };
        self.send_to(
            id,
            &ServerMessage::RoomInfo {
                room_code: code.to_owned(),
                count: room.members.len(),
            },
        );
    }

    fn send_error(&self, id: u32, message: impl Into<String>) {
        self.send_to(
            id,
            &ServerMessage::Error {
                message: message.into(),
            },
        );
    }

    fn player_id_of(&self, id: u32) -> Option<String> {
        self.sessions.get(&id).and_then(|s| s.player_id.clone())
    }

    // ============================================================================
    // Handle new client connections
    // ============================================================================

    #[instrument(skip(self, to_server, incoming))]
    pub async fn accept_client(
        &mut self,
        to_server: UnboundedSender<(u32, SessionToServer)>,
        incoming: Incoming,
    ) {
        // Await connection establishment
        let connection = match incoming.await {
            Ok(conn) => conn,
            Err(e) => {
                error!("failed to accept connection: {}", e);
                return;
            }
        };

        // Channel for sending from the relay to the new session's IO task
        let (to_session, from_server) = unbounded_channel();

        let id = self.add_session(to_session);
        debug!(id, "accepted new session");

        tokio::spawn(async move {
            per_session_network_io_task(id, connection, to_server, from_server).await;
        });
    }

    // ============================================================================
    // Handle client disconnects
    // ============================================================================

    pub fn disconnect_client(&mut self, id: u32) {
        // Don't do anything if the session has already been removed.
        let Some(session) = self.sessions.remove(&id) else {
            return;
        };
        let Some(code) = session.room_code else {
            return;
        };
        self.leave_room(id, &code, session.player_id);
    }

    fn leave_room(&mut self, id: u32, code: &str, player_id: Option<String>) {
        let Some(room) = self.rooms.get_mut(code) else {
            return;
        };
        room.members.retain(|&member| member != id);

        // Last one out deletes the room; its code becomes reusable.
        if room.members.is_empty() {
            self.rooms.remove(code);
            debug!(code, "deleted empty room");
            return;
        }

        let new_host = if room.host == id {
            let host = room.members[0];
            room.host = host;
            Some(host)
        } else {
            None
        };
        if let Some(host) = new_host {
            debug!(code, new_host = ?self.player_id_of(host), "reassigned host");
        }

        if let Some(player_id) = player_id {
            self.send_to_room(code, None, &ServerMessage::PlayerLeft { player_id });
        }
    }

    // ============================================================================
    // Process messages from clients
    // ============================================================================

    pub fn process_client_data(&mut self, id: u32, msg: ClientMessage, now: Instant) {
        if !self.sessions.contains_key(&id) {
            return;
        }
        match msg {
            ClientMessage::CreateRoom => self.handle_create_room(id),
            ClientMessage::JoinRoom { room_code } => self.handle_join_room(id, &room_code),
            ClientMessage::PlayerUpdate { x, y, running } => {
                self.handle_player_update(id, x, y, running, now);
            }
        }
    }

    #[instrument(skip(self))]
    fn handle_create_room(&mut self, id: u32) {
        if self.in_room(id) {
            self.send_error(id, "Already in a room");
            return;
        }

        let code = self.generate_room_code();
        let token = Self::generate_player_token();
        self.rooms.insert(
            code.clone(),
            Room {
                members: vec![id],
                host: id,
            },
        );
        if let Some(session) = self.sessions.get_mut(&id) {
            session.room_code = Some(code.clone());
            session.player_id = Some(token.clone());
        }
        debug!(code, "created room");

        self.send_to(
            id,
            &ServerMessage::RoomCreated {
                room_code: code.clone(),
                player_id: token,
            },
        );
        self.send_room_info(id, &code);
    }

    #[instrument(skip(self))]
    fn handle_join_room(&mut self, id: u32, code: &str) {
        if self.in_room(id) {
            self.send_error(id, "Already in a room");
            return;
        }
        let Some(room) = self.rooms.get_mut(code) else {
            self.send_error(id, format!("No room with code {code}"));
            return;
        };
        if room.members.len() >= ROOM_CAPACITY {
            self.send_error(id, format!("Room {code} is full"));
            return;
        }

        let token = Self::generate_player_token();
        room.members.push(id);
        if let Some(session) = self.sessions.get_mut(&id) {
            session.room_code = Some(code.to_owned());
            session.player_id = Some(token.clone());
        }

        self.send_to(
            id,
            &ServerMessage::Joined {
                room_code: code.to_owned(),
                player_id: token.clone(),
            },
        );
        self.send_to_room(
            code,
            Some(id),
            &ServerMessage::PlayerJoined { player_id: token },
        );
        self.send_room_info(id, code);
    }

    // Forward to the rest of the room, at most once per interval per
    // session. Excess updates are dropped, not queued.
    fn handle_player_update(&mut self, id: u32, x: f32, y: f32, running: bool, now: Instant) {
        let Some(session) = self.sessions.get_mut(&id) else {
            return;
        };
        let (Some(code), Some(player_id)) = (session.room_code.clone(), session.player_id.clone())
        else {
            warn!(id, "position update from a session not in a room");
            return;
        };

        let interval = Duration::from_millis(UPDATE_FORWARD_INTERVAL_MS);
        if session
            .last_forward
            .is_some_and(|last| now.duration_since(last) < interval)
        {
            return;
        }
        session.last_forward = Some(now);

        self.send_to_room(
            &code,
            Some(id),
            &ServerMessage::PlayerUpdate {
                player_id,
                x,
                y,
                running,
            },
        );
    }

    fn in_room(&self, id: u32) -> bool {
        self.sessions
            .get(&id)
            .is_some_and(|s| s.room_code.is_some())
    }
}

impl Default for RelayServer {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
