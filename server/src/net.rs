use common::net::MessageStream;
use common::protocol::{ClientMessage, ServerMessage};
use quinn::{Connection, ConnectionError};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, instrument, trace, warn};

// ============================================================================
// Session I/O Task
// ============================================================================

// Message from a session I/O task to the relay; the relay talks back by
// pushing `ServerMessage`s onto the session's send channel and signals
// shutdown by dropping it.
#[derive(Debug)]
pub enum SessionToServer {
    Message(ClientMessage),
    Disconnected,
}

// Parse failures never reach the relay task: a payload that is not JSON and
// a well-formed message of a kind we do not speak are both skipped here,
// logged apart, without dropping the connection.
fn parse_client_message(data: &[u8]) -> Option<ClientMessage> {
    let value = match serde_json::from_slice::<serde_json::Value>(data) {
        Ok(value) => value,
        Err(e) => {
            warn!("ignoring malformed payload: {}", e);
            return None;
        }
    };
    match serde_json::from_value::<ClientMessage>(value) {
        Ok(msg) => Some(msg),
        Err(e) => {
            debug!("ignoring unknown message kind: {}", e);
            None
        }
    }
}

#[instrument(skip(connection, to_server, from_server))]
pub async fn per_session_network_io_task(
    id: u32,
    connection: Connection,
    to_server: UnboundedSender<(u32, SessionToServer)>,
    mut from_server: UnboundedReceiver<ServerMessage>,
) {
    let stream = MessageStream::new(&connection);

    loop {
        tokio::select! {
            // Receive from client
            result = stream.recv_raw() => {
                match result {
                    Ok(data) => {
                        let Some(msg) = parse_client_message(&data) else {
                            continue;
                        };
                        trace!(msg = ?msg, "received message from client");
                        if let Err(e) = to_server.send((id, SessionToServer::Message(msg))) {
                            error!("error sending to relay task: {}", e);
                            break;
                        }
                    }
                    Err(e) => {
                        if let Some(conn_err) = e.downcast_ref::<ConnectionError>() {
                            match conn_err {
                                ConnectionError::ApplicationClosed { .. } => {
                                    debug!("client closed connection");
                                }
                                ConnectionError::TimedOut => {
                                    debug!("client connection timed out");
                                }
                                ConnectionError::LocallyClosed => {
                                    debug!("connection to client closed locally");
                                }
                                _ => {
                                    error!("connection error: {}", e);
                                }
                            }
                        } else {
                            error!("error receiving from client: {}", e);
                        }
                        break;
                    }
                }
            }

            // Send to client
            cmd = from_server.recv() => {
                match cmd {
                    Some(msg) => {
                        if let Err(e) = stream.send(&msg).await {
                            warn!("error sending to client: {}", e);
                            break;
                        }
                        trace!(msg = ?msg, "sent message to client");
                    }
                    None => {
                        debug!("relay dropped the session, closing");
                        connection.close(0u32.into(), b"server closing");
                        break;
                    }
                }
            }
        }
    }

    // Ensure disconnect notification is sent before task exits
    debug!("I/O task ending, sending disconnect notification");
    let _ = to_server.send((id, SessionToServer::Disconnected));
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_payload_is_skipped() {
        assert!(parse_client_message(b"{not json").is_none());
    }

    #[test]
    fn unknown_kind_is_skipped() {
        assert!(parse_client_message(br#"{"type":"teleport"}"#).is_none());
    }

    #[test]
    fn known_kind_parses() {
        let msg = parse_client_message(br#"{"type":"createRoom"}"#);
        assert_eq!(msg, Some(ClientMessage::CreateRoom));
    }
}
