mod config;
mod net;
mod rooms;

pub use config::{configure_server, init_tracing};
pub use net::SessionToServer;
pub use rooms::RelayServer;

use anyhow::Result;
use clap::Parser;
use quinn::Endpoint;
use std::net::SocketAddr;
use std::time::Instant;
use tokio::sync::mpsc::unbounded_channel;
use tracing::info;

// ============================================================================
// CLI Argument Parsing
// ============================================================================

#[derive(Parser)]
#[command(author, version, about = "Schoolhouse chase position relay", long_about = None)]
pub struct Args {
    /// Address to bind server to
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    pub bind: String,
}

// ============================================================================
// Main Server Loop
// ============================================================================

pub async fn run_server() -> Result<()> {
    init_tracing();

    let args = Args::parse();

    let addr: SocketAddr = args.bind.parse()?;
    let server_config = configure_server()?;
    let endpoint = Endpoint::server(server_config, addr)?;
    info!("QUIC relay listening on {}", addr);

    let mut server = RelayServer::new();

    // Channel for session IO tasks to send messages to the relay
    let (to_server, mut from_sessions) = unbounded_channel::<(u32, SessionToServer)>();

    loop {
        tokio::select! {
            // Accept new connections
            Some(incoming) = endpoint.accept() => {
                server.accept_client(to_server.clone(), incoming).await;
            }

            // Process messages from sessions
            Some((id, msg)) = from_sessions.recv() => {
                match msg {
                    SessionToServer::Message(msg) => {
                        server.process_client_data(id, msg, Instant::now());
                    }
                    SessionToServer::Disconnected => {
                        server.disconnect_client(id);
                    }
                }
            }
        }
    }
}
