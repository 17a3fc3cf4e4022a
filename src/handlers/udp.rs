use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use crate::state::commands::{GameCommand, SessionCommand};
use crate::state::server_state::ServerState;

/// Thin UDP packet handler - no locks in the hot path.
/// Parses the datagram and enqueues it on the session's command queue.
pub fn handle_udp_packet(packet: Value, addr: SocketAddr, state: &Arc<ServerState>) {
    let cmd = parse_command(packet, addr);

    // Non-blocking send - drop if queue is full (prevents backpressure)
    if let Err(e) = state.submit(cmd) {
        log::debug!("Dropping packet from {}: {}", addr, e);
    }
}

/// Parse a UDP datagram into a SessionCommand.
/// `hello`/`heartbeat` register the sender; anything unparseable counts as a heartbeat.
pub fn parse_command(packet: Value, addr: SocketAddr) -> SessionCommand {
    match packet.get("type").and_then(|v| v.as_str()) {
        Some("hello") | Some("heartbeat") => SessionCommand::Heartbeat { addr },
        _ => match serde_json::from_value::<GameCommand>(packet) {
            Ok(command) => SessionCommand::Game(command),
            Err(e) => {
                log::debug!("Unparseable packet from {}: {}", addr, e);
                // Heartbeat as fallback to keep the client registered
                SessionCommand::Heartbeat { addr }
            }
        },
    }
}
