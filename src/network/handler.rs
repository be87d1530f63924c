use crate::config::Config;
use crate::network::{
    dispatch_packet,
    ChatObject,
    ClientBoundPacket,
    ClientConnection,
    ConnectionState,
    McVersion,
    PacketSerdeError,
    ServerBoundPacket,
    ServerPlayersObject,
    ServerStatusResponse,
};
use crate::server;
use log::{debug, error};
use std::sync::Arc;

/// The numeric protocol version the server uses.
pub const PROTOCOL_VERSION: i32 = 767;

/// Drives the given connection until the client disconnects or a fatal error occurs. Packets are
/// read and handled strictly one at a time; any failure terminates this connection only.
pub fn handle_connection(mut conn: ClientConnection, config: Arc<Config>) {
    while conn.connection_state != ConnectionState::Disconnected {
        match conn.read_packet() {
            // Client disconnected between frames
            Ok(0) => break,
            Ok(_) => {
                if let Err(e) = handle_packet(&mut conn, &config) {
                    error!("Failed to handle packet from client {}: {}", conn.id, e);
                    conn.shutdown();
                    break;
                }
            }
            Err(e) => {
                error!("Error in connection handler for client {}: {}", conn.id, e);
                conn.shutdown();
                break;
            }
        }
    }

    debug!("Client {} disconnected", conn.id);
}

fn handle_packet(conn: &mut ClientConnection, config: &Config) -> Result<(), PacketSerdeError> {
    let packet_id = conn.read_buffer.read_varint()?;
    let packet = dispatch_packet(conn.connection_state, packet_id, &mut conn.read_buffer)?;

    match packet {
        ServerBoundPacket::Handshake {
            protocol_version,
            server_address,
            server_port,
            next_state,
        } => {
            debug!(
                "Client {} handshake: version {}, address {}:{}",
                conn.id, protocol_version, server_address, server_port
            );

            match next_state {
                1 => conn.connection_state = ConnectionState::Status,
                2 => conn.connection_state = ConnectionState::Login,
                _ => return Err(PacketSerdeError::InvalidNextState(next_state)),
            }
        }

        ServerBoundPacket::StatusRequest => {
            conn.send_packet(&ClientBoundPacket::StatusResponse {
                response: server_status(config),
            })?;
        }

        ServerBoundPacket::Ping { payload } => {
            // The pong payload echoes the ping bit-for-bit, and ends the exchange
            conn.send_packet(&ClientBoundPacket::Pong { payload })?;
            conn.shutdown();
        }
    }

    Ok(())
}

fn server_status(config: &Config) -> ServerStatusResponse {
    ServerStatusResponse {
        version: McVersion {
            name: server::VERSION.to_owned(),
            protocol: PROTOCOL_VERSION,
        },
        players: ServerPlayersObject {
            max: config.max_players,
            online: 0,
        },
        description: ChatObject {
            text: config.motd.clone(),
        },
        enforce_secure_chat: config.enforce_secure_chat,
    }
}
