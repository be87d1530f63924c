use crate::network::{ConnectionState, PacketBuffer, PacketSerdeError, WriteToPacket};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A packet sent by the client to the server.
#[derive(Debug, PartialEq, Eq)]
pub enum ServerBoundPacket {
    /// The handshake opening the connection, declaring the client's protocol version, the
    /// address and port it dialed, and the state to transition into.
    Handshake {
        /// The client's numeric protocol version.
        protocol_version: i32,
        /// The address the client used to reach the server.
        server_address: String,
        /// The port the client used to reach the server.
        server_port: u16,
        /// The requested next connection state: `1` for status, `2` for login.
        next_state: i32,
    },
    /// A request for the server's status metadata. Carries no fields.
    StatusRequest,
    /// A latency ping carrying an opaque client timestamp.
    Ping {
        /// The client's timestamp, echoed back verbatim in the pong.
        payload: i64,
    },
}

/// A packet sent by the server to the client.
#[derive(Debug)]
pub enum ClientBoundPacket {
    /// The reply to a status request.
    StatusResponse {
        /// The server metadata document, serialized to JSON on the wire.
        response: ServerStatusResponse,
    },
    /// The reply to a ping, echoing its payload.
    Pong {
        /// The timestamp from the triggering ping, unchanged.
        payload: i64,
    },
}

impl ClientBoundPacket {
    /// Returns the wire ID of this packet.
    #[inline]
    pub fn id(&self) -> i32 {
        match self {
            ClientBoundPacket::StatusResponse { .. } => 0x00,
            ClientBoundPacket::Pong { .. } => 0x01,
        }
    }
}

impl WriteToPacket for ClientBoundPacket {
    fn write_to(&self, buffer: &mut PacketBuffer) -> Result<(), PacketSerdeError> {
        buffer.write_varint(self.id());

        match self {
            ClientBoundPacket::StatusResponse { response } => response.write_to(buffer)?,
            ClientBoundPacket::Pong { payload } => buffer.write_i64(*payload),
        }

        Ok(())
    }
}

/// The server metadata document sent in response to a status request.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct ServerStatusResponse {
    /// The server's displayed and numeric versions.
    pub version: McVersion,
    /// The player counts.
    pub players: ServerPlayersObject,
    /// The server's message of the day.
    pub description: ChatObject,
    /// Whether the server requires cryptographically signed chat.
    #[serde(rename = "enforceSecureChat")]
    pub enforce_secure_chat: bool,
}

/// The version block of a status response.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct McVersion {
    /// The displayed version name.
    pub name: String,
    /// The numeric protocol version.
    pub protocol: i32,
}

/// The player-count block of a status response.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct ServerPlayersObject {
    /// The configured player cap.
    pub max: u16,
    /// The number of players currently online.
    pub online: i32,
}

/// A plain-text chat component.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct ChatObject {
    /// The text content.
    pub text: String,
}

// The status document is the protocol's one structured field: it crosses the wire as a
// length-prefixed string containing its JSON encoding.
impl WriteToPacket for ServerStatusResponse {
    fn write_to(&self, buffer: &mut PacketBuffer) -> Result<(), PacketSerdeError> {
        let json = serde_json::to_string(self)?;
        buffer.write_string(&json);
        Ok(())
    }
}

/// A function which decodes one server-bound packet variant from a frame body.
pub type PacketDecoder = fn(&mut PacketBuffer) -> Result<ServerBoundPacket, PacketSerdeError>;

static PACKET_DECODERS: Lazy<HashMap<(ConnectionState, i32), PacketDecoder>> = Lazy::new(|| {
    let mut decoders: HashMap<(ConnectionState, i32), PacketDecoder> = HashMap::new();
    decoders.insert((ConnectionState::Handshake, 0x00), read_handshake);
    decoders.insert((ConnectionState::Status, 0x00), read_status_request);
    decoders.insert((ConnectionState::Status, 0x01), read_ping);
    decoders
});

/// Looks up the decoder registered for the given state and packet ID and invokes it against the
/// given frame body. Fails with `UnimplementedState` for any packet received in the login state,
/// and with `UnknownPacket` if no decoder is registered for the pair.
pub fn dispatch_packet(
    state: ConnectionState,
    packet_id: i32,
    buffer: &mut PacketBuffer,
) -> Result<ServerBoundPacket, PacketSerdeError> {
    if state == ConnectionState::Login {
        return Err(PacketSerdeError::UnimplementedState(state));
    }

    match PACKET_DECODERS.get(&(state, packet_id)) {
        Some(decoder) => decoder(buffer),
        None => Err(PacketSerdeError::UnknownPacket(state, packet_id)),
    }
}

fn read_handshake(buffer: &mut PacketBuffer) -> Result<ServerBoundPacket, PacketSerdeError> {
    Ok(ServerBoundPacket::Handshake {
        protocol_version: buffer.read_varint()?,
        server_address: buffer.read_string()?,
        server_port: buffer.read_u16()?,
        next_state: buffer.read_varint()?,
    })
}

fn read_status_request(_buffer: &mut PacketBuffer) -> Result<ServerBoundPacket, PacketSerdeError> {
    Ok(ServerBoundPacket::StatusRequest)
}

fn read_ping(buffer: &mut PacketBuffer) -> Result<ServerBoundPacket, PacketSerdeError> {
    Ok(ServerBoundPacket::Ping {
        payload: buffer.read_i64()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handshake_body(
        protocol_version: i32,
        server_address: &str,
        server_port: u16,
        next_state: i32,
    ) -> PacketBuffer {
        let mut buffer = PacketBuffer::new(64);
        buffer.write_varint(protocol_version);
        buffer.write_string(server_address);
        buffer.write_u16(server_port);
        buffer.write_varint(next_state);
        buffer.reset_cursor();
        buffer
    }

    #[test]
    fn dispatch_decodes_handshake() {
        let mut buffer = handshake_body(767, "localhost", 25565, 1);
        let packet = dispatch_packet(ConnectionState::Handshake, 0x00, &mut buffer).unwrap();

        assert_eq!(packet, ServerBoundPacket::Handshake {
            protocol_version: 767,
            server_address: "localhost".to_owned(),
            server_port: 25565,
            next_state: 1,
        });
    }

    #[test]
    fn dispatch_decodes_status_request() {
        let mut buffer = PacketBuffer::new(0);
        let packet = dispatch_packet(ConnectionState::Status, 0x00, &mut buffer).unwrap();
        assert_eq!(packet, ServerBoundPacket::StatusRequest);
    }

    #[test]
    fn dispatch_decodes_ping() {
        let mut buffer = PacketBuffer::new(8);
        buffer.write_i64(123456789);
        buffer.reset_cursor();

        let packet = dispatch_packet(ConnectionState::Status, 0x01, &mut buffer).unwrap();
        assert_eq!(packet, ServerBoundPacket::Ping {
            payload: 123456789,
        });
    }

    #[test]
    fn dispatch_rejects_unknown_packets() {
        let mut buffer = PacketBuffer::new(0);
        assert!(matches!(
            dispatch_packet(ConnectionState::Status, 0x02, &mut buffer),
            Err(PacketSerdeError::UnknownPacket(ConnectionState::Status, 0x02))
        ));
        assert!(matches!(
            dispatch_packet(ConnectionState::Handshake, 0x01, &mut buffer),
            Err(PacketSerdeError::UnknownPacket(ConnectionState::Handshake, 0x01))
        ));
    }

    #[test]
    fn dispatch_rejects_login_state() {
        let mut buffer = PacketBuffer::new(0);
        assert!(matches!(
            dispatch_packet(ConnectionState::Login, 0x00, &mut buffer),
            Err(PacketSerdeError::UnimplementedState(ConnectionState::Login))
        ));
    }

    #[test]
    fn truncated_handshake_fails() {
        let mut buffer = PacketBuffer::new(8);
        buffer.write_varint(767);
        buffer.write_string("localhost");
        // Port and next-state missing
        buffer.reset_cursor();

        assert!(matches!(
            dispatch_packet(ConnectionState::Handshake, 0x00, &mut buffer),
            Err(PacketSerdeError::EndOfBuffer)
        ));
    }

    #[test]
    fn truncated_ping_fails() {
        let mut buffer = PacketBuffer::from(&[0u8; 4][..]);
        assert!(matches!(
            dispatch_packet(ConnectionState::Status, 0x01, &mut buffer),
            Err(PacketSerdeError::EndOfBuffer)
        ));
    }

    #[test]
    fn pong_encoding_echoes_payload() {
        let mut buffer = PacketBuffer::new(16);
        ClientBoundPacket::Pong {
            payload: 0x0102030405060708,
        }
        .write_to(&mut buffer)
        .unwrap();

        assert_eq!(&buffer[..], [
            0x01, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08
        ]);
    }

    #[test]
    fn status_response_encodes_as_json_string() {
        let response = ServerStatusResponse {
            version: McVersion {
                name: "1.21".to_owned(),
                protocol: 767,
            },
            players: ServerPlayersObject {
                max: 10,
                online: 0,
            },
            description: ChatObject {
                text: "A Galena Server".to_owned(),
            },
            enforce_secure_chat: false,
        };

        let mut buffer = PacketBuffer::new(256);
        ClientBoundPacket::StatusResponse { response }.write_to(&mut buffer).unwrap();
        buffer.reset_cursor();

        assert_eq!(buffer.read_varint().unwrap(), 0x00);
        let json = buffer.read_string().unwrap();
        let decoded: ServerStatusResponse = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded.version.protocol, 767);
        assert_eq!(decoded.players.max, 10);
        assert!(!decoded.enforce_secure_chat);
        assert!(json.contains("\"enforceSecureChat\":false"));
    }
}
