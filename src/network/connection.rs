use crate::network::{ClientBoundPacket, PacketBuffer, PacketSerdeError, WriteToPacket};
use log::*;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

/// The largest frame length a peer may declare: the maximum value expressible in the three
/// VarInt bytes the protocol allots to its length prefix. Anything larger is rejected before
/// the body is buffered.
pub const MAX_FRAME_LENGTH: i32 = 2097151;

/// All possible states of a client's connection to the server.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ConnectionState {
    /// The handshake state of the connection in which the client selects the next state to enter:
    /// either the `Status` state or `Login` state.
    Handshake,
    /// The client is requesting a server status ping.
    Status,
    /// The client is logging into the server.
    Login,
    /// The client has disconnected.
    Disconnected,
}

/// Manages a connection to a client, owning the underlying stream and the buffers used to frame
/// packet data in both directions.
pub struct ClientConnection {
    /// The client ID.
    pub id: usize,
    /// The raw TCP stream the client is connected with.
    pub stream: TcpStream,
    /// The packet buffer used when reading packet bytes.
    pub read_buffer: PacketBuffer,
    /// The packet buffer used when writing packet data before sending it.
    write_buffer: PacketBuffer,
    /// The state of the connection.
    pub connection_state: ConnectionState,
}

impl ClientConnection {
    /// Creates a new connection wrapper around the given stream, applying the given read/write
    /// deadline to all of its I/O.
    pub fn new(
        id: usize,
        stream: TcpStream,
        timeout: Option<Duration>,
    ) -> Result<Self, PacketSerdeError> {
        stream.set_read_timeout(timeout)?;
        stream.set_write_timeout(timeout)?;

        Ok(ClientConnection {
            id,
            stream,
            read_buffer: PacketBuffer::new(4096),
            write_buffer: PacketBuffer::new(4096),
            connection_state: ConnectionState::Handshake,
        })
    }

    /// Reads the frame-length prefix from the stream one byte at a time. Returns `None` if the
    /// peer closed the stream before the first byte; an end-of-stream after that is an error.
    fn read_frame_length(&mut self) -> Result<Option<i32>, PacketSerdeError> {
        let mut result: i32 = 0;
        let mut num_read = 0;
        let mut next = [0_u8; 1];

        loop {
            if num_read == 0 {
                if self.stream.read(&mut next)? == 0 {
                    return Ok(None);
                }
            } else {
                self.stream.read_exact(&mut next)?;
            }

            result |= ((next[0] & 0x7F) as i32) << (7 * num_read);
            num_read += 1;

            if next[0] & 0x80 == 0 {
                return Ok(Some(result));
            }

            if num_read == 5 {
                return Err(PacketSerdeError::VarIntTooLarge);
            }
        }
    }

    /// Reads one length-prefixed frame from the underlying stream, blocking the current thread.
    /// The frame's bytes are placed in the read buffer with the cursor at the packet ID, and the
    /// frame length is returned. A return of zero means the client disconnected cleanly between
    /// frames; a stream that ends mid-frame is an I/O error.
    pub fn read_packet(&mut self) -> Result<usize, PacketSerdeError> {
        let length = match self.read_frame_length()? {
            Some(length) => length,
            None => {
                self.connection_state = ConnectionState::Disconnected;
                self.read_buffer.clear();
                return Ok(0);
            }
        };

        // A frame must at least contain a packet ID
        if length < 1 || length > MAX_FRAME_LENGTH {
            return Err(PacketSerdeError::InvalidFrameLength(length));
        }

        self.read_buffer.clear();
        self.read_buffer.resize(length as usize);
        self.stream.read_exact(&mut self.read_buffer[..])?;
        self.read_buffer.reset_cursor();

        Ok(length as usize)
    }

    /// Serializes the given packet and sends it to the client, prefixed by its frame length.
    pub fn send_packet(&mut self, packet: &ClientBoundPacket) -> Result<(), PacketSerdeError> {
        self.write_buffer.clear();
        packet.write_to(&mut self.write_buffer)?;

        let mut frame = PacketBuffer::new(
            PacketBuffer::varint_size(self.write_buffer.len() as i32) + self.write_buffer.len(),
        );
        frame.write_varint(self.write_buffer.len() as i32);
        frame.write_bytes(&self.write_buffer[..]);

        self.stream.write_all(&frame[..])?;
        Ok(())
    }

    /// Closes the underlying stream without sending a packet to the client beforehand.
    pub fn shutdown(&mut self) {
        self.connection_state = ConnectionState::Disconnected;

        if let Err(e) = self.stream.shutdown(Shutdown::Both) {
            error!("Failed to shutdown client connection: {}", e);
        }
    }
}
