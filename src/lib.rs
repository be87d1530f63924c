#![deny(rust_2018_idioms)]
#![warn(missing_docs)]

//! Implements the handshake and status phase of the game's length-prefixed wire protocol: a
//! client connects, declares the sub-protocol it wants, and in the status branch exchanges a
//! server-info query and a latency ping. The server code is launched through the separate
//! `galena_launcher` binary.

/// Defines the server configuration.
pub mod config;
/// Sets up console and file logging.
pub mod logging;
/// Contains packet definitions and connection handlers.
pub mod network;
/// Contains the listener and accept loop.
pub mod server;
