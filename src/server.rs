use crate::config::Config;
use crate::network::{handle_connection, ClientConnection};
use log::*;
use std::io;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::thread;

/// The displayed server version name.
pub const VERSION: &str = "1.21";

/// The server: a bound TCP listener and the configuration shared with every connection worker.
pub struct GalenaServer {
    config: Arc<Config>,
    listener: TcpListener,
}

impl GalenaServer {
    /// Binds a listener according to the given config. Binding port `0` selects an ephemeral
    /// port, which `local_addr` reports.
    pub fn bind(config: Config) -> io::Result<Self> {
        let listener = TcpListener::bind(format!("{}:{}", config.server_ip, config.port))?;

        Ok(GalenaServer {
            config: Arc::new(config),
            listener,
        })
    }

    /// Returns the address the listener is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until the process exits, spawning one worker thread per client. No
    /// cap is applied to the number of simultaneous workers. A failed accept is logged and the
    /// loop continues.
    pub fn run(self) {
        let mut next_id: usize = 0;

        for stream in self.listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                    continue;
                }
            };

            let id = next_id;
            next_id += 1;
            debug!("Client {} connected", id);

            match ClientConnection::new(id, stream, self.config.connection_timeout) {
                Ok(conn) => {
                    let config = Arc::clone(&self.config);
                    thread::spawn(move || handle_connection(conn, config));
                }
                Err(e) => error!("Failed to initialize connection for client {}: {}", id, e),
            }
        }
    }
}
