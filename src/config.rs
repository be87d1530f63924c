use std::time::Duration;

/// The server configuration. There is no config file or CLI surface at this phase of the
/// protocol; the defaults below are the single source of values for the launcher, and tests
/// construct their own instances.
#[derive(Clone, Debug)]
pub struct Config {
    /// The IP address to bind the listener to.
    pub server_ip: String,
    /// The port to bind the listener to.
    pub port: u16,
    /// The player cap reported in status responses.
    pub max_players: u16,
    /// The message of the day reported in status responses.
    pub motd: String,
    /// Whether status responses advertise that chat messages must be signed.
    pub enforce_secure_chat: bool,
    /// The read/write deadline applied to every accepted connection. `None` lets a stalled
    /// client occupy its worker indefinitely.
    pub connection_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_ip: "127.0.0.1".to_owned(),
            port: 25565,
            max_players: 10,
            motd: "A Galena Server".to_owned(),
            enforce_secure_chat: false,
            connection_timeout: Some(Duration::from_secs(30)),
        }
    }
}
