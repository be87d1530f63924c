mod connection;
mod handler;
mod netutil;
mod packet;

pub use connection::*;
pub use handler::*;
pub use netutil::*;
pub use packet::*;
