//! Network Module
//!
//! TCP server exposing the device to remote callers.
//!
//! ## Architecture
//! - Single acceptor thread
//! - Worker thread pool for connections (crossbeam channel)
//! - One [`Session`] per connection owning its open handles
//! - Commands routed through the shared Device

mod server;
mod connection;
mod session;

pub use server::Server;
pub use connection::Connection;
pub use session::Session;
