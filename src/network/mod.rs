//! Network Module
//!
//! TCP server and client connection handling.
//!
//! ## Architecture
//! - Single accept loop (tokio task)
//! - One lightweight task per connection
//! - Commands routed through the shared `PatientService`

mod server;
mod connection;

pub use server::{Server, ShutdownHandle};
pub use connection::{Connection, ConnectionOptions};
