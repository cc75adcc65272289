//! Query transport over a Unix domain socket.
//!
//! # Protocol
//!
//! Communication uses JSON-line format:
//! - Client sends one [`Query`](crate::query::Query) as JSON + newline
//! - Server responds with the result value as JSON + newline
//!
//! A connection may carry any number of request lines. Each connection is
//! served on its own task and closed after
//! [`IDLE_TIMEOUT`](server::IDLE_TIMEOUT) without a request.
//!
//! # Example
//!
//! ```no_run
//! use svk_registry::ipc::IpcClient;
//! use svk_registry::query::Query;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = IpcClient::new();
//!
//! if client.is_server_running() {
//!     let status = client.query(&Query::Status).await?;
//!     println!("{status}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod server;
pub mod types;

pub use client::IpcClient;
pub use server::{IpcServer, ServerHandle};
pub use types::IpcError;

/// Default socket path for the registry server.
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/svk-registry.sock";
