//! IPC error types.

/// Errors that can occur during IPC.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// Socket I/O failed.
    #[error("Failed to connect to registry server: {0}")]
    ConnectionFailed(#[from] std::io::Error),

    /// The server socket does not exist.
    #[error("Registry server not running (socket not found)")]
    ServerNotRunning,

    /// The operation timed out.
    #[error("IPC timeout after {0}ms")]
    Timeout(u64),

    /// Failed to serialize or deserialize a message.
    #[error("Failed to serialize message: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The server closed the connection without answering.
    #[error("Invalid response from registry server")]
    InvalidResponse,
}
