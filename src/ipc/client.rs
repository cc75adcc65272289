//! IPC client for querying a running registry server.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

use crate::ipc::{IpcError, DEFAULT_SOCKET_PATH};
use crate::query::Query;

/// Default timeout for IPC operations.
///
/// Searches over large trees read every file, so this is generous.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the registry's Unix domain socket.
#[derive(Debug, Clone)]
pub struct IpcClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl IpcClient {
    /// Creates a new IPC client with the default socket path.
    #[must_use]
    pub fn new() -> Self {
        Self::with_path(DEFAULT_SOCKET_PATH)
    }

    /// Creates a new IPC client with a custom socket path.
    #[must_use]
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            socket_path: path.as_ref().to_path_buf(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the timeout duration for IPC operations.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the socket path.
    #[must_use]
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Returns the timeout duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Checks if the server is running by verifying the socket file exists.
    #[must_use]
    pub fn is_server_running(&self) -> bool {
        self.socket_path.exists()
    }

    /// Sends a query and waits for the result value.
    ///
    /// Query-level failures arrive as inline error objects, not `Err`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The server is not running ([`IpcError::ServerNotRunning`])
    /// - The connection fails ([`IpcError::ConnectionFailed`])
    /// - The operation times out ([`IpcError::Timeout`])
    /// - Message serialization fails ([`IpcError::SerializationError`])
    /// - The server hangs up without answering ([`IpcError::InvalidResponse`])
    pub async fn query(&self, query: &Query) -> Result<Value, IpcError> {
        let request = serde_json::to_string(query)?;
        self.send_raw(&request).await
    }

    /// Sends one raw JSON request line and waits for the result value.
    ///
    /// # Errors
    ///
    /// Same as [`IpcClient::query`].
    pub async fn send_raw(&self, request: &str) -> Result<Value, IpcError> {
        if !self.is_server_running() {
            return Err(IpcError::ServerNotRunning);
        }

        // Timeouts are seconds, far below u64::MAX milliseconds
        #[allow(clippy::cast_possible_truncation)]
        let timeout_ms = self.timeout.as_millis() as u64;

        let result = tokio::time::timeout(self.timeout, async {
            let stream = UnixStream::connect(&self.socket_path).await?;
            let (reader, mut writer) = stream.into_split();

            // Requests are single lines
            let mut request_line = request.replace('\n', " ");
            request_line.push('\n');
            writer.write_all(request_line.as_bytes()).await?;
            writer.flush().await?;

            let mut reader = BufReader::new(reader);
            let mut response_line = String::new();
            let bytes_read = reader.read_line(&mut response_line).await?;

            if bytes_read == 0 {
                return Err(IpcError::InvalidResponse);
            }

            let response: Value = serde_json::from_str(response_line.trim())?;
            Ok(response)
        })
        .await;

        match result {
            Ok(inner) => inner,
            Err(_) => Err(IpcError::Timeout(timeout_ms)),
        }
    }
}

impl Default for IpcClient {
    fn default() -> Self {
        Self::new()
    }
}
