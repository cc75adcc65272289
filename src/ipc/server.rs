//! IPC server answering registry queries.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::watch;

use crate::ipc::{IpcError, DEFAULT_SOCKET_PATH};
use crate::query::Dispatcher;

/// Connections with no request line for this long are closed.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// IPC server for registry queries.
///
/// The server listens on a Unix domain socket and serves each connection
/// on its own task, so an idle client never holds up another.
#[derive(Debug)]
pub struct IpcServer {
    socket_path: PathBuf,
}

impl IpcServer {
    /// Creates a new IPC server with a custom socket path.
    #[must_use]
    pub fn new<P: AsRef<Path>>(socket_path: P) -> Self {
        Self {
            socket_path: socket_path.as_ref().to_path_buf(),
        }
    }

    /// Creates a new IPC server with the default socket path.
    #[must_use]
    pub fn with_default_path() -> Self {
        Self::new(DEFAULT_SOCKET_PATH)
    }

    /// Returns the socket path.
    #[must_use]
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Starts serving queries with the given dispatcher.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the socket.
    pub fn start(&self, dispatcher: Arc<Dispatcher>) -> Result<ServerHandle, IpcError> {
        // Remove a stale socket left by a previous run
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path)?;
        }

        let listener = UnixListener::bind(&self.socket_path)?;
        let socket_path = self.socket_path.clone();

        tracing::info!(path = %socket_path.display(), "IPC server started");

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;

                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            tracing::info!("IPC server shutting down");
                            break;
                        }
                    }

                    accept_result = listener.accept() => {
                        match accept_result {
                            Ok((stream, _addr)) => {
                                let dispatcher = Arc::clone(&dispatcher);
                                let shutdown_rx = shutdown_rx.clone();
                                tokio::spawn(async move {
                                    if let Err(e) =
                                        handle_connection(stream, &dispatcher, shutdown_rx).await
                                    {
                                        tracing::warn!(error = %e, "Connection handler error");
                                    }
                                });
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "Failed to accept connection");
                            }
                        }
                    }
                }
            }
        });

        Ok(ServerHandle {
            socket_path: self.socket_path.clone(),
            shutdown_tx,
        })
    }
}

/// Handle for a running IPC server.
///
/// When dropped, the socket file is cleaned up.
#[derive(Debug)]
pub struct ServerHandle {
    socket_path: PathBuf,
    shutdown_tx: watch::Sender<bool>,
}

impl ServerHandle {
    /// Signals the server to shut down.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Returns the socket path.
    #[must_use]
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);

        if self.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket_path) {
                tracing::warn!(
                    path = %self.socket_path.display(),
                    error = %e,
                    "Failed to remove socket file"
                );
            }
        }
    }
}

/// Answers every request line on one connection until it closes or idles out.
async fn handle_connection(
    stream: UnixStream,
    dispatcher: &Dispatcher,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Result<(), IpcError> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    loop {
        let line = tokio::select! {
            _ = shutdown_rx.changed() => return Ok(()),
            next = tokio::time::timeout(IDLE_TIMEOUT, lines.next_line()) => match next {
                Ok(line) => line?,
                Err(_) => {
                    tracing::debug!("Closing idle connection");
                    return Ok(());
                }
            },
        };
        let Some(line) = line else {
            return Ok(());
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = dispatcher.dispatch_json(line).await;

        let mut response_json = serde_json::to_string(&response)?;
        response_json.push('\n');
        writer.write_all(response_json.as_bytes()).await?;
        writer.flush().await?;
    }
}
