//! Unix domain socket transport.
//!
//! The listener accepts connections in a loop and spawns one task per
//! connection; each task processes its own stream strictly sequentially,
//! so replies leave a connection in the order its requests arrived. The
//! handlers share nothing mutable beyond the dispatcher, which is
//! read-only after startup.
//!
//! # Framing
//!
//! Each read of up to [`RECV_CHUNK`] bytes is treated, after whitespace
//! trimming, as one complete JSON message. The peer is assumed to write
//! one message per send; a message split across reads, or two messages in
//! one read, will not reassemble. This matches existing clients of this
//! wire format and is kept for compatibility.
//!
//! # Socket file lifecycle
//!
//! A stale socket file at the bind path is removed before binding, and
//! the file is removed again on graceful shutdown.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, info, warn};

use crate::mcp::dispatch::Dispatcher;

/// Largest chunk read from a connection in one call.
pub const RECV_CHUNK: usize = 1024;

/// Removes any stale socket file at `path`, then binds a listener there.
///
/// # Errors
///
/// Returns an error if the stale file cannot be removed or the bind fails.
pub fn bind(path: &Path) -> io::Result<UnixListener> {
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    UnixListener::bind(path)
}

/// Accepts connections forever, spawning one handler task per connection.
///
/// A handler failure tears down only its own connection; the accept loop
/// and the other handlers are unaffected.
///
/// # Errors
///
/// Returns an error if the accept call itself fails.
pub async fn serve(listener: UnixListener, dispatcher: Arc<Dispatcher>) -> io::Result<()> {
    loop {
        let (stream, _addr) = listener.accept().await?;
        debug!("accepted connection");

        let dispatcher = Arc::clone(&dispatcher);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, dispatcher).await {
                warn!(error = %e, "connection handler failed");
            }
        });
    }
}

/// Processes one connection until the peer disconnects.
///
/// Chunk in, reply out, strictly sequential. A whitespace-only chunk is
/// still answered (with a parse error); only notifications are silent.
async fn handle_connection(
    mut stream: UnixStream,
    dispatcher: Arc<Dispatcher>,
) -> io::Result<()> {
    let mut buf = vec![0u8; RECV_CHUNK];

    loop {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            // Peer closed the connection
            debug!("connection closed by peer");
            return Ok(());
        }

        let chunk = String::from_utf8_lossy(&buf[..n]);
        let Some(reply) = dispatcher.dispatch_text(chunk.trim()) else {
            continue;
        };

        let mut json = serde_json::to_string(&reply)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        json.push('\n');
        stream.write_all(json.as_bytes()).await?;
    }
}

/// The socket MCP server: a bind path paired with the shared dispatcher.
pub struct SocketServer {
    path: PathBuf,
    dispatcher: Arc<Dispatcher>,
}

impl SocketServer {
    /// Creates a socket server that will listen at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, dispatcher: Dispatcher) -> Self {
        Self {
            path: path.into(),
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Binds the listener and serves until SIGINT or SIGTERM.
    ///
    /// On shutdown the listener is closed and the socket file removed.
    /// In-flight connection handlers are left to terminate naturally.
    ///
    /// # Errors
    ///
    /// Returns an error if binding fails or the accept loop fails.
    pub async fn run(self) -> io::Result<()> {
        use tokio::signal::unix::{signal, SignalKind};

        let listener = bind(&self.path)?;
        info!(path = %self.path.display(), "listening on socket");

        let mut sigint = signal(SignalKind::interrupt()).map_err(io::Error::other)?;
        let mut sigterm = signal(SignalKind::terminate()).map_err(io::Error::other)?;

        let result = tokio::select! {
            res = serve(listener, Arc::clone(&self.dispatcher)) => res,

            _ = sigint.recv() => {
                info!("Received SIGINT, initiating graceful shutdown");
                Ok(())
            }

            _ = sigterm.recv() => {
                info!("Received SIGTERM, initiating graceful shutdown");
                Ok(())
            }
        };

        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!(error = %e, path = %self.path.display(), "failed to remove socket file");
        }

        result
    }
}
