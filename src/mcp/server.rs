//! stdio server loop.
//!
//! Single-threaded and strictly in-order: one line is read, dispatched,
//! and answered before the next line is read. There is exactly one logical
//! caller on this transport, so no concurrency is needed.
//!
//! The loop ends on stdin EOF or on SIGINT/SIGTERM (Ctrl+C on Windows).

use crate::mcp::dispatch::Dispatcher;
use crate::mcp::transport::StdioTransport;

/// The stdio MCP server: a transport paired with the shared dispatcher.
pub struct StdioServer {
    transport: StdioTransport,
    dispatcher: Dispatcher,
}

impl StdioServer {
    /// Creates a stdio server around the given dispatcher.
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            transport: StdioTransport::new(),
            dispatcher,
        }
    }

    /// Runs the server main loop with graceful shutdown handling.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn run(&mut self) -> std::io::Result<()> {
        self.run_with_shutdown().await
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(unix)]
    async fn run_with_shutdown(&mut self) -> std::io::Result<()> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt()).map_err(std::io::Error::other)?;
        let mut sigterm = signal(SignalKind::terminate()).map_err(std::io::Error::other)?;

        loop {
            tokio::select! {
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT, initiating graceful shutdown");
                    return Ok(());
                }

                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, initiating graceful shutdown");
                    return Ok(());
                }

                line_result = self.transport.read_line() => {
                    if self.handle_transport_result(line_result).await? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(windows)]
    async fn run_with_shutdown(&mut self) -> std::io::Result<()> {
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    tracing::info!("Received Ctrl+C, initiating graceful shutdown");
                    return Ok(());
                }

                line_result = self.transport.read_line() => {
                    if self.handle_transport_result(line_result).await? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Handles the result from transport read.
    ///
    /// Returns `true` if the server should shut down.
    async fn handle_transport_result(
        &mut self,
        line_result: std::io::Result<Option<String>>,
    ) -> std::io::Result<bool> {
        let Some(line) = line_result? else {
            // EOF - the caller hung up
            return Ok(true);
        };

        // Blank lines produce no message; the loop continues
        if line.trim().is_empty() {
            return Ok(false);
        }

        if let Some(reply) = self.dispatcher.dispatch_text(&line) {
            self.transport.write_reply(&reply).await?;
        }

        Ok(false)
    }
}
