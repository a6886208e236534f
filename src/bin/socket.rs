//! echo-mcp-socket: MCP echo server on a Unix domain socket
//!
//! Listens at the given socket path, serving each connection in its own
//! task until interrupted. Exposes the `pipe_echo` tool. Any stale socket
//! file at the path is removed on startup, and the file is removed again
//! on graceful shutdown.

#[cfg(unix)]
fn main() -> std::process::ExitCode {
    unix::main()
}

#[cfg(not(unix))]
fn main() -> std::process::ExitCode {
    eprintln!("echo-mcp-socket requires a Unix platform (Unix domain sockets)");
    std::process::ExitCode::FAILURE
}

#[cfg(unix)]
mod unix {
    use std::path::PathBuf;
    use std::process::ExitCode;

    use clap::Parser;
    use tracing::{error, info, Level};
    use tracing_subscriber::EnvFilter;

    use echo_mcp::config;
    use echo_mcp::mcp::{Dispatcher, ServerInfo, SocketServer};
    use echo_mcp::tools::{PipeEchoTool, ToolRegistry};

    /// MCP echo server on a Unix domain socket.
    ///
    /// Accepts any number of concurrent client connections and serves
    /// each one independently.
    #[derive(Parser, Debug)]
    #[command(name = "echo-mcp-socket")]
    #[command(author, version, about, long_about = None)]
    struct Args {
        /// Path of the Unix domain socket to listen on
        #[arg(value_name = "SOCKET_PATH")]
        socket_path: PathBuf,

        /// Path to configuration file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
        #[arg(short, long, action = clap::ArgAction::Count)]
        verbose: u8,

        /// Decrease logging verbosity (only show errors)
        #[arg(short, long)]
        quiet: bool,
    }

    /// Determines the log level from CLI arguments.
    #[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
    fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
        if quiet {
            return Level::ERROR;
        }

        match verbose {
            0 => match config_level.to_lowercase().as_str() {
                "trace" => Level::TRACE,
                "debug" => Level::DEBUG,
                "info" => Level::INFO,
                "warn" => Level::WARN,
                "error" => Level::ERROR,
                _ => Level::WARN, // Default to warn for unknown levels
            },
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }

    /// Initialises the tracing subscriber for logging.
    fn init_tracing(level: Level) {
        let filter = EnvFilter::from_default_env().add_directive(level.into());

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    /// Entry point for the echo-mcp-socket server.
    pub fn main() -> ExitCode {
        let args = Args::parse();

        // Load configuration
        let cfg = match config::load_config(args.config.as_deref()) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Configuration error: {e}");
                return ExitCode::FAILURE;
            }
        };

        // Initialise logging
        let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
        init_tracing(log_level);

        info!(
            version = env!("CARGO_PKG_VERSION"),
            socket = %args.socket_path.display(),
            "Starting echo-mcp-socket server"
        );

        let registry = ToolRegistry::with_tool(PipeEchoTool);
        let dispatcher = Dispatcher::new(ServerInfo::new("named-pipe-mcp-server"), registry);
        let server = SocketServer::new(args.socket_path, dispatcher);

        // Run the server; connections are served on worker threads
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .expect("Failed to create Tokio runtime");

        let result = runtime.block_on(server.run());

        match result {
            Ok(()) => {
                info!("Server shut down gracefully");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!(error = %e, "Server error");
                ExitCode::FAILURE
            }
        }
    }

}
