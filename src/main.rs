//! sqlgate - SQL over a null-terminated TCP protocol
//!
//! This is the main entry point for the sqlgate server. It parses the CLI,
//! initializes the database schema, binds the TCP listener, and handles
//! incoming connections until interrupted.

use anyhow::Context;
use sqlgate::commands::CommandHandler;
use sqlgate::connection::{handle_connection, ConnectionStats};
use sqlgate::store::Store;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpSocket};
use tokio::signal;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Listen backlog for the server socket.
const LISTEN_BACKLOG: u32 = 5;

/// Server configuration
struct Config {
    /// Host to bind to
    host: String,
    /// Port to listen on
    port: u16,
    /// SQLite database file
    db_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: sqlgate::DEFAULT_HOST.to_string(),
            port: sqlgate::DEFAULT_PORT,
            db_path: PathBuf::from(sqlgate::DEFAULT_DB_PATH),
        }
    }
}

impl Config {
    /// Parse configuration from command-line arguments.
    ///
    /// The CLI surface is a single optional positional argument: the
    /// listening port. Anything unparseable falls back to the default with
    /// a console notice; there are no flags and no subcommands.
    fn from_args() -> Self {
        let mut config = Config::default();

        if let Some(raw) = std::env::args().nth(1) {
            let raw = raw.trim().to_string();
            match raw.parse::<u16>() {
                Ok(port) => config.port = port,
                Err(_) => eprintln!(
                    "Invalid port '{}', falling back to default {}",
                    raw, config.port
                ),
            }
        }

        config
    }

    /// Returns the bind address as a string
    fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn print_banner(config: &Config) {
    println!(
        r#"
sqlgate v{} - SQL over null-terminated TCP messages
──────────────────────────────────────────────────────
Server started on {}
Database file: {}
Ready to accept connections.

Use Ctrl+C to shutdown gracefully.
"#,
        sqlgate::VERSION,
        config.bind_address(),
        config.db_path.display()
    );
}

/// Binds the server socket with SO_REUSEADDR and a fixed backlog.
fn bind_listener(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let socket = match addr {
        SocketAddr::V4(_) => TcpSocket::new_v4()?,
        SocketAddr::V6(_) => TcpSocket::new_v6()?,
    };
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    socket.listen(LISTEN_BACKLOG)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let config = Config::from_args();

    // Set up logging
    let _subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    print_banner(&config);

    // The schema must exist before the first connection is accepted; a
    // store that cannot initialize is fatal.
    let store = Store::new(&config.db_path);
    store
        .init_schema()
        .await
        .context("failed to initialize database schema")?;
    info!("Database schema ready at {}", config.db_path.display());

    let commands = CommandHandler::new(store);
    let stats = Arc::new(ConnectionStats::new());

    // Bind the TCP listener; failure here is fatal too.
    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .with_context(|| format!("invalid listen address {}", config.bind_address()))?;
    let listener = bind_listener(addr)
        .with_context(|| format!("failed to bind listener on {addr}"))?;
    info!("Listening on {}", config.bind_address());

    // Set up graceful shutdown
    let shutdown = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Shutdown signal received, stopping server...");
    };

    // Main accept loop; in-flight handlers run to their natural end.
    tokio::select! {
        _ = accept_loop(listener, commands, stats) => {}
        _ = shutdown => {}
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Main loop that accepts incoming connections.
///
/// Each accepted connection gets its own task; the loop itself never waits
/// on a handler and returns straight to accepting.
async fn accept_loop(listener: TcpListener, commands: CommandHandler, stats: Arc<ConnectionStats>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let commands = commands.clone();
                let stats = Arc::clone(&stats);

                tokio::spawn(async move {
                    handle_connection(stream, addr, commands, stats).await;
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
