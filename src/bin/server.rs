//! pfmap Server Binary
//!
//! Serves a lookup table to Postfix over socketmap or tcp_table.
//!
//! ```text
//! pfmap-server socketmap -s /tmp/postfix_socketmap
//! pfmap-server tcp -l localhost:10044 -t /etc/postfix/transport.map
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args as ClapArgs, Parser, Subcommand};
use pfmap::config::{DEFAULT_SOCKET_PATH, DEFAULT_TCP_ADDR};
use pfmap::table::{ChecksumTable, FileTable};
use pfmap::{Config, Endpoint, Lookup, Protocol, Server};
use tracing_subscriber::{fmt, EnvFilter};

/// pfmap Server
#[derive(Parser, Debug)]
#[command(name = "pfmap-server")]
#[command(about = "Postfix socketmap / tcp_table lookup server")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    mode: Mode,

    #[command(flatten)]
    common: Common,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Netstring protocol on a Unix domain socket
    Socketmap {
        /// Domain socket file name
        #[arg(short, long, default_value = DEFAULT_SOCKET_PATH)]
        socket: PathBuf,
    },

    /// Line protocol on a TCP socket
    Tcp {
        /// [address]:port to listen on
        #[arg(short, long, default_value = DEFAULT_TCP_ADDR)]
        listen: String,
    },
}

#[derive(ClapArgs, Debug)]
struct Common {
    /// Enable debug logging of every mapping
    #[arg(short, long, global = true)]
    debug: bool,

    /// Table source file (`key value` per line); default is the checksum table
    #[arg(short, long, global = true)]
    table: Option<PathBuf>,

    /// Maximum concurrent connections
    #[arg(short, long, global = true, default_value = "1024")]
    max_connections: usize,

    /// Close connections idle for this long (0 = never)
    #[arg(long, global = true, default_value = "0")]
    read_timeout_ms: u64,
}

fn main() {
    let args = Args::parse();

    let (endpoint, protocol) = match args.mode {
        Mode::Socketmap { socket } => (Endpoint::Unix(socket), Protocol::Socketmap),
        Mode::Tcp { listen } => (Endpoint::Tcp(listen), Protocol::Tcp),
    };

    // Build config from args
    let config = Config::builder()
        .endpoint(endpoint)
        .protocol(protocol)
        .max_connections(args.common.max_connections)
        .read_timeout_ms(args.common.read_timeout_ms)
        .verbose(args.common.debug)
        .build();

    // Initialize tracing/logging
    let default_filter = if config.verbose {
        "info,pfmap=debug"
    } else {
        "info,pfmap=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .init();

    tracing::info!("pfmap Server v{}", pfmap::VERSION);

    // Load table
    let table: Arc<dyn Lookup> = match &args.common.table {
        Some(path) => match FileTable::open(path) {
            Ok(t) => Arc::new(t),
            Err(e) => {
                tracing::error!("fatal: {}", e);
                std::process::exit(1);
            }
        },
        None => {
            tracing::info!("No table file given, serving the checksum table");
            Arc::new(ChecksumTable::new())
        }
    };

    // Bind
    let server = match Server::bind(config, table) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("fatal: {}", e);
            std::process::exit(1);
        }
    };

    // Set up SIGINT/SIGTERM handler
    let shutdown = server.shutdown_handle();
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("Caught signal, shutting down");
        shutdown.request();
    }) {
        tracing::error!("fatal: cannot install signal handler: {}", e);
        std::process::exit(1);
    }

    // Serve
    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
