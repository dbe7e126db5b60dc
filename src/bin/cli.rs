//! pfmap CLI Client
//!
//! Query a running lookup server, like `postmap -q`.
//!
//! ```text
//! pfmap-cli socketmap -s /tmp/postfix_socketmap user@example.com
//! pfmap-cli tcp -l localhost:10044 - < keys_list
//! ```

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use pfmap::client::{SocketmapClient, TcpMapClient};
use pfmap::config::{DEFAULT_SOCKET_PATH, DEFAULT_TCP_ADDR};
use pfmap::protocol::Reply;
use pfmap::Result;

/// pfmap CLI
#[derive(Parser, Debug)]
#[command(name = "pfmap-cli")]
#[command(about = "Query a Postfix socketmap / tcp_table server")]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Query a socketmap server on a Unix socket
    Socketmap {
        /// Domain socket file name
        #[arg(short, long, default_value = DEFAULT_SOCKET_PATH)]
        socket: PathBuf,

        /// Map name sent in front of each key
        #[arg(short = 'n', long, default_value = "get")]
        map: String,

        /// Keys to look up (`-` reads keys from stdin)
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Query a tcp_table server
    Tcp {
        /// Server address (host:port)
        #[arg(short, long, default_value = DEFAULT_TCP_ADDR)]
        listen: String,

        /// Keys to look up (`-` reads keys from stdin)
        #[arg(required = true)]
        keys: Vec<String>,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let outcome = match args.command {
        Commands::Socketmap { socket, map, keys } => {
            SocketmapClient::connect_unix(&socket, map).and_then(|mut client| {
                query_all(&expand_keys(keys)?, |key| client.query(key))
            })
        }
        Commands::Tcp { listen, keys } => TcpMapClient::connect(&listen).and_then(|mut client| {
            query_all(&expand_keys(keys)?, |key| client.query(key))
        }),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("pfmap-cli: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Replace a `-` argument with the keys read from stdin
fn expand_keys(keys: Vec<String>) -> Result<Vec<String>> {
    let mut expanded = Vec::with_capacity(keys.len());

    for key in keys {
        if key == "-" {
            for line in io::stdin().lock().lines() {
                let line = line?;
                let line = line.trim();
                if !line.is_empty() {
                    expanded.push(line.to_string());
                }
            }
        } else {
            expanded.push(key);
        }
    }

    Ok(expanded)
}

/// Print `key<TAB>value` for each hit; true when every key was found
fn query_all<F>(keys: &[String], mut query: F) -> Result<bool>
where
    F: FnMut(&str) -> Result<Reply>,
{
    let mut all_found = true;

    for key in keys {
        match query(key)? {
            Reply::Found(value) => println!("{}\t{}", key, value),
            Reply::NotFound => all_found = false,
            Reply::ClientError(message) => {
                eprintln!("{}: {}", key, message);
                all_found = false;
            }
        }
    }

    Ok(all_found)
}
