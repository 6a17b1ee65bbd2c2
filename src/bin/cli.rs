//! ctstore CLI Client
//!
//! Command-line interface for interacting with a ctstore server.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use ctstore::network::Client;
use ctstore::StoreError;

/// ctstore CLI
#[derive(Parser, Debug)]
#[command(name = "ctstore-cli")]
#[command(about = "CLI for the ctstore key-value store")]
#[command(version)]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:8124")]
    server: String,

    /// Keys and values are given and printed as hex
    #[arg(long)]
    hex: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Read the value of an entry
    Lookup {
        /// The key to read
        key: String,
    },

    /// Store a new entry (fails if the key exists)
    Create {
        /// The key to create
        key: String,

        /// The value to store
        value: String,
    },

    /// Replace the value of an existing entry
    Update {
        /// The key to update
        key: String,

        /// The new value
        value: String,
    },

    /// List every stored key
    Scan,

    /// Ping the server
    Ping,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> ctstore::Result<()> {
    let mut client = Client::connect(args.server.as_str())?;

    match &args.command {
        Commands::Lookup { key } => {
            let value = client.lookup(&parse_bytes(key, args.hex)?)?;
            println!("{}", show_bytes(&value, args.hex));
        }
        Commands::Create { key, value } => {
            client.create(&parse_bytes(key, args.hex)?, &parse_bytes(value, args.hex)?)?;
            println!("OK");
        }
        Commands::Update { key, value } => {
            client.update(&parse_bytes(key, args.hex)?, &parse_bytes(value, args.hex)?)?;
            println!("OK");
        }
        Commands::Scan => {
            for key in client.scan()? {
                println!("{}", show_bytes(&key, args.hex));
            }
        }
        Commands::Ping => {
            client.ping()?;
            println!("PONG");
        }
    }

    Ok(())
}

fn parse_bytes(s: &str, as_hex: bool) -> ctstore::Result<Vec<u8>> {
    if as_hex {
        hex::decode(s).map_err(|e| StoreError::Config(format!("Invalid hex '{}': {}", s, e)))
    } else {
        Ok(s.as_bytes().to_vec())
    }
}

fn show_bytes(bytes: &[u8], as_hex: bool) -> String {
    if as_hex {
        hex::encode(bytes)
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    }
}
