//! conftree Server Binary
//!
//! Serves an in-memory configuration tree over TCP.

use clap::Parser;
use conftree::network::Server;
use conftree::store::ConfigStore;
use conftree::Config;
use tracing_subscriber::{fmt, EnvFilter};

/// conftree reference server
#[derive(Parser, Debug)]
#[command(name = "conftree-server")]
#[command(about = "Reference server for the conftree configuration protocol")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:4040")]
    listen: String,

    /// Clients served at once
    #[arg(short, long, default_value = "64")]
    max_connections: usize,

    /// Attribute to create, as NODE:KEY:TYPE=VALUE (repeatable)
    #[arg(short, long = "attr", value_name = "NODE:KEY:TYPE=VALUE")]
    attrs: Vec<String>,

    /// Start from a small demo tree
    #[arg(long)]
    demo: bool,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,conftree=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("conftree server v{}", conftree::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    let store = if args.demo {
        ConfigStore::demo()
    } else {
        ConfigStore::new()
    };

    for entry in &args.attrs {
        let seeded = ConfigStore::parse_seed(entry)
            .and_then(|(path, key, value)| store.set(&path, &key, value));
        if let Err(e) = seeded {
            tracing::error!("Invalid --attr '{}': {}", entry, e);
            std::process::exit(2);
        }
    }

    let config = Config::builder()
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .build();

    let server = match Server::new(config, store) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
