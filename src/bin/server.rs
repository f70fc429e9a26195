//! patientdb Server Binary
//!
//! Starts the TCP server for patientdb.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use patientdb::network::Server;
use patientdb::seed::load_seed_file;
use patientdb::{Config, PatientService};
use tracing_subscriber::{fmt, EnvFilter};

/// patientdb Server
#[derive(Parser, Debug)]
#[command(name = "patientdb-server")]
#[command(about = "Concurrent patient-records server over a line protocol")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:9999")]
    listen: String,

    /// Close connections idle for this many milliseconds (0 = never)
    #[arg(short, long, default_value = "0")]
    idle_timeout_ms: u64,

    /// Longest accepted command line in bytes
    #[arg(short, long, default_value = "65536")]
    max_line_bytes: usize,

    /// JSON file of records to load before listening
    #[arg(short, long)]
    seed: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,patientdb=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("patientdb Server v{}", patientdb::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    // Build config from args
    let mut builder = Config::builder()
        .listen_addr(&args.listen)
        .idle_timeout_ms(args.idle_timeout_ms)
        .max_line_bytes(args.max_line_bytes);
    if let Some(ref seed) = args.seed {
        builder = builder.seed_file(seed);
    }
    let config = builder.build();

    let service = Arc::new(PatientService::in_memory());

    if let Some(ref path) = config.seed_file {
        match load_seed_file(path) {
            Ok(records) => {
                let report = service.seed(records);
                tracing::info!(
                    "Seeded {} patients from {} ({} skipped)",
                    report.created,
                    path.display(),
                    report.skipped
                );
            }
            Err(e) => {
                tracing::error!("Failed to load seed file: {}", e);
                std::process::exit(1);
            }
        }
    }

    let server = Server::new(config, service);

    // Ctrl+C stops the accept loop; open connections finish on their own
    let shutdown = server.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl+C, initiating shutdown...");
            shutdown.shutdown();
        }
    });

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
