//! Trusted header gate server.
//!
//! ```text
//!   client ──▶ listener (plain | TLS, client_auth)
//!                 │  ConnectionContext per connection
//!                 ▼
//!            TrustedHeadersLayer ──▶ echo stage
//!                 ▲
//!   config file ──┘ (host blacklist hot reload)
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use trusted_headers::config::watcher::{run_reloads, ConfigWatcher};
use trusted_headers::config::{load_config, GateConfig};
use trusted_headers::gate::{RequestGate, SharedBlacklist};
use trusted_headers::observability::{logging, metrics};
use trusted_headers::HttpServer;

#[derive(Parser)]
#[command(name = "trusted-headers")]
#[command(about = "Edge gate that strips untrusted proxy headers", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("error: {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => GateConfig::default(),
    };

    if cli.check {
        println!("configuration ok");
        return ExitCode::SUCCESS;
    }

    match run(config, cli.config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: GateConfig, config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging(&config.observability.log_level);

    tracing::info!("trusted-headers v{} starting", env!("CARGO_PKG_VERSION"));

    let allow_when = config.trusted_headers.allow_when;
    let blacklist = SharedBlacklist::new(config.trusted_headers.blacklist());

    tracing::info!(
        bind_address = %config.listener.bind_address,
        tls = config.listener.tls.is_some(),
        allow_when = %allow_when,
        blacklist_entries = config.trusted_headers.host_blacklist.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: std::net::SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }
    metrics::record_blacklist_size(blacklist.snapshot().len());

    // Keep the watcher alive for the server's lifetime.
    let _watcher = match config_path {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(&path);
            let watcher = watcher.run()?;
            tokio::spawn(run_reloads(updates, allow_when, blacklist.clone()));
            Some(watcher)
        }
        None => None,
    };

    let gate = RequestGate::new(allow_when, blacklist);
    let server = HttpServer::new(config, gate);
    server.run().await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
