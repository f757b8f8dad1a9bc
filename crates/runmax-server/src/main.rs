//! RunMax Server
//!
//! This server provides:
//! - An upload page on `/`
//! - Bracket-list file ingestion on `/upload`, keeping the most recent records
//! - Summaries of the latest record on `/llm`, via a remote text-generation
//!   endpoint when configured and a local fallback otherwise
//! - Stored records on `/history`
//!
//! Usage:
//! ```bash
//! # With config file
//! runmax-server --config config.yaml
//!
//! # Or with environment variables
//! PORT=8080 RUNMAX_SUMMARY_ENDPOINT=http://localhost:9000/generate runmax-server
//!
//! # Run the extractor over a local file without touching the store
//! runmax-server extract lists.txt
//! ```
//!
//! Test with:
//! ```bash
//! printf '[a,a,b,b,b]\n[x,y]\n' > lists.txt
//! curl -F file=@lists.txt http://localhost:5000/upload
//! curl -X POST http://localhost:5000/llm
//! curl http://localhost:5000/history
//! ```

mod config;

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::ServerConfig;
use runmax_core::{StoreHandle, ingest::parse_records};
use runmax_egress::SummaryChain;
use runmax_ingress::AppState;
use runmax_storage::create_record_store;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const BANNER: &str = r#"
  ____              __  __
 |  _ \ _   _ _ __ |  \/  | __ ___  __
 | |_) | | | | '_ \| |\/| |/ _` \ \/ /
 |  _ <| |_| | | | | |  | | (_| |>  <
 |_| \_\\__,_|_| |_|_|  |_|\__,_/_/\_\
"#;

/// RunMax Server - longest-run extraction service
#[derive(Parser)]
#[command(name = "runmax-server", version)]
#[command(about = "Extracts the symbols owning the longest run of each uploaded list", long_about = None)]
#[command(before_help = BANNER)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to configuration file (YAML or TOML)
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "RUNMAX_CONFIG",
        global = true
    )]
    config: Option<PathBuf>,

    /// Address to bind (overrides config and environment)
    #[arg(long, value_name = "HOST", global = true)]
    host: Option<String>,

    /// Port to listen on (overrides config and environment)
    #[arg(short, long, value_name = "PORT", global = true)]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the RunMax server (default if no command specified)
    Serve,
    /// Print the extraction results for a local file as JSON
    Extract {
        /// Text file with one bracketed list per line
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };

    // Merge environment variables (they override config file)
    config.merge_env();

    // Apply CLI overrides (highest precedence)
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    config.validate()?;

    init_tracing(&config.logging.level)?;

    match cli.command {
        Some(Commands::Extract { file }) => extract(&file).await,
        Some(Commands::Serve) | None => {
            if let Some(path) = &cli.config {
                info!("Loaded configuration from: {}", path.display());
            } else {
                info!("Using default configuration");
            }
            serve(config).await
        }
    }
}

/// Install the global subscriber; logs go to stderr so `extract` output stays clean
fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|e| {
        eprintln!("Warning: Invalid log level '{}' ({}), using info", level, e);
        EnvFilter::new("info")
    });

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

/// Parse a local file and print the records it would produce
async fn extract(file: &Path) -> anyhow::Result<()> {
    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let records = parse_records(&text);
    info!("Parsed {} records from {}", records.len(), file.display());

    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    info!("Initializing RunMax v{}", env!("CARGO_PKG_VERSION"));

    tokio::fs::create_dir_all(&config.uploads.directory)
        .await
        .with_context(|| {
            format!(
                "Failed to create upload directory {}",
                config.uploads.directory.display()
            )
        })?;

    let store = StoreHandle::new(create_record_store(&config.storage));

    // Check the results file up front
    if let Err(e) = store.load().await {
        warn!("Existing results could not be loaded: {}", e);
    }

    let chain = SummaryChain::from_config(&config.summary)
        .context("Invalid summary configuration")?;
    info!("Summary strategies: {}", chain.strategy_names().join(" -> "));

    let state = AppState::new(store, Arc::new(chain), config.uploads.clone());
    let app = runmax_ingress::router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("");
    info!("RunMax listening on http://{}", addr);
    info!("   Endpoints:");
    info!("   - Upload page:  http://{}/", addr);
    info!("   - Upload:       POST http://{}/upload", addr);
    info!("   - Summary:      POST http://{}/llm", addr);
    info!("   - History:      GET  http://{}/history", addr);
    info!("   - Health check: GET  http://{}/healthz", addr);
    info!("");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_to_serve() {
        let cli = Cli::try_parse_from(["runmax-server"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.port.is_none());
    }

    #[test]
    fn test_cli_extract_with_port_flag() {
        let cli =
            Cli::try_parse_from(["runmax-server", "extract", "lists.txt", "--port", "8080"])
                .unwrap();
        assert_eq!(cli.port, Some(8080));
        match cli.command {
            Some(Commands::Extract { file }) => assert_eq!(file, PathBuf::from("lists.txt")),
            _ => panic!("expected extract command"),
        }
    }

    #[test]
    fn test_cli_rejects_invalid_port() {
        assert!(Cli::try_parse_from(["runmax-server", "--port", "99999"]).is_err());
    }
}
