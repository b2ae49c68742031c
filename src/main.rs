//! keygate — authenticating reverse proxy for the OpenAI API.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                   KEYGATE                     │
//!                    │                                               │
//!   Client Request   │  ┌───────────┐   ┌────────────┐   ┌────────┐ │
//!   ─────────────────┼─▶│ admission │──▶│  security  │──▶│  http  │─┼──▶ api.openai.com
//!                    │  │   gate    │   │ credential │   │forward │ │    (HTTPS)
//!                    │  └───────────┘   │substitution│   └────────┘ │
//!                    │                  └────────────┘              │
//!   Client Response  │                                              │
//!   ◀────────────────┼── streamed back verbatim ◀───────────────────┼──── Upstream
//!                    │                                              │
//!                    │  ┌────────────────────────────────────────┐  │
//!                    │  │         Cross-Cutting Concerns          │  │
//!                    │  │  config   observability   lifecycle     │  │
//!                    │  └────────────────────────────────────────┘  │
//!                    └──────────────────────────────────────────────┘
//! ```
//!
//! Startup orchestration lives here: CLI flags, the real key from the
//! environment, the virtual key file, then bind and serve.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::net::TcpListener;

use keygate::admission::AdmissionGate;
use keygate::config::{self, GatewayConfig};
use keygate::http::HttpServer;
use keygate::lifecycle::{signals, Shutdown};
use keygate::observability::{logging, metrics};
use keygate::security::CredentialStore;

/// Environment variable holding the real OpenAI API key.
const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// Reverse proxy to the OpenAI API with virtual key substitution and a
/// global access count limit.
///
/// Set your real key in the OPENAI_API_KEY environment variable and point
/// your app's OpenAI base URL at http://<this-host>:<port>/v1.
#[derive(Parser)]
#[command(name = "keygate", version)]
struct Cli {
    /// Port number to listen on
    #[arg(long, default_value_t = 48080)]
    port: u16,

    /// Total access count limit; -1 means no limit
    #[arg(long = "access-count-limit", default_value_t = -1)]
    access_count_limit: i64,

    /// Path to the file containing virtual API keys, one per line
    #[arg(long = "virtual-keys-file", default_value = "virtual-api-keys.txt")]
    virtual_keys_file: PathBuf,

    /// Optional TOML config file; CLI flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Assemble configuration: file (if any), then CLI overrides.
    let mut config = match &cli.config {
        Some(path) => match config::load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("keygate: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => GatewayConfig::default(),
    };
    config.listener.bind_address = format!("0.0.0.0:{}", cli.port);
    config.keys.virtual_keys_file = cli.virtual_keys_file.display().to_string();
    config.admission.access_count_limit = match normalize_access_limit(cli.access_count_limit) {
        Ok(limit) => limit,
        Err(e) => {
            eprintln!("keygate: {e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init_logging(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "keygate starting");

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Fatal startup error");
            ExitCode::FAILURE
        }
    }
}

/// Map the CLI sentinel onto the internal ceiling: -1 means unlimited.
fn normalize_access_limit(raw: i64) -> Result<Option<u64>, String> {
    match raw {
        -1 => Ok(None),
        n if n >= 0 => Ok(Some(n as u64)),
        n => Err(format!(
            "--access-count-limit must be -1 (unlimited) or non-negative, got {n}"
        )),
    }
}

async fn run(config: GatewayConfig) -> Result<(), Box<dyn std::error::Error>> {
    config::validation::validate_config(&config).map_err(|errors| {
        let joined = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        format!("invalid configuration: {joined}")
    })?;

    // The real key is a hard startup requirement.
    let real_key = std::env::var(ENV_OPENAI_API_KEY).map_err(|_| {
        format!("{ENV_OPENAI_API_KEY} environment variable is not defined; set a real OpenAI API key")
    })?;

    let keys_path = PathBuf::from(&config.keys.virtual_keys_file);
    tracing::info!(path = %keys_path.display(), "Loading virtual API keys");
    let virtual_keys = config::load_virtual_keys(&keys_path)?;

    let credentials = CredentialStore::new(virtual_keys, real_key);
    let gate = AdmissionGate::new(config.admission.access_count_limit);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.host,
        virtual_keys = credentials.virtual_key_count(),
        access_count_limit = ?config.admission.access_count_limit,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::shutdown_on_signal(&shutdown).await;
    });

    let server = HttpServer::new(config, credentials, gate)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
