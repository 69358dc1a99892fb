//! coal-blend - least-cost coal blend optimizer
//!
//! # Usage
//!
//! ```bash
//! # Run the HTTP API
//! coal-blend serve --addr 127.0.0.1:8080
//!
//! # Solve one request from a JSON file
//! coal-blend solve request.json --pretty
//!
//! # Pre-solve validation only
//! coal-blend validate request.json
//! ```
//!
//! # Environment Variables
//!
//! - `COAL_BLEND_CONFIG`: Path to a TOML config file
//! - `COAL_BLEND_CORS_ORIGINS`: Comma-separated allowed CORS origins
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use coal_blend::api::{create_app, AppState};
use coal_blend::{blend, pipeline, BlendConfig, OptimizationRequest};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "coal-blend")]
#[command(about = "Least-cost coal blend optimizer")]
#[command(version)]
struct CliArgs {
    /// Explicit config file (skips the COAL_BLEND_CONFIG / ./blend_config.toml search)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API server
    Serve {
        /// Override the server address (default from config: "0.0.0.0:8080")
        #[arg(short, long)]
        addr: Option<String>,
    },

    /// Run one optimization request and print the report as JSON
    Solve {
        /// Request file: { coal_sources, target_specs, total_required }
        request: PathBuf,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Validate a request without solving it
    Validate {
        /// Request file: { coal_sources, target_specs, total_required }
        request: PathBuf,
    },
}

// ============================================================================
// Helpers
// ============================================================================

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout is reserved for command output
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(path: Option<&Path>) -> Result<BlendConfig> {
    match path {
        Some(p) => BlendConfig::load_from_file(p)
            .with_context(|| format!("Failed to load config from {}", p.display())),
        None => Ok(BlendConfig::load()),
    }
}

fn read_request(path: &Path) -> Result<OptimizationRequest> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid request JSON in {}", path.display()))
}

// ============================================================================
// Commands
// ============================================================================

async fn serve(config: BlendConfig, addr_override: Option<String>) -> Result<()> {
    let addr_str = addr_override.unwrap_or_else(|| config.server.addr.clone());
    let addr: SocketAddr = addr_str
        .parse()
        .with_context(|| format!("Invalid server address: {addr_str}"))?;

    info!(
        timeout_secs = config.server.solve_timeout_secs,
        currency = %config.analysis.currency,
        "Starting coal-blend API"
    );

    let app = create_app(AppState::new(config));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Received Ctrl+C, shutting down");
        })
        .await
        .context("HTTP server error")?;

    info!("Shutdown complete");
    Ok(())
}

fn solve(config: &BlendConfig, path: &Path, pretty: bool) -> Result<ExitCode> {
    let request = read_request(path)?;
    let report = pipeline::run_request(&request, config).context("Blend pipeline failed")?;

    let out = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{out}");

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

fn validate(path: &Path) -> Result<ExitCode> {
    let request = read_request(path)?;
    let report = blend::validate(&request.coal_sources, &request.target())
        .context("Request failed validation")?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = CliArgs::parse();
    init_logging(args.json_logs);

    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Serve { addr } => {
            serve(config, addr).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Solve { request, pretty } => solve(&config, &request, pretty),
        Command::Validate { request } => validate(&request),
    }
}
