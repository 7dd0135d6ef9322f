//! Label Registry API Server
//!
//! Usage:
//!   cargo run --bin label_api -- --port 3215
//!
//! Environment:
//!   PORT           - Server port (default: 3201, overridden by --port)
//!   HOST           - Server host (default: 0.0.0.0)
//!   BARCODE_PREFIX - Code prefix (default: KIOSCO-922-)
//!   BARCODE_DIGITS - Zero-pad width (default: 5)
//!   LABEL_MODE     - derived | stored (default: derived)
//!   API_KEY        - Require this value in the x-api-key header
//!   DATA_DIR       - Directory for db.json (default: ./data)
//!   PUBLIC_DIR     - Frontend directory (default: ./public)
//!   RUST_LOG       - Log level (default: info)

use clap::Parser;
use label_registry::{build_app, AppConfig};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Debug, Parser)]
#[command(name = "label_api", version, about = "Barcode label registry API")]
struct Cli {
    /// Listening port, overrides PORT
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?.with_port_override(cli.port);
    config.log_summary();

    let app = build_app(&config)?;
    let addr = config.socket_addr()?;

    info!("🏷️  Label Registry API starting on http://{}", addr);
    info!("");
    info!("Endpoints:");
    info!("  GET    /api/state            - Current numbering state");
    info!("  PATCH  /api/state            - Update prefix/digits/next (stored mode)");
    info!("  GET    /api/labels           - List labels");
    info!("  POST   /api/labels/generate  - Generate a batch of labels");
    info!("  PUT    /api/labels/:id       - Edit a label");
    info!("  DELETE /api/labels/:id       - Delete a label");
    info!("  DELETE /api/labels           - Delete all labels (stored mode)");
    info!("");
    info!("Press Ctrl+C for graceful shutdown");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("👋 Label Registry API shutdown complete");

    Ok(())
}
