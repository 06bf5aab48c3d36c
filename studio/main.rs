/// netpulse Studio
///
/// Browser front end for the network animator, served by a synchronous
/// tiny_http server. No JavaScript frameworks required.
///
/// Run with:
///   cargo run --bin studio --release
/// Then open http://127.0.0.1:7878
///
/// Pages:
///   1. Network: live diagram, click neurons to toggle them
///   2. Classifier: upload a picture to the pretend cat/dog model

mod state;
mod render;
mod routes;
mod svg;
mod handlers;
mod util;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tiny_http::Server;
use tracing::info;
use tracing_subscriber::EnvFilter;

use netpulse::{load_config, ConfigOverrides, Session};
use state::StudioState;

#[derive(Debug, Parser)]
#[command(name = "studio", about = "Serve the netpulse studio in a browser")]
struct Args {
    /// Configuration file (defaults to $NETPULSE_CONFIG or ./netpulse.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:7878
    #[arg(long)]
    addr: Option<String>,

    /// Seed for weights and the mock classifier
    #[arg(long)]
    seed: Option<u64>,

    /// Milliseconds between animation ticks
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Start from weights saved with "Download Weights"
    #[arg(long)]
    weights: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let overrides = ConfigOverrides {
        addr: args.addr,
        tick_interval_ms: args.interval_ms,
        seed: args.seed,
        weights_path: args.weights,
    };
    let config = load_config(args.config.as_deref(), &overrides).context("loading configuration")?;

    let animator = config.network.build_animator().context("building the network")?;
    let session = Session::start(animator, config.network.tick_interval())?;
    let classifier = config.classifier.build_classifier();

    let addr = config.server.addr.as_str();
    let server = Server::http(addr).map_err(|e| anyhow!("failed to bind {}: {}", addr, e))?;
    info!(%addr, layers = ?config.network.layers.layer_sizes(), "studio listening");

    let shared_state = Arc::new(Mutex::new(StudioState::new(session, classifier)));

    println!("╔══════════════════════════════════════════════╗");
    println!("║          netpulse Studio                     ║");
    println!("╠══════════════════════════════════════════════╣");
    println!("║  Open in your browser:                       ║");
    println!("║  http://{:<37}║", addr);
    println!("╠══════════════════════════════════════════════╣");
    println!("║  Pages: Network > Classifier                 ║");
    println!("╚══════════════════════════════════════════════╝");

    // Each request is dispatched on its own thread so the SSE handler
    // (which blocks for as long as the page is open) and the classifier
    // (which sleeps) do not stall other requests.
    for request in server.incoming_requests() {
        let state_clone = shared_state.clone();
        std::thread::spawn(move || {
            routes::dispatch(request, state_clone);
        });
    }
    Ok(())
}
