// Headless runner: drives one animation session in the terminal and prints
// every frame. The browser version lives in the `studio` binary:
//   cargo run --bin studio
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use netpulse::{load_config, AnimatorEvent, AnimatorSnapshot, ConfigOverrides, Session};

#[derive(Debug, Parser)]
#[command(name = "netpulse", about = "Animate a small feed-forward network in the terminal")]
struct Args {
    /// Configuration file (defaults to $NETPULSE_CONFIG or ./netpulse.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stop after this many timer ticks
    #[arg(long, default_value_t = 8)]
    ticks: usize,

    /// Seed for the weight generator
    #[arg(long)]
    seed: Option<u64>,

    /// Milliseconds between ticks
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Load weights from a JSON file written by the studio
    #[arg(long)]
    weights: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let overrides = ConfigOverrides {
        addr: None,
        tick_interval_ms: args.interval_ms,
        seed: args.seed,
        weights_path: args.weights,
    };
    let config = load_config(args.config.as_deref(), &overrides).context("loading configuration")?;

    let animator = config.network.build_animator().context("building the network")?;
    let mut session = Session::start(animator, config.network.tick_interval())?;
    let shared = session.animator();
    let events = session.with(|a| a.subscribe());

    println!("{}", render(&session.with(|a| a.snapshot())?));

    let mut ticks = 0;
    // Generous so a slow machine never cuts the run short.
    let patience = config.network.tick_interval() * 4 + Duration::from_secs(1);
    while ticks < args.ticks {
        let event = events
            .recv_timeout(patience)
            .context("animation timer stopped unexpectedly")?;
        if !matches!(event, AnimatorEvent::Tick { .. }) {
            continue;
        }
        // Holding the lock keeps the timer out, so once the queue is drained
        // the snapshot matches the last tick line printed.
        let animator = netpulse::animator::lock(&shared);
        let mut pending = Some(event);
        while let Some(event) = pending.take().or_else(|| events.try_recv().ok()) {
            if let AnimatorEvent::Tick { cursor, propagated_layer } = event {
                ticks += 1;
                print_tick(ticks, cursor, propagated_layer);
            }
        }
        let snapshot = animator.snapshot()?;
        drop(animator);
        println!("{}", render(&snapshot));
    }

    drop(session);
    Ok(())
}

fn print_tick(tick: usize, cursor: usize, propagated_layer: Option<usize>) {
    match propagated_layer {
        Some(layer) => println!("tick {tick}: layer {layer} updated, cursor {cursor}"),
        None => println!("tick {tick}: wrap, cursor {cursor}"),
    }
}

/// One line per layer, activations with two decimals.
fn render(snapshot: &AnimatorSnapshot) -> String {
    snapshot
        .activations
        .iter()
        .enumerate()
        .map(|(layer, values)| {
            let marker = if snapshot.enabled && snapshot.cursor == layer { ">" } else { " " };
            let cells: Vec<String> = values.iter().map(|v| format!("{v:.2}")).collect();
            format!("{marker} L{layer} [{}]", cells.join(" "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
