mod ticker;

use anyhow::Result;
use clap::Parser;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use threatglobe_core::config_loader::GlobeConfig;
use threatglobe_core::feed::{seed_events, SyntheticFeed};
use threatglobe_map::engine::MapEngine;
use threatglobe_map::headless::HeadlessSurface;
use threatglobe_map::spin::SPIN_DURATION_MS;

#[derive(Parser, Debug)]
#[command(name = "threatglobe", version, about = "Threatglobe — Live Cyber Threat Map Engine")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "threatglobe.toml")]
    config: String,

    /// Event store capacity (overrides config file)
    #[arg(long)]
    capacity: Option<usize>,

    /// Feed cadence in milliseconds (overrides config file)
    #[arg(long)]
    refresh_ms: Option<u64>,

    /// Log level (overrides config file)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Record a one-shot IOC search before the feed starts
    #[arg(long)]
    check: Option<String>,

    /// Skip the three seed threats
    #[arg(long)]
    no_seed: bool,

    /// Disable globe rotation
    #[arg(long)]
    no_spin: bool,

    /// Seconds between ticker digests (0 disables)
    #[arg(long, default_value_t = 10)]
    ticker_secs: u64,

    /// Generate a default config file and exit
    #[arg(long)]
    generate_config: bool,

    /// Dry-run: load config, wire the engine, print a report, exit
    #[arg(long)]
    dry_run: bool,

    /// Exit after this many seconds instead of waiting for Ctrl+C
    #[arg(long)]
    duration_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Generate Config ──────────────────────────────────────────────
    if cli.generate_config {
        let config = GlobeConfig::default();
        config.save(&cli.config)?;
        println!("Default configuration written to {}", cli.config);
        return Ok(());
    }

    // ── Load Config ──────────────────────────────────────────────────
    let mut config = GlobeConfig::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: {}, using defaults", e);
        GlobeConfig::default()
    });
    if let Some(capacity) = cli.capacity {
        config.store.capacity = capacity;
    }
    if let Some(refresh_ms) = cli.refresh_ms {
        config.feed.refresh_ms = refresh_ms;
    }
    if cli.no_seed {
        config.feed.seed = false;
    }
    if cli.no_spin {
        config.view.spin = false;
    }
    let log_level = cli.log_level.as_deref().unwrap_or(&config.general.log_level);

    // ── Tracing ──────────────────────────────────────────────────────
    let level = match log_level {
        "trace" => Level::TRACE, "debug" => Level::DEBUG,
        "warn" => Level::WARN, "error" => Level::ERROR, _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Threatglobe v{}", env!("CARGO_PKG_VERSION"));
    info!(
        capacity = config.store.capacity,
        refresh_ms = config.feed.refresh_ms,
        display = %config.view.display,
        spin = config.view.spin,
        "Engine configuration"
    );

    // ── Engine & Surface ─────────────────────────────────────────────
    let engine = Arc::new(MapEngine::new(&config));
    let surface = Arc::new(HeadlessSurface::new());
    engine.attach(surface.clone())?;
    surface.load_style();
    info!("Map style loaded, threat scene ready");

    if config.feed.seed {
        let seeds = seed_events();
        let count = seeds.len();
        for event in seeds.into_iter().rev() {
            engine.ingest(event);
        }
        info!(count, "Seed threats loaded");
    }
    if let Some(ioc) = &cli.check {
        engine.record_search(ioc);
    }

    // ── Dry Run ──────────────────────────────────────────────────────
    if cli.dry_run {
        println!("{}", serde_json::to_string_pretty(&engine.report())?);
        info!("Dry-run complete. Configuration valid.");
        return Ok(());
    }

    // ── Synthetic Feed ───────────────────────────────────────────────
    let feed = Arc::new(SyntheticFeed::new(config.feed.refresh_ms));
    let sink_engine = engine.clone();
    if let Err(e) = feed.start(Arc::new(move |event| sink_engine.ingest(event))) {
        warn!(error = %e, "Synthetic feed failed to start");
    }

    // ── Camera Settle Driver ─────────────────────────────────────────
    // Stands in for the backend's animation clock: each eased transition
    // settles after its duration, which is also what advances the idle spin.
    let driver_running = Arc::new(AtomicBool::new(true));
    {
        let running = driver_running.clone();
        let driver_surface = surface.clone();
        tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval(std::time::Duration::from_millis(SPIN_DURATION_MS));
            while running.load(Ordering::Relaxed) {
                ticker.tick().await;
                driver_surface.settle();
            }
        });
    }

    // ── Ticker Digest ────────────────────────────────────────────────
    if cli.ticker_secs > 0 {
        let running = driver_running.clone();
        let ticker_engine = engine.clone();
        let interval = cli.ticker_secs;
        tokio::spawn(async move {
            let mut cadence = tokio::time::interval(std::time::Duration::from_secs(interval));
            while running.load(Ordering::Relaxed) {
                cadence.tick().await;
                let visible = ticker_engine.visible_events();
                info!(visible = visible.len(), "Threat ticker");
                for line in ticker::ticker_lines(&visible, ticker::DEFAULT_TICKER_LIMIT) {
                    info!("  {}", line);
                }
            }
        });
    }

    info!("Threatglobe running. Press Ctrl+C to stop.");
    match cli.duration_secs {
        Some(secs) => {
            tokio::select! {
                _ = tokio::time::sleep(std::time::Duration::from_secs(secs)) => {
                    info!(secs, "Run duration reached");
                }
                _ = tokio::signal::ctrl_c() => {}
            }
        }
        None => {
            tokio::signal::ctrl_c().await?;
        }
    }
    info!("Shutting down Threatglobe...");

    // ── Graceful Shutdown ────────────────────────────────────────────
    feed.stop();
    info!(emitted = feed.total_emitted(), "Synthetic feed stopped");
    driver_running.store(false, Ordering::Relaxed);
    engine.detach();

    let report = engine.report();
    info!(
        retained = report.store.len,
        ingested = report.store.total_ingested,
        evicted = report.store.total_evicted,
        updates_applied = report.sync.updates_applied,
        updates_dropped = report.sync.updates_dropped,
        spin_steps = report.spin.steps_taken,
        "Shutdown complete"
    );

    Ok(())
}
