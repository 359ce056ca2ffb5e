mod logging;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::net::SocketAddr;
use std::path::PathBuf;
use tradesim_application::config::{resolve_config, SimulatorConfig, SIMULATOR_HOST_ENV};
use tradesim_application::ingestion::clock::SystemClock;
use tradesim_application::ingestion::gateway::PersistenceGateway;
use tradesim_application::ingestion::recorder::{
    OutcomeRecorder, LATENCY_BUCKETS, TRADE_PROCESSING_DURATION_SECONDS,
};
use tradesim_application::ingestion::IngestionLoop;
use tradesim_domain::services::chaos::ChaosController;
use tradesim_domain::services::generator::TradeGenerator;
use tradesim_infrastructure::chaos::MarkerFileChaosSignal;
use tradesim_infrastructure::exposition::{HistogramBuckets, MetricsSink};
use tradesim_infrastructure::persistence::postgres_trades::PostgresTradeRepository;

#[derive(Parser, Debug)]
#[command(
    name = "tradesim",
    version,
    about = "Simulated trade ingestion with injectable failures"
)]
struct Cli {
    /// TOML config file. Missing sections fall back to defaults.
    #[arg(long, env = "TRADESIM_CONFIG")]
    config: Option<PathBuf>,

    /// Prometheus exporter listen address (overrides `[metrics].listen_addr`).
    #[arg(long)]
    metrics_addr: Option<String>,

    /// Seed for trade generation, failure draws and pacing.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = load(&cli)?;

    let log_path = config.log_file_path();
    logging::init_logging(&log_path)?;
    tracing::info!(
        log_file = %log_path.display(),
        db = %config.db.describe(),
        chaos_marker = %config.chaos.marker_path.display(),
        "starting trade simulator"
    );

    let rates = config.failure_rates()?;
    let cadence = config.cadence()?;
    let metrics_addr: SocketAddr = config
        .metrics
        .listen_addr
        .parse()
        .map_err(|err| format!("invalid metrics listen addr {}: {err}", config.metrics.listen_addr))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("tradesim-metrics")
        .enable_all()
        .build()
        .map_err(|err| format!("failed to build tokio runtime: {err}"))?;
    let sink = MetricsSink::serve(
        metrics_addr,
        &[HistogramBuckets::new(
            TRADE_PROCESSING_DURATION_SECONDS,
            &LATENCY_BUCKETS,
        )],
        runtime.handle(),
    )?;
    let recorder = OutcomeRecorder::register(sink.recorder());

    let connection_string = config.db.connection_string();
    let gateway = PersistenceGateway::connect(
        || PostgresTradeRepository::connect(&connection_string),
        config.db.connect_retry(),
        &SystemClock,
    );

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let chaos = ChaosController::new(
        MarkerFileChaosSignal::new(config.chaos.marker_path.clone()),
        rates,
    );

    let mut ingest = IngestionLoop::new(
        TradeGenerator::default(),
        chaos,
        gateway,
        recorder,
        SystemClock,
        rng,
        cadence,
    );
    ingest.run()
}

fn load(cli: &Cli) -> Result<SimulatorConfig, String> {
    let mut config = resolve_config(cli.config.as_deref(), SIMULATOR_HOST_ENV, |name| {
        std::env::var(name).ok()
    })?;
    if let Some(addr) = &cli.metrics_addr {
        config.metrics.listen_addr = addr.clone();
    }
    Ok(config)
}
