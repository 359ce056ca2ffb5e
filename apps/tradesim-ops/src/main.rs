mod output;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tradesim_application::config::{resolve_config, OPERATOR_HOST_ENV};
use tradesim_application::inspection::{
    find_trade_by_id, list_recent_trades, TradeLookup, DEFAULT_RECENT_LIMIT,
};
use tradesim_infrastructure::persistence::postgres_trades::PostgresTradeRepository;

#[derive(Parser, Debug)]
#[command(
    name = "tradesim-ops",
    version,
    about = "Operator tool for the trading system",
    arg_required_else_help = true
)]
struct Cli {
    /// TOML config file; only the `[db]` section is used.
    #[arg(long, global = true, env = "TRADESIM_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Find a trade by its ID.
    #[command(name = "find_trade")]
    FindTrade {
        #[arg(long)]
        id: i64,
    },
    /// List the most recent trades as a starting point for log triage.
    #[command(name = "investigate_failures")]
    InvestigateFailures {
        #[arg(long, default_value_t = DEFAULT_RECENT_LIMIT)]
        limit: i64,
    },
    /// Apply the trades table schema.
    Migrate {
        #[arg(long, default_value = "platform/ops/migrations/0001_create_trades.sql")]
        migrations_path: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = init_tracing().and_then(|_| run(cli)) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() -> Result<(), String> {
    let filter = std::env::var("TRADESIM_LOG").unwrap_or_else(|_| "warn".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(filter)
        .map_err(|err| format!("invalid log filter: {err}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn run(cli: Cli) -> Result<(), String> {
    let config = resolve_config(cli.config.as_deref(), OPERATOR_HOST_ENV, |name| {
        std::env::var(name).ok()
    })?;
    tracing::debug!(db = %config.db.describe(), "resolved operator connection settings");

    let mut repository = PostgresTradeRepository::connect(&config.db.connection_string())
        .map_err(|err| {
            format!(
                "could not connect to the database at {}. Is the stack running? ({err})",
                config.db.describe()
            )
        })?;

    match cli.command {
        Commands::FindTrade { id } => match find_trade_by_id(&mut repository, id)? {
            TradeLookup::Found(trade) => println!("{}", output::trade_table(&trade)),
            TradeLookup::NotFound(id) => println!("{}", output::not_found(id)),
        },
        Commands::InvestigateFailures { limit } => {
            let recent = list_recent_trades(&mut repository, limit)?;
            println!("{}", output::investigation_report(limit, &recent));
        }
        Commands::Migrate { migrations_path } => {
            migrate(&mut repository, &migrations_path)?;
            println!("Schema applied from {}", migrations_path.display());
        }
    }
    Ok(())
}

fn migrate(repository: &mut PostgresTradeRepository, migrations_path: &Path) -> Result<(), String> {
    let sql = std::fs::read_to_string(migrations_path).map_err(|err| {
        format!(
            "failed to read migrations file {}: {}",
            migrations_path.display(),
            err
        )
    })?;
    repository
        .apply_schema(&sql)
        .map_err(|err| format!("failed to apply migrations: {err}"))?;
    tracing::info!(path = %migrations_path.display(), "migrations applied");
    Ok(())
}
