use action::input::parse_amount;
use clap::{Parser, Subcommand};
use indexer::{demand_index, IndexState, MsctState, TransferIngestor};
use std::time::Instant;
use tcript::{
    circulating_supply,
    config::Config,
    current_day,
    metrics::{install_prometheus_exporter, Metrics},
    publish_index_metrics, summarize,
};
use tokio::time;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "tcript-indexer")]
#[command(about = "Index token transfers into holder and daily statistics")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Follow the chain and index new transfers
    Run {
        /// Index up to the current head once and exit
        #[arg(long)]
        once: bool,
    },

    /// Print the indexed statistics from the state file
    Stats,

    /// Compute the weekly demand index and move the adaptive threshold
    Demand {
        /// Circulating supply in tokens, defaults to the latest indexed wallet supply
        #[arg(long)]
        supply: Option<String>,
    },
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = Config::from_file(&cli.config)?;

    match cli.command {
        Command::Run { once } => run(&config, once).await,
        Command::Stats => {
            let state = IndexState::load(&config.state_path)?;
            println!("{}", serde_json::to_string_pretty(&summarize(&state))?);
            Ok(())
        }
        Command::Demand { supply } => demand(&config, supply.as_deref()),
    }
}

fn demand(config: &Config, supply: Option<&str>) -> eyre::Result<()> {
    let state = IndexState::load(&config.state_path)?;
    let supply = supply.map(parse_amount).transpose()?;
    let supply = circulating_supply(&state, supply)?;
    let today = current_day()?;

    let Some(index) = demand_index(&state.store, today, supply, &config.demand) else {
        println!("No change to supply");
        return Ok(());
    };

    let mut msct = MsctState::load(&config.msct_path)?;
    let report = msct.step(index, &config.demand);
    msct.save(&config.msct_path)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn run(config: &Config, once: bool) -> eyre::Result<()> {
    info!("Starting indexer");

    let network = config.network_config();
    let token = network.token_contract()?;

    info!("Loaded config:");
    info!("  Network: {:?}", config.network);
    info!("  RPC URL: {}", config.rpc_url());
    info!("  Token: {}", token);
    info!("  State file: {}", config.state_path.display());
    info!("  Start block: {}", config.start_block);

    if let Some(addr) = config.metrics_addr {
        install_prometheus_exporter(addr)?;
        info!(%addr, "Prometheus exporter listening");
    }
    let metrics = Metrics::new();

    let provider = client::create_provider(config.rpc_url())?;
    let mut ingestor = TransferIngestor::new(provider, token).with_chunk_size(config.chunk_size);
    if let Ok(wallet) = network.wallet_contract() {
        info!("  Wallet: {}", wallet);
        ingestor = ingestor.with_wallet(wallet);
    }

    let mut state = IndexState::load(&config.state_path)?;
    publish_index_metrics(&metrics, &summarize(&state));

    let mut interval = time::interval(config.poll_interval());

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                break;
            }
        }

        let started = Instant::now();
        let result = tokio::select! {
            result = ingestor.sync(&mut state, config.start_block) => result,
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested during sync");
                break;
            }
        };

        // Chunks applied before a failure are kept
        if let Err(e) = state.save(&config.state_path) {
            error!(error = %e, "Failed to save state");
        }

        let success = match result {
            Ok(Some(report)) => {
                metrics.record_transfers(report.transfers);
                metrics.record_supply_events(report.supply_events);
                info!(
                    from = report.from_block,
                    to = report.to_block,
                    transfers = report.transfers,
                    supply_events = report.supply_events,
                    holders = report.holder_count,
                    "Indexed"
                );
                true
            }
            Ok(None) => {
                info!("Up to date");
                true
            }
            Err(e) => {
                error!(error = %e, "Indexing cycle failed");
                false
            }
        };

        metrics.record_cycle(success, started.elapsed());
        publish_index_metrics(&metrics, &summarize(&state));

        if once {
            if !success {
                eyre::bail!("Indexing cycle failed");
            }
            break;
        }
    }

    state.save(&config.state_path)?;
    info!(last_block = ?state.last_block, "Indexer stopped");

    Ok(())
}
