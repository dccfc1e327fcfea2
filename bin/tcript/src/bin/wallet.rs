//! CLI for the smart contract wallet and the token.
//!
//! Every command first connects the wallet provider (local key or signer
//! proxy) and prints the connection status. State-changing commands are
//! simulated before they are signed and submitted.

use action::{
    connect::{connect, Connection},
    execute,
    fund::Fund,
    input::parse_amount,
    token::{Approve, Transfer, TransferFrom},
    withdraw::Withdraw,
    Action,
};
use alloy_primitives::{utils::format_ether, Address};
use alloy_provider::Provider;
use balance::{monitor::BalanceMonitor, Monitor, SupplyQuery};
use clap::{Parser, Subcommand};
use client::Session;
use tcript::{
    check_native_balance, check_token_balance,
    config::Config,
    metrics::{install_prometheus_exporter, Metrics},
    WalletSource,
};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "tcript-wallet")]
#[command(about = "Fund, withdraw and move tokens through the connected wallet")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Private key for signing transactions (hex string, with or without 0x prefix)
    #[arg(short = 'k', long, env = "PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Signer proxy url, used instead of a private key
    #[arg(long, env = "SIGNER_URL")]
    signer_url: Option<String>,

    /// Account the signer proxy signs for
    #[arg(long, env = "SIGNER_ADDRESS")]
    signer_address: Option<Address>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Connect the wallet provider and print the status
    Connect,

    /// Send ETH to the wallet contract
    Fund {
        /// Amount in ETH, e.g. 0.05
        #[arg(long)]
        amount: String,
    },

    /// Withdraw the wallet contract balance
    Withdraw,

    /// Native balance of the wallet contract
    Balance,

    /// Approve a spender on the token
    Approve {
        #[arg(long)]
        spender: Address,
        #[arg(long)]
        amount: String,
    },

    /// Transfer tokens from the connected account
    Transfer {
        #[arg(long)]
        recipient: Address,
        #[arg(long)]
        amount: String,
    },

    /// Transfer tokens on behalf of another account
    TransferFrom {
        #[arg(long)]
        sender: Address,
        #[arg(long)]
        recipient: Address,
        #[arg(long)]
        amount: String,
    },

    /// Allowance granted to a spender
    Allowance {
        #[arg(long)]
        spender: Address,
        /// Defaults to the connected account
        #[arg(long)]
        owner: Option<Address>,
    },

    /// Token balance of an address
    TokenBalance {
        /// Defaults to the connected account
        #[arg(long)]
        address: Option<Address>,
    },

    /// Token total supply and wallet supply
    Supply,

    /// Submit an address to the claim endpoint
    Interact {
        /// Defaults to the connected account
        #[arg(long)]
        address: Option<Address>,
    },
}

impl Command {
    const fn name(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Fund { .. } => "fund",
            Self::Withdraw => "withdraw",
            Self::Balance => "balance",
            Self::Approve { .. } => "approve",
            Self::Transfer { .. } => "transfer",
            Self::TransferFrom { .. } => "transfer-from",
            Self::Allowance { .. } => "allowance",
            Self::TokenBalance { .. } => "token-balance",
            Self::Supply => "supply",
            Self::Interact { .. } => "interact",
        }
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_file(&cli.config)?;
    let network = config.network_config();

    info!("Loaded config:");
    info!("  Network: {:?}", config.network);
    info!("  RPC URL: {}", config.rpc_url());
    info!("  Wallet contract: {:?}", config.wallet_contract);
    info!("  Token contract: {:?}", config.token_contract);

    if let Some(addr) = config.metrics_addr {
        install_prometheus_exporter(addr)?;
    }
    let metrics = Metrics::new();

    let provider = client::create_provider(config.rpc_url())?;
    let source = WalletSource::from_options(cli.private_key, cli.signer_url, cli.signer_address)?;
    let wallet = source
        .map(|source| source.into_wallet(provider.clone(), network.chain.chain_id))
        .transpose()?;

    let connection = connect(provider.clone(), wallet).await?;
    println!("{}", connection.status());

    let session = match connection {
        Connection::Connected(session) => session,
        Connection::MissingWallet => {
            warn!("Set PRIVATE_KEY or SIGNER_URL to act on the wallet");
            return Ok(());
        }
    };
    info!(account = %session.account(), chain_id = session.chain_id(), "Wallet connected");

    let name = cli.command.name();
    let explorer = network.network_type.explorer_url();

    match cli.command {
        Command::Connect => {
            println!("Account: {}", session.account());
        }
        Command::Fund { amount } => {
            let action = Fund {
                wallet: network.wallet_contract()?,
                amount: parse_amount(&amount)?,
            };
            run(&session, &action, name, explorer, &metrics).await?;
        }
        Command::Withdraw => {
            let action = Withdraw {
                wallet: network.wallet_contract()?,
            };
            run(&session, &action, name, explorer, &metrics).await?;
        }
        Command::Balance => {
            let monitor = BalanceMonitor::new(provider);
            let balance = check_native_balance(&monitor, network.wallet_contract()?).await?;
            println!("Contract balance: {} ETH", format_ether(balance.amount));
        }
        Command::Approve { spender, amount } => {
            let action = Approve {
                token: network.token_contract()?,
                spender,
                amount: parse_amount(&amount)?,
            };
            run(&session, &action, name, explorer, &metrics).await?;
        }
        Command::Transfer { recipient, amount } => {
            let action = Transfer {
                token: network.token_contract()?,
                recipient,
                amount: parse_amount(&amount)?,
            };
            run(&session, &action, name, explorer, &metrics).await?;
        }
        Command::TransferFrom {
            sender,
            recipient,
            amount,
        } => {
            let action = TransferFrom {
                token: network.token_contract()?,
                sender,
                recipient,
                amount: parse_amount(&amount)?,
            };
            run(&session, &action, name, explorer, &metrics).await?;
        }
        Command::Allowance { spender, owner } => {
            let monitor = BalanceMonitor::new(provider);
            let owner = owner.unwrap_or_else(|| session.account());
            let allowance = monitor
                .query_allowance(network.token_contract()?, owner, spender)
                .await?;
            println!(
                "Allowance of {} for {}: {}",
                allowance.owner,
                allowance.spender,
                format_ether(allowance.amount)
            );
        }
        Command::TokenBalance { address } => {
            let monitor = BalanceMonitor::new(provider);
            let holder = address.unwrap_or_else(|| session.account());
            let balance = check_token_balance(&monitor, network.token_contract()?, holder).await?;
            println!("Token balance of {}: {}", holder, format_ether(balance.amount));
        }
        Command::Supply => {
            let monitor = BalanceMonitor::new(provider);
            let total = monitor
                .query_supply(SupplyQuery::TokenTotalSupply {
                    token: network.token_contract()?,
                })
                .await?;
            let wallet = monitor
                .query_supply(SupplyQuery::WalletSupply {
                    wallet: network.wallet_contract()?,
                })
                .await?;
            println!("Token total supply: {}", format_ether(total));
            println!("Wallet supply: {}", format_ether(wallet));
        }
        Command::Interact { address } => {
            let url = config
                .interact_url
                .as_deref()
                .ok_or_else(|| eyre::eyre!("interact_url is not configured"))?;
            let address = address.unwrap_or_else(|| session.account());
            let response = client::submit_interact(&reqwest::Client::new(), url, address).await?;
            println!("{}", response.message);
        }
    }

    Ok(())
}

/// Simulate, sign and submit `action`, recording the outcome.
async fn run<P, A>(
    session: &Session<P>,
    action: &A,
    name: &str,
    explorer: &str,
    metrics: &Metrics,
) -> eyre::Result<()>
where
    P: Provider + Clone,
    A: Action,
{
    match execute(session, action).await {
        Ok(submitted) => {
            metrics.record_submitted(name);
            println!("Transaction: {}/tx/{}", explorer, submitted.tx_hash);
            Ok(())
        }
        Err(e) => {
            metrics.record_action_failure(name);
            Err(e.into())
        }
    }
}
