//! Wallet source selection and configuration parsing.

use alloy_primitives::Address;
use client::WalletProvider;
use config::{ConfigError, NetworkType};
use std::time::Duration;
use tcript::{config::Config, WalletSource};

const SIGNER: Address = Address::new([0x42; 20]);

// Anvil default account 0
const ANVIL_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

#[test]
fn test_private_key_source() {
    let source = WalletSource::from_options(Some(ANVIL_KEY.to_string()), None, None).unwrap();
    assert_eq!(source, Some(WalletSource::PrivateKey(ANVIL_KEY.to_string())));
}

#[test]
fn test_remote_source_needs_address() {
    let url = "http://localhost:9000".to_string();

    assert!(WalletSource::from_options(None, Some(url.clone()), None).is_err());

    let source = WalletSource::from_options(None, Some(url.clone()), Some(SIGNER)).unwrap();
    assert_eq!(
        source,
        Some(WalletSource::Remote {
            url,
            address: SIGNER
        })
    );
}

#[test]
fn test_conflicting_sources() {
    let result = WalletSource::from_options(
        Some(ANVIL_KEY.to_string()),
        Some("http://localhost:9000".to_string()),
        Some(SIGNER),
    );
    assert!(result.is_err());
}

#[test]
fn test_no_source_means_missing_wallet() {
    assert_eq!(WalletSource::from_options(None, None, None).unwrap(), None);
}

#[tokio::test]
async fn test_local_wallet_account() {
    let provider = client::create_provider("http://localhost:8545").unwrap();
    let wallet = WalletSource::PrivateKey(ANVIL_KEY.to_string())
        .into_wallet(provider, 300)
        .unwrap();

    let accounts = wallet.request_addresses().await.unwrap();
    let expected: Address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap();
    assert_eq!(accounts, vec![expected]);
}

#[tokio::test]
async fn test_remote_wallet_chain_id() {
    let provider = client::create_provider("http://localhost:8545").unwrap();
    let wallet = WalletSource::Remote {
        url: "http://localhost:9000".to_string(),
        address: SIGNER,
    }
    .into_wallet(provider, 324)
    .unwrap();

    assert_eq!(wallet.chain_id().await.unwrap(), 324);
    assert_eq!(wallet.request_addresses().await.unwrap(), vec![SIGNER]);
}

#[test]
fn test_config_from_toml() {
    let config = Config::parse(
        r#"
        network = "mainnet"
        wallet_contract = "0x1111111111111111111111111111111111111111"
        token_contract = "0x2222222222222222222222222222222222222222"
        state_path = "/var/lib/tcript/state.json"
        start_block = 50000
        poll_interval_secs = 12
        chunk_size = 500
        metrics_addr = "127.0.0.1:9100"
        interact_url = "http://localhost:5000/interact"
        "#,
    )
    .unwrap();

    assert_eq!(config.network, NetworkType::Mainnet);
    assert_eq!(config.rpc_url(), "https://mainnet.era.zksync.io");
    assert_eq!(config.start_block, 50_000);
    assert_eq!(config.poll_interval(), Duration::from_secs(12));
    assert_eq!(config.chunk_size, 500);
    assert_eq!(config.metrics_addr.unwrap().port(), 9100);

    let network = config.network_config();
    assert_eq!(network.chain.chain_id, 324);
    assert_eq!(network.wallet_contract().unwrap(), Address::new([0x11; 20]));
    assert_eq!(network.token_contract().unwrap(), Address::new([0x22; 20]));
}

#[test]
fn test_config_rpc_override_and_missing_contract() {
    let config = Config::parse(r#"rpc_url = "http://localhost:3050""#).unwrap();

    assert_eq!(config.rpc_url(), "http://localhost:3050");
    assert_eq!(
        config.network_config().token_contract(),
        Err(ConfigError::MissingContract("token"))
    );
}
