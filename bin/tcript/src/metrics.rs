//! Prometheus metrics for the wallet and indexer binaries.
//!
//! All metrics are aggregated in the [`Metrics`] struct.

use ::metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::{net::SocketAddr, time::Duration};

/// Aggregated metrics.
///
/// Metric descriptions are registered with the global registry on creation.
#[derive(Debug, Clone)]
pub struct Metrics {
    _private: (),
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self::register_descriptions();
        Self { _private: () }
    }

    fn register_descriptions() {
        // Indexer cycles
        describe_counter!(
            "tcript_index_cycles_total",
            "Total number of indexer cycles executed"
        );
        describe_counter!(
            "tcript_index_cycles_failure_total",
            "Total number of failed indexer cycles"
        );
        describe_histogram!(
            "tcript_index_cycle_duration_seconds",
            "Duration of each indexer cycle in seconds"
        );
        describe_counter!(
            "tcript_transfers_indexed_total",
            "Total number of token transfers applied"
        );
        describe_counter!(
            "tcript_supply_events_indexed_total",
            "Total number of mint and burn notifications applied"
        );

        // Indexed state (gauges)
        describe_gauge!("tcript_holder_count", "Current token holder count");
        describe_gauge!("tcript_last_indexed_block", "Last fully indexed block");
        describe_gauge!(
            "tcript_latest_daily_volume",
            "Transfer volume of the most recent day bucket in whole tokens"
        );
        describe_gauge!(
            "tcript_latest_wallet_supply",
            "Wallet contract supply snapshot of the most recent day bucket in whole tokens"
        );

        // Wallet actions
        describe_counter!(
            "tcript_transactions_submitted_total",
            "Total transactions submitted by action"
        );
        describe_counter!(
            "tcript_action_failures_total",
            "Total failed actions by action"
        );
    }

    /// Record a completed indexer cycle.
    pub fn record_cycle(&self, success: bool, duration: Duration) {
        counter!("tcript_index_cycles_total").increment(1);
        histogram!("tcript_index_cycle_duration_seconds").record(duration.as_secs_f64());

        if !success {
            counter!("tcript_index_cycles_failure_total").increment(1);
        }
    }

    pub fn record_transfers(&self, count: usize) {
        counter!("tcript_transfers_indexed_total").increment(count as u64);
    }

    pub fn record_supply_events(&self, count: usize) {
        counter!("tcript_supply_events_indexed_total").increment(count as u64);
    }

    pub fn set_holder_count(&self, count: u64) {
        gauge!("tcript_holder_count").set(count as f64);
    }

    pub fn set_last_block(&self, block: u64) {
        gauge!("tcript_last_indexed_block").set(block as f64);
    }

    pub fn set_latest_daily_volume(&self, volume: f64) {
        gauge!("tcript_latest_daily_volume").set(volume);
    }

    pub fn set_latest_wallet_supply(&self, supply: f64) {
        gauge!("tcript_latest_wallet_supply").set(supply);
    }

    pub fn record_submitted(&self, action: &str) {
        counter!("tcript_transactions_submitted_total", "action" => action.to_string())
            .increment(1);
    }

    pub fn record_action_failure(&self, action: &str) {
        counter!("tcript_action_failures_total", "action" => action.to_string()).increment(1);
    }
}

/// Install the Prometheus metrics exporter and start the HTTP server.
///
/// Returns an error if the server fails to bind to `addr`.
pub fn install_prometheus_exporter(addr: SocketAddr) -> eyre::Result<()> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| eyre::eyre!("Failed to install Prometheus exporter: {}", e))?;

    Ok(())
}
