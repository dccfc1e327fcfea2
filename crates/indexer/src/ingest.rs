//! Pull token logs from a node and feed them to the handler.
//!
//! Blocks are scanned in chunks. A chunk is retried with exponential backoff,
//! except when the node rejects the range as too large: then the chunk span
//! is halved and the same start block is scanned again.

use crate::{
    handler::{handle_event, SupplyEvent, SupplyKind, TokenEvent},
    state::IndexState,
    store::Store,
    TransferEvent,
};
use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use alloy_rpc_types_eth::{BlockNumberOrTag, Filter, Log};
use alloy_sol_types::SolEvent;
use binding::{token::IERC20, wallet::ISmartWallet};
use eyre::eyre;
use std::{
    collections::{BTreeSet, HashMap},
    future::Future,
    time::Duration,
};
use tokio_retry::{strategy::ExponentialBackoff, RetryIf};
use tracing::{debug, info, warn};

/// Error fragments nodes use when a log query spans too much.
const RANGE_LIMIT_ERRORS: [&str; 4] = [
    "too many results",
    "response size exceeded",
    "query returned more than",
    "block range is too large",
];

/// Attempts after the first failed chunk scan.
const MAX_RETRIES: usize = 5;

const MAX_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Delays between chunk scan attempts: 100ms doubling per attempt, capped at
/// [`MAX_RETRY_DELAY`].
pub fn retry_strategy() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(2)
        .factor(50)
        .max_delay(MAX_RETRY_DELAY)
        .take(MAX_RETRIES)
}

/// Outcome of one sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub from_block: u64,
    pub to_block: u64,
    /// Transfer events applied
    pub transfers: usize,
    /// Mint and burn notifications applied
    pub supply_events: usize,
    /// Token holder count after the pass
    pub holder_count: u64,
}

/// Where [`sync_from`] reads the chain.
pub trait LogSource: Send + Sync {
    /// Current head block number.
    fn latest_block(&self) -> impl Future<Output = eyre::Result<u64>> + Send;

    /// Token events of `from_block..=to_block` in chain order.
    fn fetch_events(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> impl Future<Output = eyre::Result<Vec<TokenEvent>>> + Send;

    /// Current wallet contract supply, `None` when no wallet is tracked.
    fn wallet_supply(&self) -> impl Future<Output = eyre::Result<Option<U256>>> + Send;
}

/// Apply every event from `state.next_block(start_block)` up to the head of `source`.
///
/// `state.last_block` advances after each chunk, so an error leaves the
/// state consistent with the chunks already applied. Every day bucket touched
/// by the pass gets the current wallet supply as its snapshot. Returns `None`
/// when there is nothing new to index.
pub async fn sync_from<S: LogSource>(
    source: &S,
    state: &mut IndexState,
    start_block: u64,
    chunk_size: u64,
) -> eyre::Result<Option<SyncReport>> {
    let from_block = state.next_block(start_block);
    let latest = source.latest_block().await?;

    if from_block > latest {
        debug!(from_block, latest, "Up to date, no new blocks");
        return Ok(None);
    }

    info!(from_block, to_block = latest, "Indexing token events");

    let mut span = chunk_size.max(1);
    let mut current = from_block;
    let mut transfers = 0;
    let mut supply_events = 0;
    let mut touched_days = BTreeSet::new();

    while current <= latest {
        let chunk_end = current.saturating_add(span - 1).min(latest);

        let events = match source.fetch_events(current, chunk_end).await {
            Ok(events) => events,
            Err(e) if span > 1 && is_range_too_large(&e) => {
                span = (span / 2).max(1);
                warn!(from = current, span, error = %e, "Block range rejected, shrinking chunk");
                continue;
            }
            Err(e) => return Err(e),
        };

        for event in &events {
            touched_days.insert(handle_event(&mut state.store, event));
            match event {
                TokenEvent::Transfer(_) => transfers += 1,
                TokenEvent::Supply(_) => supply_events += 1,
            }
        }
        state.last_block = Some(chunk_end);

        debug!(
            from = current,
            to = chunk_end,
            count = events.len(),
            "Chunk applied"
        );
        current = chunk_end + 1;
    }

    if !touched_days.is_empty() {
        match source.wallet_supply().await {
            Ok(Some(supply)) => record_wallet_supply(&mut state.store, &touched_days, supply),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Wallet supply read failed, snapshot skipped"),
        }
    }

    let holder_count = state
        .store
        .token()
        .map(|token| token.holder_count)
        .unwrap_or_default();

    info!(
        transfers,
        supply_events,
        holder_count,
        last_block = latest,
        "Sync complete"
    );

    Ok(Some(SyncReport {
        from_block,
        to_block: latest,
        transfers,
        supply_events,
        holder_count,
    }))
}

fn record_wallet_supply<S: Store + ?Sized>(store: &mut S, days: &BTreeSet<u64>, supply: U256) {
    for day in days {
        let mut daily = store.load_or_create_daily_stat(*day).into_inner();
        daily.wallet_supply = Some(supply);
        store.save_daily_stat(daily);
    }
}

/// [`LogSource`] backed by a node.
pub struct TransferIngestor<P> {
    provider: P,
    token: Address,
    wallet: Option<Address>,
    chunk_size: u64,
}

impl<P> TransferIngestor<P>
where
    P: Provider + Clone,
{
    pub const DEFAULT_CHUNK_SIZE: u64 = 1_000;

    pub const fn new(provider: P, token: Address) -> Self {
        Self {
            provider,
            token,
            wallet: None,
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
        }
    }

    /// Initial number of blocks per log query (at least 1).
    pub const fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = if chunk_size == 0 { 1 } else { chunk_size };
        self
    }

    /// Snapshot `readSupply()` of `wallet` into the indexed days.
    pub const fn with_wallet(mut self, wallet: Address) -> Self {
        self.wallet = Some(wallet);
        self
    }

    pub const fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    /// Index from `state.next_block(start_block)` up to the chain head.
    pub async fn sync(
        &self,
        state: &mut IndexState,
        start_block: u64,
    ) -> eyre::Result<Option<SyncReport>> {
        sync_from(self, state, start_block, self.chunk_size).await
    }

    /// Fetch the token events of one chunk in chain order.
    async fn scan_chunk(&self, from_block: u64, to_block: u64) -> eyre::Result<Vec<TokenEvent>> {
        let filter = Filter::new()
            .address(self.token)
            .from_block(from_block)
            .to_block(to_block)
            .event_signature(vec![
                IERC20::Transfer::SIGNATURE_HASH,
                IERC20::MintingHappened::SIGNATURE_HASH,
                IERC20::BurningHappened::SIGNATURE_HASH,
            ]);

        let logs = self.provider.get_logs(&filter).await?;

        let mut timestamps = HashMap::new();
        let mut ordered = Vec::with_capacity(logs.len());

        for log in logs {
            let block_number = log
                .block_number
                .ok_or_else(|| eyre!("Token log without block number"))?;

            let timestamp = match log.block_timestamp {
                Some(timestamp) => timestamp,
                None => self.block_timestamp(block_number, &mut timestamps).await?,
            };

            if let Some(event) = decode_event(&log, timestamp)? {
                ordered.push(((block_number, log.log_index.unwrap_or_default()), event));
            }
        }

        ordered.sort_by_key(|(position, _)| *position);
        Ok(ordered.into_iter().map(|(_, event)| event).collect())
    }

    async fn block_timestamp(
        &self,
        number: u64,
        cache: &mut HashMap<u64, u64>,
    ) -> eyre::Result<u64> {
        if let Some(timestamp) = cache.get(&number) {
            return Ok(*timestamp);
        }

        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Number(number))
            .await?
            .ok_or_else(|| eyre!("Block {} not found", number))?;

        let timestamp = block.header.timestamp;
        cache.insert(number, timestamp);
        Ok(timestamp)
    }
}

impl<P> LogSource for TransferIngestor<P>
where
    P: Provider + Clone,
{
    async fn latest_block(&self) -> eyre::Result<u64> {
        Ok(self.provider.get_block_number().await?)
    }

    async fn fetch_events(&self, from_block: u64, to_block: u64) -> eyre::Result<Vec<TokenEvent>> {
        RetryIf::spawn(
            retry_strategy(),
            || async {
                self.scan_chunk(from_block, to_block).await.map_err(|e| {
                    warn!(
                        from = from_block,
                        to = to_block,
                        error = %e,
                        "Token chunk scan failed"
                    );
                    e
                })
            },
            |e: &eyre::Report| !is_range_too_large(e),
        )
        .await
    }

    async fn wallet_supply(&self) -> eyre::Result<Option<U256>> {
        let Some(wallet) = self.wallet else {
            return Ok(None);
        };

        let supply = ISmartWallet::new(wallet, &self.provider)
            .readSupply()
            .call()
            .await?;
        Ok(Some(supply))
    }
}

/// Decode a token log by its first topic. Logs of other events yield `None`.
fn decode_event(log: &Log, timestamp: u64) -> eyre::Result<Option<TokenEvent>> {
    let Some(topic) = log.topics().first() else {
        return Ok(None);
    };

    let event = if *topic == IERC20::Transfer::SIGNATURE_HASH {
        let transfer = log.log_decode::<IERC20::Transfer>()?.inner.data;
        TokenEvent::Transfer(TransferEvent {
            from: transfer.from,
            to: transfer.to,
            value: transfer.value,
            timestamp,
        })
    } else if *topic == IERC20::MintingHappened::SIGNATURE_HASH {
        let minted = log.log_decode::<IERC20::MintingHappened>()?.inner.data;
        TokenEvent::Supply(SupplyEvent {
            kind: SupplyKind::Minted,
            amount: minted.amount,
            timestamp,
        })
    } else if *topic == IERC20::BurningHappened::SIGNATURE_HASH {
        let burned = log.log_decode::<IERC20::BurningHappened>()?.inner.data;
        TokenEvent::Supply(SupplyEvent {
            kind: SupplyKind::Burned,
            amount: burned.amount,
            timestamp,
        })
    } else {
        return Ok(None);
    };

    Ok(Some(event))
}

fn is_range_too_large(error: &eyre::Report) -> bool {
    error.chain().any(|cause| {
        let message = cause.to_string().to_lowercase();
        RANGE_LIMIT_ERRORS
            .iter()
            .any(|fragment| message.contains(fragment))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Bytes, LogData};
    use alloy_provider::{network::Ethereum, RootProvider};
    use std::sync::Mutex;

    #[derive(Clone)]
    struct MockProvider;

    impl Provider for MockProvider {
        fn root(&self) -> &RootProvider<Ethereum> {
            todo!()
        }
    }

    const A: Address = Address::new([0xa; 20]);
    const B: Address = Address::new([0xb; 20]);

    /// Scripted chain: events per block, a span limit and an optional outage.
    #[derive(Default)]
    struct ScriptedSource {
        latest: u64,
        events: Vec<(u64, TokenEvent)>,
        /// Spans wider than this are rejected as too large
        max_span: Option<u64>,
        /// Scans starting at or after this block fail
        fail_from: Option<u64>,
        /// Scans starting at or after this block never complete
        stall_from: Option<u64>,
        supply: Option<U256>,
        calls: Mutex<Vec<(u64, u64)>>,
    }

    impl ScriptedSource {
        fn calls(&self) -> Vec<(u64, u64)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl LogSource for ScriptedSource {
        async fn latest_block(&self) -> eyre::Result<u64> {
            Ok(self.latest)
        }

        async fn fetch_events(
            &self,
            from_block: u64,
            to_block: u64,
        ) -> eyre::Result<Vec<TokenEvent>> {
            self.calls.lock().unwrap().push((from_block, to_block));

            if self
                .max_span
                .is_some_and(|max| to_block - from_block + 1 > max)
            {
                eyre::bail!("Query returned more than 10000 results");
            }
            if self.fail_from.is_some_and(|block| from_block >= block) {
                eyre::bail!("connection reset by peer");
            }
            if self.stall_from.is_some_and(|block| from_block >= block) {
                std::future::pending::<()>().await;
            }

            Ok(self
                .events
                .iter()
                .filter(|(block, _)| (from_block..=to_block).contains(block))
                .map(|(_, event)| event.clone())
                .collect())
        }

        async fn wallet_supply(&self) -> eyre::Result<Option<U256>> {
            Ok(self.supply)
        }
    }

    fn mint_to(to: Address, value: u64, timestamp: u64) -> TokenEvent {
        TokenEvent::Transfer(TransferEvent {
            from: Address::ZERO,
            to,
            value: U256::from(value),
            timestamp,
        })
    }

    #[test]
    fn test_range_errors_are_detected() {
        assert!(is_range_too_large(&eyre!(
            "server returned an error response: Query returned more than 10000 results"
        )));
        assert!(is_range_too_large(
            &eyre!("-32005: too many results").wrap_err("chunk scan failed")
        ));
        assert!(!is_range_too_large(&eyre!("connection reset by peer")));
    }

    #[test]
    fn test_chunk_size() {
        let ingestor = TransferIngestor::new(MockProvider, Address::repeat_byte(1));
        assert_eq!(
            ingestor.chunk_size(),
            TransferIngestor::<MockProvider>::DEFAULT_CHUNK_SIZE
        );

        let ingestor = ingestor.with_chunk_size(0);
        assert_eq!(ingestor.chunk_size(), 1);
    }

    #[test]
    fn test_retry_schedule_is_bounded() {
        let delays: Vec<Duration> = retry_strategy().collect();
        let millis: Vec<u128> = delays.iter().map(Duration::as_millis).collect();

        assert_eq!(millis, [100, 200, 400, 800, 1_600]);
        assert!(delays.iter().sum::<Duration>() < Duration::from_secs(5));
        assert!(delays.iter().all(|delay| *delay <= MAX_RETRY_DELAY));
    }

    #[test]
    fn test_decode_supply_log() {
        let data = IERC20::MintingHappened {
            amount: U256::from(42),
        }
        .encode_log_data();
        let log = Log {
            inner: alloy_primitives::Log {
                address: A,
                data,
            },
            ..Default::default()
        };

        let event = decode_event(&log, 90_000).unwrap().unwrap();
        assert_eq!(
            event,
            TokenEvent::Supply(SupplyEvent {
                kind: SupplyKind::Minted,
                amount: U256::from(42),
                timestamp: 90_000,
            })
        );

        let unrelated = Log {
            inner: alloy_primitives::Log {
                address: A,
                data: LogData::new_unchecked(vec![], Bytes::new()),
            },
            ..Default::default()
        };
        assert!(decode_event(&unrelated, 0).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_up_to_date_skips_scan() {
        let source = ScriptedSource {
            latest: 100,
            ..Default::default()
        };
        let mut state = IndexState {
            last_block: Some(100),
            ..Default::default()
        };

        let report = sync_from(&source, &mut state, 0, 10).await.unwrap();
        assert!(report.is_none());
        assert!(source.calls().is_empty());
        assert_eq!(state.last_block, Some(100));
    }

    #[tokio::test]
    async fn test_chunks_cover_range_once() {
        let source = ScriptedSource {
            latest: 25,
            events: vec![(3, mint_to(A, 5, 0)), (19, mint_to(B, 7, 10))],
            ..Default::default()
        };
        let mut state = IndexState::default();

        let report = sync_from(&source, &mut state, 0, 10).await.unwrap().unwrap();

        assert_eq!(source.calls(), [(0, 9), (10, 19), (20, 25)]);
        assert_eq!(report.transfers, 2);
        assert_eq!(report.holder_count, 2);
        assert_eq!((report.from_block, report.to_block), (0, 25));
        assert_eq!(state.last_block, Some(25));
    }

    #[tokio::test]
    async fn test_rejected_range_halves_span_and_rescans() {
        let source = ScriptedSource {
            latest: 9,
            events: vec![(0, mint_to(A, 1, 0)), (9, mint_to(A, 1, 0))],
            max_span: Some(3),
            ..Default::default()
        };
        let mut state = IndexState::default();

        let report = sync_from(&source, &mut state, 0, 10).await.unwrap().unwrap();

        let calls = source.calls();
        // 10 -> 5 -> 2, always from the same start block
        assert_eq!(calls[..3], [(0, 9), (0, 4), (0, 1)]);
        assert_eq!(calls[3..], [(2, 3), (4, 5), (6, 7), (8, 9)]);
        assert_eq!(report.transfers, 2);
        assert_eq!(state.last_block, Some(9));
    }

    #[tokio::test]
    async fn test_failure_keeps_applied_chunks() {
        let source = ScriptedSource {
            latest: 30,
            events: vec![(2, mint_to(A, 5, 0)), (12, mint_to(B, 5, 0))],
            fail_from: Some(10),
            ..Default::default()
        };
        let mut state = IndexState::default();

        let err = sync_from(&source, &mut state, 0, 10).await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));

        assert_eq!(state.last_block, Some(9));
        assert_eq!(state.store.count_positive_holders(), 1);
        assert!(state.store.holder(&B).is_none());

        // The next pass resumes at the failed chunk
        assert_eq!(state.next_block(0), 10);
    }

    #[tokio::test]
    async fn test_cancelled_sync_keeps_applied_chunks() {
        let source = ScriptedSource {
            latest: 30,
            events: vec![(2, mint_to(A, 5, 0)), (12, mint_to(B, 5, 0))],
            stall_from: Some(10),
            ..Default::default()
        };
        let mut state = IndexState::default();

        let cancelled = tokio::time::timeout(
            Duration::from_millis(50),
            sync_from(&source, &mut state, 0, 10),
        )
        .await;
        assert!(cancelled.is_err());

        assert_eq!(state.last_block, Some(9));
        assert_eq!(state.store.count_positive_holders(), 1);
        assert_eq!(state.next_block(0), 10);
    }

    #[tokio::test]
    async fn test_wallet_supply_snapshot_on_touched_days() {
        let supply_event = TokenEvent::Supply(SupplyEvent {
            kind: SupplyKind::Burned,
            amount: U256::from(3),
            timestamp: 86_500,
        });
        let source = ScriptedSource {
            latest: 5,
            events: vec![(1, mint_to(A, 5, 100)), (4, supply_event)],
            supply: Some(U256::from(900)),
            ..Default::default()
        };
        let mut state = IndexState::default();
        state.store.save_daily_stat(crate::DailyStat::new(7));

        let report = sync_from(&source, &mut state, 0, 100).await.unwrap().unwrap();
        assert_eq!(report.supply_events, 1);

        assert_eq!(state.store.daily_stat(0).unwrap().wallet_supply, Some(U256::from(900)));
        assert_eq!(state.store.daily_stat(1).unwrap().wallet_supply, Some(U256::from(900)));
        assert_eq!(state.store.daily_stat(1).unwrap().burned, U256::from(3));
        // Days outside the pass keep their snapshot
        assert!(state.store.daily_stat(7).unwrap().wallet_supply.is_none());
    }
}
