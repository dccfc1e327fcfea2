//! Transfer-event indexing for the token.
//!
//! For every `Transfer` event the [`handler`] updates three kinds of records:
//! - [`Holder`]: running balance per address
//! - [`Token`]: number of holders with a positive balance
//! - [`DailyStat`]: volume, holder snapshot and active addresses per day bucket
//!
//! `MintingHappened` and `BurningHappened` notifications add to the daily
//! minted and burned totals. Records live in a [`Store`]. The [`ingest`]
//! module pulls events from a node, [`state`] persists records plus the last
//! indexed block between runs, and [`demand`] derives the weekly demand index.

pub mod demand;
pub mod entity;
pub mod error;
pub mod handler;
pub mod ingest;
pub mod state;
pub mod store;

pub use entity::{day_bucket, DailyStat, Holder, Token, SECONDS_PER_DAY, TOKEN_ID};
pub use error::IndexError;
pub use demand::{
    demand_index, token_units, DemandIndex, DemandParams, DemandReport, MsctState,
};
pub use handler::{
    handle_event, handle_supply, handle_transfer, Handled, SupplyEvent, SupplyKind, TokenEvent,
    TransferEvent,
};
pub use ingest::{retry_strategy, sync_from, LogSource, SyncReport, TransferIngestor};
pub use state::IndexState;
pub use store::{Loaded, MemoryStore, Store};
