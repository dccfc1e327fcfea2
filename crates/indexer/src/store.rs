//! Record storage with explicit load-or-create.

use crate::entity::{DailyStat, Holder, Token};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Result of a load-or-create lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loaded<T> {
    /// The record already existed
    Found(T),
    /// No record existed; a fresh one was constructed (not yet saved)
    Created(T),
}

impl<T> Loaded<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Found(record) | Self::Created(record) => record,
        }
    }

    pub const fn was_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Load/save access to the three record kinds.
///
/// Loads return copies; nothing changes until the record is saved back.
pub trait Store {
    fn holder(&self, id: &Address) -> Option<Holder>;
    fn save_holder(&mut self, holder: Holder);

    fn token(&self) -> Option<Token>;
    fn save_token(&mut self, token: Token);

    fn daily_stat(&self, day: u64) -> Option<DailyStat>;
    fn save_daily_stat(&mut self, stat: DailyStat);

    fn load_or_create_holder(&self, id: Address) -> Loaded<Holder> {
        self.holder(&id)
            .map_or_else(|| Loaded::Created(Holder::new(id)), Loaded::Found)
    }

    fn load_or_create_token(&self) -> Loaded<Token> {
        self.token()
            .map_or_else(|| Loaded::Created(Token::default()), Loaded::Found)
    }

    fn load_or_create_daily_stat(&self, day: u64) -> Loaded<DailyStat> {
        self.daily_stat(day)
            .map_or_else(|| Loaded::Created(DailyStat::new(day)), Loaded::Found)
    }
}

/// In-memory store, serializable as part of [`crate::IndexState`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoreRecords", into = "StoreRecords")]
pub struct MemoryStore {
    holders: BTreeMap<Address, Holder>,
    token: Option<Token>,
    daily_stats: BTreeMap<u64, DailyStat>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn holders(&self) -> impl Iterator<Item = &Holder> {
        self.holders.values()
    }

    /// Daily stats in ascending day order.
    pub fn daily_stats(&self) -> impl DoubleEndedIterator<Item = &DailyStat> {
        self.daily_stats.values()
    }

    pub fn latest_daily_stat(&self) -> Option<&DailyStat> {
        self.daily_stats.values().next_back()
    }

    /// Holder count recomputed from balances, for checking the incremental count.
    pub fn count_positive_holders(&self) -> u64 {
        self.holders
            .values()
            .filter(|holder| !holder.balance.is_zero())
            .count() as u64
    }
}

impl Store for MemoryStore {
    fn holder(&self, id: &Address) -> Option<Holder> {
        self.holders.get(id).cloned()
    }

    fn save_holder(&mut self, holder: Holder) {
        self.holders.insert(holder.id, holder);
    }

    fn token(&self) -> Option<Token> {
        self.token.clone()
    }

    fn save_token(&mut self, token: Token) {
        self.token = Some(token);
    }

    fn daily_stat(&self, day: u64) -> Option<DailyStat> {
        self.daily_stats.get(&day).cloned()
    }

    fn save_daily_stat(&mut self, stat: DailyStat) {
        self.daily_stats.insert(stat.id, stat);
    }
}

/// Flat on-disk shape: JSON objects need string keys, so maps become lists.
#[derive(Serialize, Deserialize)]
struct StoreRecords {
    token: Option<Token>,
    holders: Vec<Holder>,
    daily_stats: Vec<DailyStat>,
}

impl From<StoreRecords> for MemoryStore {
    fn from(records: StoreRecords) -> Self {
        Self {
            holders: records
                .holders
                .into_iter()
                .map(|holder| (holder.id, holder))
                .collect(),
            token: records.token,
            daily_stats: records
                .daily_stats
                .into_iter()
                .map(|stat| (stat.id, stat))
                .collect(),
        }
    }
}

impl From<MemoryStore> for StoreRecords {
    fn from(store: MemoryStore) -> Self {
        Self {
            token: store.token,
            holders: store.holders.into_values().collect(),
            daily_stats: store.daily_stats.into_values().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;

    #[test]
    fn test_load_or_create_tags_records() {
        let mut store = MemoryStore::new();
        let id = Address::repeat_byte(1);

        let loaded = store.load_or_create_holder(id);
        assert!(loaded.was_created());
        assert_eq!(loaded.into_inner(), Holder::new(id));

        // Creating does not persist
        assert!(store.holder(&id).is_none());

        store.save_holder(Holder {
            id,
            balance: U256::from(3),
        });
        let loaded = store.load_or_create_holder(id);
        assert!(!loaded.was_created());
        assert_eq!(loaded.into_inner().balance, U256::from(3));
    }

    #[test]
    fn test_token_and_daily_stat_defaults() {
        let store = MemoryStore::new();

        let token = store.load_or_create_token();
        assert!(token.was_created());
        assert_eq!(token.into_inner().holder_count, 0);

        let stat = store.load_or_create_daily_stat(2);
        assert_eq!(stat, Loaded::Created(DailyStat::new(2)));
    }

    #[test]
    fn test_latest_daily_stat() {
        let mut store = MemoryStore::new();
        assert!(store.latest_daily_stat().is_none());

        store.save_daily_stat(DailyStat::new(5));
        store.save_daily_stat(DailyStat::new(3));
        assert_eq!(store.latest_daily_stat().map(|s| s.id), Some(5));

        let days: Vec<u64> = store.daily_stats().map(|s| s.id).collect();
        assert_eq!(days, vec![3, 5]);
    }
}
