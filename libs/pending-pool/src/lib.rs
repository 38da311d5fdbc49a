//! Pending-tx store (C2): a bounded mapping from hash to `PendingTx`, plus secondary
//! indices by protocol tag and routed token (spec.md §4.2). This is the event-loop
//! thread's private state (spec.md §5); cross-thread readers get snapshot copies via
//! `query_relevant`/`snapshot`, never a shared reference into the live table.

use ambush_types::{PendingTx, ProtocolTag, TokenId};
use chrono::{DateTime, Utc};
use ethers::types::H256;
use std::collections::{HashMap, HashSet, VecDeque};

/// Default TTL from spec.md §4.2.
pub const DEFAULT_TTL_SECS: i64 = 300;

pub struct PendingTxStore {
    capacity: usize,
    ttl: chrono::Duration,
    by_hash: HashMap<H256, PendingTx>,
    by_protocol: HashMap<ProtocolTag, HashSet<H256>>,
    by_token: HashMap<TokenId, HashSet<H256>>,
    /// Oldest-first insertion order, for LRU-by-first-seen eviction at capacity.
    insertion_order: VecDeque<H256>,
}

impl PendingTxStore {
    pub fn new(capacity: usize, ttl_secs: i64) -> Self {
        Self {
            capacity,
            ttl: chrono::Duration::seconds(ttl_secs),
            by_hash: HashMap::new(),
            by_protocol: HashMap::new(),
            by_token: HashMap::new(),
            insertion_order: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.by_hash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }

    pub fn contains(&self, hash: &H256) -> bool {
        self.by_hash.contains_key(hash)
    }

    pub fn get(&self, hash: &H256) -> Option<&PendingTx> {
        self.by_hash.get(hash)
    }

    /// Inserts `tx` if not already present; rebuilds secondary indices for it. If the
    /// store is at capacity, silently drops the oldest entry first (spec.md §4.2: "drop
    /// silently if at capacity (LRU by first-seen)").
    pub fn ingest(&mut self, tx: PendingTx) -> bool {
        if self.by_hash.contains_key(&tx.hash) {
            return false;
        }

        if self.by_hash.len() >= self.capacity {
            if let Some(oldest) = self.insertion_order.pop_front() {
                self.remove(&oldest);
            }
        }

        let hash = tx.hash;
        self.by_protocol.entry(tx.protocol).or_default().insert(hash);
        if let Some(token) = tx.routed_token {
            self.by_token.entry(token).or_default().insert(hash);
        }
        self.insertion_order.push_back(hash);
        self.by_hash.insert(hash, tx);
        true
    }

    /// Removes one entry by hash (inclusion or drop), keeping indices consistent.
    pub fn remove(&mut self, hash: &H256) -> Option<PendingTx> {
        let tx = self.by_hash.remove(hash)?;
        if let Some(set) = self.by_protocol.get_mut(&tx.protocol) {
            set.remove(hash);
            if set.is_empty() {
                self.by_protocol.remove(&tx.protocol);
            }
        }
        if let Some(token) = tx.routed_token {
            if let Some(set) = self.by_token.get_mut(&token) {
                set.remove(hash);
                if set.is_empty() {
                    self.by_token.remove(&token);
                }
            }
        }
        self.insertion_order.retain(|h| h != hash);
        Some(tx)
    }

    /// Removes every entry older than the configured TTL. Returns their hashes.
    pub fn evict_expired(&mut self, now: DateTime<Utc>) -> Vec<H256> {
        let expired: Vec<H256> = self
            .by_hash
            .values()
            .filter(|tx| tx.age(now) >= self.ttl)
            .map(|tx| tx.hash)
            .collect();
        for hash in &expired {
            self.remove(hash);
        }
        expired
    }

    /// Snapshot of entries whose decoded protocol is in the operator's watch list
    /// (spec.md §4.2 `query_relevant`).
    pub fn query_relevant(&self, watch_list: &HashSet<ProtocolTag>) -> Vec<PendingTx> {
        watch_list
            .iter()
            .filter_map(|tag| self.by_protocol.get(tag))
            .flat_map(|hashes| hashes.iter())
            .filter_map(|h| self.by_hash.get(h).cloned())
            .collect()
    }

    /// Snapshot of entries routing the given token, for strategies that key off it
    /// (JIT liquidity, front-run candidate selection).
    pub fn by_token(&self, token: TokenId) -> Vec<PendingTx> {
        self.by_token
            .get(&token)
            .into_iter()
            .flat_map(|hashes| hashes.iter())
            .filter_map(|h| self.by_hash.get(h).cloned())
            .collect()
    }

    /// Full read-only snapshot, for cross-thread consumers (spec.md §5: "cross-thread
    /// readers receive snapshot copies").
    pub fn snapshot(&self) -> Vec<PendingTx> {
        self.by_hash.values().cloned().collect()
    }

    /// Debug/testing aid: asserts the secondary indices are consistent with the
    /// primary table, the invariant spec.md §4.2 requires hold after every operation.
    #[cfg(test)]
    fn assert_consistent(&self) {
        for hashes in self.by_protocol.values() {
            for h in hashes {
                assert!(self.by_hash.contains_key(h), "protocol index references missing tx");
            }
        }
        for hashes in self.by_token.values() {
            for h in hashes {
                assert!(self.by_hash.contains_key(h), "token index references missing tx");
            }
        }
        assert_eq!(self.insertion_order.len(), self.by_hash.len());
    }
}
