//! Tracks submitted bundles until `target_block + 2` has passed (spec.md §3: "Bundle:
//! ... tracked until target_block + 2 then discarded"). Lives on the scheduler's core
//! actor; the tx-watch task only ever reads a snapshot of the ids to poll.

use std::collections::HashMap;

use ethers::types::U256;

use ambush_relay_client::{BundleId, BundleStatus};

#[derive(Debug, Clone, Copy)]
pub struct OutstandingEntry {
    pub target_block: u64,
    pub last_known_status: BundleStatus,
    pub gas_price: U256,
}

#[derive(Default)]
pub struct OutstandingBundles {
    entries: HashMap<BundleId, OutstandingEntry>,
}

impl OutstandingBundles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, id: BundleId, target_block: u64, gas_price: U256) {
        self.entries.insert(id, OutstandingEntry { target_block, last_known_status: BundleStatus::Pending, gas_price });
    }

    /// `(bundle_id, gas_price)` pairs for every outstanding bundle, the shape the
    /// emergency procedure's rebroadcast-cancel step needs (spec.md §4.8).
    pub fn cancellation_candidates(&self) -> Vec<(String, U256)> {
        self.entries.iter().map(|(id, e)| (format!("{id:?}"), e.gas_price)).collect()
    }

    pub fn update_status(&mut self, id: BundleId, status: BundleStatus) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.last_known_status = status;
        }
    }

    pub fn ids(&self) -> Vec<BundleId> {
        self.entries.keys().copied().collect()
    }

    pub fn get(&self, id: &BundleId) -> Option<OutstandingEntry> {
        self.entries.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops any bundle whose `target_block + 2` is at or before `current_block`,
    /// matching both the tick task's per-block pruning and the relay proxy's own
    /// submission-cache prune (spec.md §4.9's tick task responsibility).
    pub fn prune(&mut self, current_block: u64) -> Vec<BundleId> {
        let expired: Vec<BundleId> = self
            .entries
            .iter()
            .filter(|(_, e)| current_block > e.target_block.saturating_add(2))
            .map(|(id, _)| *id)
            .collect();
        for id in &expired {
            self.entries.remove(id);
        }
        expired
    }
}
