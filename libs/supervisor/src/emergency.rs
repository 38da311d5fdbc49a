//! Persisted emergency state (spec.md §6): written on every breaker trip and every
//! 5 minutes otherwise; a non-empty file on start-up puts the system in recovery mode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Bumped when the on-disk shape changes, so a future format change doesn't silently
/// misparse an older file (SPEC_FULL.md §B supplement).
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyState {
    pub schema_version: u32,
    pub shutdown_triggered: bool,
    pub pending_bundle_ids: Vec<String>,
    pub cancelled_bundle_ids: Vec<String>,
    pub at: DateTime<Utc>,
}

impl EmergencyState {
    pub fn new(pending_bundle_ids: Vec<String>, cancelled_bundle_ids: Vec<String>, at: DateTime<Utc>) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            shutdown_triggered: true,
            pending_bundle_ids,
            cancelled_bundle_ids,
            at,
        }
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .unwrap_or_else(|_| "{}".to_string());
        std::fs::write(path, json)
    }

    /// `Ok(None)` when the file does not exist (first boot, or cleared by the operator).
    pub fn load(path: &Path) -> std::io::Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(None);
        }
        let state = serde_json::from_str(&contents)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(Some(state))
    }

    /// Clears the recovery file, the operator action that returns the system to normal
    /// (spec.md §8 scenario S5).
    pub fn clear(path: &Path) -> std::io::Result<()> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}
