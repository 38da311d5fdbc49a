//! Operator configuration for the ambush searcher (spec.md §6).
//!
//! One `AmbushConfig` loaded at start-up from a TOML file, overlaid with `AMBUSH_`-prefixed
//! environment variables, mirroring the teacher's `Config::builder()` / `Environment::with_prefix`
//! pattern — generalized from the teacher's per-service `HashMap<String, ServiceSettings>` to a
//! single flat settings object, since this core has exactly one operator-facing process.

pub mod settings;

pub use settings::{
    AmbushConfig, DexConfig, FlashloanVenueConfig, NotificationSinkConfig, SafetyConfig,
};
