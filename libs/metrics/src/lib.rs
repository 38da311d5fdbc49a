//! Metrics and health (C10): latency windows, success rates, PnL, and resource/network
//! health sampling. Feeds both operator dashboards (via the `metrics` facade, wired to
//! Prometheus by the binary) and the supervisor (C8), which reads health samples to
//! evaluate its resource and network breakers.

pub mod health;
pub mod latency;
pub mod pnl;
pub mod registry;
pub mod success_rate;

pub use health::{HealthSampler, NetworkSample, ResourceSample};
pub use latency::LatencyWindow;
pub use pnl::PnlTracker;
pub use registry::MetricsRegistry;
pub use success_rate::SuccessRateWindow;
