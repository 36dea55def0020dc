//! Component-tagged logging and per-exporter counters.

pub mod log;
pub mod metrics;

pub use log::LogManager;
pub use metrics::MetricsRecorder;
