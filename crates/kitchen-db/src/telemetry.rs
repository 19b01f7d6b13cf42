//! # Tracing Setup
//!
//! Log output for the binaries. The filter is the only level gate:
//!
//! - `RUST_LOG` wins when set
//! - otherwise the caller's fallback, normally [`KitchenConfig::log_filter`]
//!   (`KITCHEN_LOG`, or [`DEFAULT_LOG_FILTER`])
//!
//! [`KitchenConfig::log_filter`]: crate::KitchenConfig::log_filter
//! [`DEFAULT_LOG_FILTER`]: crate::DEFAULT_LOG_FILTER

use tracing::Subscriber;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` when it parses, otherwise `fallback`.
pub fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Formatted output to stdout, gated by `filter` alone.
pub fn subscriber(filter: EnvFilter) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt().with_env_filter(filter).finish()
}

/// Installs the global subscriber. Call once, at startup.
pub fn init_tracing(fallback: &str) {
    subscriber(env_filter(fallback)).init();
}
