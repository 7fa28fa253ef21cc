/// Error types for the pool watcher
pub mod error;

/// Parsed log events and alert categories
pub mod events;

/// Log tailing and line parsing
pub mod collectors;

/// Sliding window and error-rate evaluation
pub mod aggregator;

/// Alert formatting, cooldown, and delivery
pub mod alerts;

/// Configuration management
pub mod config;

/// Failover and error-rate detection loop
pub mod monitor;

// Re-export commonly used types
pub use error::{AlertError, ConfigError, MonitorError, StreamError};
pub use events::{AlertKind, LogEvent};
pub use monitor::{Monitor, MonitorContext, MonitorSettings};
