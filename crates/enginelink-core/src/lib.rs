//! Shared plumbing for enginelink: tracing setup and the log broadcast hub.

pub mod log_hub;
pub mod tracing;

pub use crate::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
pub use log_hub::{LOG_TARGET, LogHub, LogLevel, LogLine, LogSink, Rgb, SubscriptionId};
