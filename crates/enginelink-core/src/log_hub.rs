//! Multi-subscriber log broadcast.
//!
//! Sessions report what happens on a connection through a [`LogHub`]:
//! plain lines, leveled lines and colorized lines. Front-ends attach a
//! [`LogSink`] and get back a [`SubscriptionId`] they later hand to
//! [`LogHub::unsubscribe`]. Every line is mirrored into `tracing` so log
//! files see the same stream as the console.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local};

/// `tracing` target every hub line is mirrored under.
pub const LOG_TARGET: &str = "enginelink::log";

/// A 24-bit color attached to a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const NORMAL: Rgb = Rgb(255, 255, 255);
    pub const INFO: Rgb = Rgb(50, 255, 50);
    pub const WARNING: Rgb = Rgb(255, 255, 0);
    pub const ERROR: Rgb = Rgb(255, 0, 0);
}

/// Severity of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    /// Uncolored, unleveled output.
    Plain,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Color a sink should use when the line carries none of its own.
    pub fn color(self) -> Rgb {
        match self {
            Self::Plain => Rgb::NORMAL,
            Self::Info => Rgb::INFO,
            Self::Warning => Rgb::WARNING,
            Self::Error => Rgb::ERROR,
        }
    }
}

/// One broadcast line.
#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub level: LogLevel,
    pub color: Rgb,
    pub text: String,
    pub timestamp: DateTime<Local>,
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Receiver of broadcast lines.
pub trait LogSink: Send + Sync {
    fn receive(&self, line: &LogLine);

    /// Called once when the sink is removed from its hub.
    fn detached(&self) {}
}

/// Handle returned by [`LogHub::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Registry {
    next_id: u64,
    sinks: Vec<(SubscriptionId, Arc<dyn LogSink>)>,
}

/// Cloneable broadcast handle; clones share one subscriber list.
#[derive(Clone, Default)]
pub struct LogHub {
    registry: Arc<Mutex<Registry>>,
    prefix: Option<Arc<str>>,
}

impl fmt::Debug for LogHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogHub")
            .field("subscribers", &self.subscriber_count())
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl LogHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle on the same subscriber list whose lines start with
    /// `[{prefix}] `.
    pub fn scoped(&self, prefix: impl Into<String>) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            prefix: Some(Arc::from(prefix.into())),
        }
    }

    pub fn subscribe(&self, sink: Arc<dyn LogSink>) -> SubscriptionId {
        let mut registry = self.lock();
        let id = SubscriptionId(registry.next_id);
        registry.next_id += 1;
        registry.sinks.push((id, sink));
        id
    }

    /// Removes a subscriber. Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = {
            let mut registry = self.lock();
            let position = registry.sinks.iter().position(|(sid, _)| *sid == id);
            position.map(|index| registry.sinks.remove(index).1)
        };
        match removed {
            Some(sink) => {
                sink.detached();
                true
            }
            None => {
                tracing::debug!(?id, "log subscriber does not exist");
                false
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().sinks.len()
    }

    pub fn plain(&self, text: impl AsRef<str>) {
        self.emit(LogLevel::Plain, LogLevel::Plain.color(), text.as_ref());
    }

    pub fn info(&self, text: impl AsRef<str>) {
        self.emit(LogLevel::Info, LogLevel::Info.color(), text.as_ref());
    }

    pub fn warning(&self, text: impl AsRef<str>) {
        self.emit(LogLevel::Warning, LogLevel::Warning.color(), text.as_ref());
    }

    pub fn error(&self, text: impl AsRef<str>) {
        self.emit(LogLevel::Error, LogLevel::Error.color(), text.as_ref());
    }

    pub fn colored(&self, color: Rgb, text: impl AsRef<str>) {
        self.emit(LogLevel::Plain, color, text.as_ref());
    }

    fn emit(&self, level: LogLevel, color: Rgb, text: &str) {
        if text.is_empty() {
            return;
        }
        // A newline-terminated payload is cut at its first line break.
        let text = if text.ends_with('\n') {
            text.split('\n').next().unwrap_or_default()
        } else {
            text
        };
        let text = match self.prefix {
            Some(ref prefix) => format!("[{prefix}] {text}"),
            None => text.to_string(),
        };

        match level {
            LogLevel::Plain | LogLevel::Info => tracing::info!(target: LOG_TARGET, "{text}"),
            LogLevel::Warning => tracing::warn!(target: LOG_TARGET, "{text}"),
            LogLevel::Error => tracing::error!(target: LOG_TARGET, "{text}"),
        }

        let sinks: Vec<Arc<dyn LogSink>> = self
            .lock()
            .sinks
            .iter()
            .map(|(_, sink)| Arc::clone(sink))
            .collect();
        if sinks.is_empty() {
            return;
        }
        let line = LogLine {
            level,
            color,
            text,
            timestamp: Local::now(),
        };
        for sink in sinks {
            sink.receive(&line);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
