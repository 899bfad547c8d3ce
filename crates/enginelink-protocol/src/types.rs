//! Integer-backed enums carried in message bodies.

use std::fmt;

/// Logical root on the engine side that a remote path is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DirectoryType {
    #[default]
    Invalid,
    Data,
    StreamingAssets,
    PersistentData,
    TemporaryCache,
    /// An ordinal this build does not know about.
    Other(i32),
}

impl DirectoryType {
    pub const fn ordinal(self) -> i32 {
        match self {
            Self::Invalid => -1,
            Self::Data => 0,
            Self::StreamingAssets => 1,
            Self::PersistentData => 2,
            Self::TemporaryCache => 3,
            Self::Other(value) => value,
        }
    }

    pub const fn from_ordinal(value: i32) -> Self {
        match value {
            -1 => Self::Invalid,
            0 => Self::Data,
            1 => Self::StreamingAssets,
            2 => Self::PersistentData,
            3 => Self::TemporaryCache,
            other => Self::Other(other),
        }
    }

    /// Console name, e.g. `persistent-data`.
    pub const fn name(self) -> Option<&'static str> {
        match self {
            Self::Data => Some("data"),
            Self::StreamingAssets => Some("streaming-assets"),
            Self::PersistentData => Some("persistent-data"),
            Self::TemporaryCache => Some("temporary-cache"),
            Self::Invalid | Self::Other(_) => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [
            Self::Data,
            Self::StreamingAssets,
            Self::PersistentData,
            Self::TemporaryCache,
        ]
        .into_iter()
        .find(|dir| dir.name() == Some(name))
    }
}

impl fmt::Display for DirectoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "invalid({})", self.ordinal()),
        }
    }
}

impl From<i32> for DirectoryType {
    fn from(value: i32) -> Self {
        Self::from_ordinal(value)
    }
}

impl From<DirectoryType> for i32 {
    fn from(value: DirectoryType) -> Self {
        value.ordinal()
    }
}

/// Severity of a line forwarded from the engine's log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LogType {
    #[default]
    Invalid,
    Error,
    Assert,
    Warning,
    Log,
    Exception,
    Other(i32),
}

impl LogType {
    pub const fn ordinal(self) -> i32 {
        match self {
            Self::Invalid => -1,
            Self::Error => 0,
            Self::Assert => 1,
            Self::Warning => 2,
            Self::Log => 3,
            Self::Exception => 4,
            Self::Other(value) => value,
        }
    }

    pub const fn from_ordinal(value: i32) -> Self {
        match value {
            -1 => Self::Invalid,
            0 => Self::Error,
            1 => Self::Assert,
            2 => Self::Warning,
            3 => Self::Log,
            4 => Self::Exception,
            other => Self::Other(other),
        }
    }
}

impl From<i32> for LogType {
    fn from(value: i32) -> Self {
        Self::from_ordinal(value)
    }
}

impl From<LogType> for i32 {
    fn from(value: LogType) -> Self {
        value.ordinal()
    }
}
