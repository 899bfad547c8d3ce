//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/enginelink/config.toml` by default. A missing file means
//! defaults; command-line flags override what the file says.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use enginelink_core::{TracingConfig, TracingOutputFormat};
use enginelink_protocol::{DEFAULT_MAX_DECOMPRESSED_SIZE, MessageCodec};

use crate::error::{ClientError, ClientResult};

/// Port the engine listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 5637;

/// WebSocket path the engine serves the debug socket on.
pub const DEFAULT_PATH: &str = "/WebSocketApp/takahashi_kenji";

/// Configuration for the enginelink client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Debug mode.
    pub debug: bool,

    /// Where to connect.
    pub connection: ConnectionSettings,

    /// File transfer and codec settings.
    pub transfer: TransferSettings,

    /// Identity announced to the engine on connect.
    pub identity: IdentitySettings,

    /// Tracing output on stderr.
    pub logging: LoggingSettings,
}

/// Endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Host name or IP address of the engine.
    pub address: String,

    pub port: u16,

    /// WebSocket path, starting with `/`.
    pub path: String,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            path: DEFAULT_PATH.to_string(),
        }
    }
}

impl ConnectionSettings {
    /// `ws://{address}:{port}{path}` for the configured endpoint.
    pub fn url(&self) -> ClientResult<Url> {
        endpoint_url(&self.address, self.port, &self.path)
    }

    /// Resolves a `host[:port]` endpoint, filling in the configured port
    /// and path.
    pub fn url_for(&self, endpoint: &str) -> ClientResult<Url> {
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            return Err(ClientError::Config("empty endpoint".to_string()));
        }
        let raw = format!("ws://{}{}", endpoint, normalized_path(&self.path));
        let mut url = Url::parse(&raw).map_err(|e| invalid_endpoint(endpoint, e))?;
        if url.port().is_none() {
            url.set_port(Some(self.port))
                .map_err(|_| invalid_endpoint(endpoint, "no port allowed"))?;
        }
        Ok(url)
    }
}

fn invalid_endpoint(endpoint: &str, detail: impl Display) -> ClientError {
    ClientError::Config(format!("invalid endpoint {}: {}", endpoint, detail))
}

fn invalid(detail: &str) -> ClientError {
    ClientError::Config(detail.to_string())
}

fn normalized_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

/// Builds `ws://{address}:{port}{path}`.
pub fn endpoint_url(address: &str, port: u16, path: &str) -> ClientResult<Url> {
    let host = if address.contains(':') && !address.starts_with('[') {
        format!("[{}]", address)
    } else {
        address.to_string()
    };
    let raw = format!("ws://{}:{}{}", host, port, normalized_path(path));
    Url::parse(&raw).map_err(|e| invalid_endpoint(&raw, e))
}

/// File transfer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferSettings {
    /// Directory received files are written to. Defaults to the user's
    /// download directory. A leading `~` is expanded.
    pub download_dir: Option<PathBuf>,

    /// Gzip outgoing bodies when that makes them smaller.
    pub compression: bool,

    /// Largest accepted payload after decompression, in bytes.
    pub max_decompressed_size: usize,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            download_dir: None,
            compression: true,
            max_decompressed_size: DEFAULT_MAX_DECOMPRESSED_SIZE,
        }
    }
}

impl TransferSettings {
    /// Resolved download directory.
    pub fn download_dir(&self) -> PathBuf {
        match self.download_dir {
            Some(ref dir) => expand_home(dir),
            None => dirs::download_dir()
                .or_else(dirs::home_dir)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    /// Codec configured from these settings, accepting what a client
    /// receives.
    pub fn codec(&self) -> MessageCodec {
        MessageCodec::new()
            .with_compression(self.compression)
            .with_max_decompressed_size(self.max_decompressed_size)
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

/// Overrides for the identity pushed to the engine. Unset fields are
/// derived from the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentitySettings {
    pub application_name: Option<String>,
    pub device_name: Option<String>,
    pub device_model: Option<String>,
}

/// Tracing settings. `RUST_LOG` applies unless `filter` is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `compact`, `pretty` or `json`.
    pub format: TracingOutputFormat,

    /// Filter directive such as `enginelink_client=trace`.
    pub filter: Option<String>,

    /// Also log span open and close events.
    pub span_events: bool,
}

impl LoggingSettings {
    /// Layers these settings over `base`.
    pub fn apply(&self, base: TracingConfig) -> TracingConfig {
        let config = base
            .with_format(self.format)
            .with_span_events(self.span_events);
        match self.filter {
            Some(ref filter) => config.with_env_filter(filter.clone()),
            None => config,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config: {}", e))?;
        toml::from_str(&content)
            .map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("enginelink")
    }

    /// Applies command-line overrides.
    #[must_use]
    pub fn with_overrides(
        mut self,
        address: Option<String>,
        port: Option<u16>,
        path: Option<String>,
    ) -> Self {
        if let Some(address) = address {
            self.connection.address = address;
        }
        if let Some(port) = port {
            self.connection.port = port;
        }
        if let Some(path) = path {
            self.connection.path = path;
        }
        self
    }

    /// Checks values that parse but cannot work.
    pub fn validate(&self) -> ClientResult<()> {
        if self.connection.address.trim().is_empty() {
            return Err(invalid("connection.address must not be empty"));
        }
        if self.connection.port == 0 {
            return Err(invalid("connection.port must not be 0"));
        }
        if self.transfer.max_decompressed_size == 0 {
            return Err(invalid("transfer.max_decompressed_size must be positive"));
        }
        if let Err(e) = self.logging.apply(TracingConfig::cli()).filter() {
            return Err(ClientError::Config(format!("logging.filter: {}", e)));
        }
        self.connection.url()?;
        Ok(())
    }
}
