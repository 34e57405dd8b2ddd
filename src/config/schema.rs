//! Configuration schema definitions.
//!
//! `ServerOptions` is the single immutable configuration struct handed to
//! the server lifecycle. It is constructed by the CLI layer or deserialized
//! from a TOML file; after construction it is never mutated.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Default read/write timeout in seconds.
const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;
const DEFAULT_WRITE_TIMEOUT_SECS: u64 = 30;
/// Default idle connection timeout in seconds.
const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 120;
/// Default graceful-shutdown grace period in seconds.
const DEFAULT_GRACE_SECS: u64 = 5;
/// Default maximum request header size (1 MiB).
const DEFAULT_MAX_HEADER_BYTES: usize = 1 << 20;
/// Default maximum request body size (10 MiB).
const DEFAULT_MAX_BODY_BYTES: u64 = 10 << 20;

/// Immutable server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerOptions {
    /// Bind address (e.g., "0.0.0.0:8443").
    pub addr: String,

    /// Share root: absolute directory boundary beyond which no request
    /// may read.
    pub root: PathBuf,

    /// Optional allow-list of sub-paths under the root. Empty means the
    /// entire root is visible.
    pub allow: Vec<PathBuf>,

    /// Path to the server certificate (PEM).
    pub cert_path: PathBuf,

    /// Path to the server private key (PEM).
    pub key_path: PathBuf,

    /// Path to the CA certificate (PEM), presented to users for install.
    pub ca_cert_path: PathBuf,

    /// Suppress the startup banner and per-request access log.
    pub quiet: bool,

    /// Read timeout in seconds; 0 means default (30s).
    pub read_timeout_secs: u64,

    /// Write timeout in seconds; 0 means default (30s).
    pub write_timeout_secs: u64,

    /// Idle connection timeout in seconds; 0 means default (120s).
    pub idle_timeout_secs: u64,

    /// Graceful-shutdown grace period in seconds; 0 means default (5s).
    pub grace_secs: u64,

    /// Maximum request header size in bytes; 0 means default (1 MiB).
    pub max_header_bytes: usize,

    /// Maximum request body size in bytes; 0 means default (10 MiB).
    pub max_body_bytes: u64,

    /// Basic-auth credentials; auth is skipped when unset.
    pub auth: Option<BasicAuthConfig>,
}

/// Basic authentication settings.
#[derive(Debug, Clone, Deserialize)]
pub struct BasicAuthConfig {
    pub username: String,
    pub password: String,

    /// Realm presented in the WWW-Authenticate challenge.
    #[serde(default = "default_realm")]
    pub realm: String,
}

fn default_realm() -> String {
    "lanshare".to_string()
}

impl Default for ServerOptions {
    fn default() -> Self {
        let cert_dir = default_cert_dir();
        Self {
            addr: "0.0.0.0:8443".to_string(),
            root: PathBuf::from("."),
            allow: Vec::new(),
            cert_path: cert_dir.join("cert.pem"),
            key_path: cert_dir.join("key.pem"),
            ca_cert_path: cert_dir.join("ca.pem"),
            quiet: false,
            read_timeout_secs: 0,
            write_timeout_secs: 0,
            idle_timeout_secs: 0,
            grace_secs: 0,
            max_header_bytes: 0,
            max_body_bytes: 0,
            auth: None,
        }
    }
}

impl ServerOptions {
    /// Read timeout with the default applied for zero/unset.
    pub fn read_timeout(&self) -> Duration {
        duration_or(self.read_timeout_secs, DEFAULT_READ_TIMEOUT_SECS)
    }

    /// Write timeout with the default applied for zero/unset.
    pub fn write_timeout(&self) -> Duration {
        duration_or(self.write_timeout_secs, DEFAULT_WRITE_TIMEOUT_SECS)
    }

    /// Idle timeout with the default applied for zero/unset.
    pub fn idle_timeout(&self) -> Duration {
        duration_or(self.idle_timeout_secs, DEFAULT_IDLE_TIMEOUT_SECS)
    }

    /// Shutdown grace period with the default applied for zero/unset.
    pub fn grace_period(&self) -> Duration {
        duration_or(self.grace_secs, DEFAULT_GRACE_SECS)
    }

    /// Maximum header size with the default applied for zero/unset.
    pub fn max_header_bytes(&self) -> usize {
        if self.max_header_bytes == 0 {
            DEFAULT_MAX_HEADER_BYTES
        } else {
            self.max_header_bytes
        }
    }

    /// Maximum body size with the default applied for zero/unset.
    pub fn max_body_bytes(&self) -> u64 {
        if self.max_body_bytes == 0 {
            DEFAULT_MAX_BODY_BYTES
        } else {
            self.max_body_bytes
        }
    }
}

/// Default directory for generated certificates (`~/.lanshare`).
pub fn default_cert_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
        .join(".lanshare")
}

fn duration_or(secs: u64, default_secs: u64) -> Duration {
    Duration::from_secs(if secs == 0 { default_secs } else { secs })
}
