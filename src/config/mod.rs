//! Configuration system (layered: defaults > config file > env > CLI flags).

use std::path::Path;
use std::time::Duration;

use bon::Builder;
use serde::Deserialize;

use crate::error::{ProbeError, Result};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8765;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const HOST_ENV: &str = "MCP_PROBE_HOST";
const PORT_ENV: &str = "MCP_PROBE_PORT";
const TIMEOUT_ENV: &str = "MCP_PROBE_TIMEOUT_SECS";

/// Where and how to reach the server under test.
///
/// ```
/// use mcp_probe::config::ProbeConfig;
///
/// let config = ProbeConfig::builder().port(9000).build();
/// assert_eq!(config.endpoint(), "http://localhost:9000/");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct ProbeConfig {
    #[builder(into, default = DEFAULT_HOST.to_string())]
    pub host: String,
    #[builder(default = DEFAULT_PORT)]
    pub port: u16,
    /// Upper bound on one request/reply exchange.
    #[builder(default = DEFAULT_TIMEOUT)]
    pub timeout: Duration,
    #[builder(into, default = "/".to_string())]
    pub path: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// On-disk shape of `--config` files. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    host: Option<String>,
    port: Option<u16>,
    timeout_secs: Option<u64>,
    path: Option<String>,
}

impl ProbeConfig {
    /// Defaults overlaid with `.env` and `MCP_PROBE_*` variables.
    pub fn from_env() -> Result<Self> {
        Self::default().with_dotenv(None)
    }

    /// Load a dotenv file into the process environment, then overlay
    /// `MCP_PROBE_*` variables.
    ///
    /// With no `path` the usual `.env` lookup runs and a missing file is
    /// fine. An explicit `path` must exist. Variables already set in the
    /// environment win over the file.
    pub fn with_dotenv(self, path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => dotenvy::from_path(path).map_err(|e| {
                ProbeError::Configuration(format!("cannot load {}: {e}", path.display()))
            })?,
            None => match dotenvy::dotenv() {
                Ok(_) => {}
                Err(e) if e.not_found() => {}
                Err(e) => return Err(ProbeError::Configuration(format!(".env: {e}"))),
            },
        }
        self.with_env()
    }

    /// Overlay values from a TOML file.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let file: FileConfig = toml::from_str(&raw)?;

        if let Some(host) = file.host {
            self.host = host;
        }
        if let Some(port) = file.port {
            self.port = port;
        }
        if let Some(secs) = file.timeout_secs {
            self.timeout = timeout_from_secs(secs)?;
        }
        if let Some(path) = file.path {
            self.path = path;
        }
        self.validate()
    }

    /// Overlay values from `MCP_PROBE_HOST`, `MCP_PROBE_PORT` and
    /// `MCP_PROBE_TIMEOUT_SECS`.
    pub fn with_env(mut self) -> Result<Self> {
        if let Ok(host) = std::env::var(HOST_ENV) {
            self.host = host;
        }
        if let Ok(port) = std::env::var(PORT_ENV) {
            self.port = port.trim().parse().map_err(|_| {
                ProbeError::Configuration(format!("{PORT_ENV} is not a valid port: '{port}'"))
            })?;
        }
        if let Ok(secs) = std::env::var(TIMEOUT_ENV) {
            let parsed = secs.trim().parse().map_err(|_| {
                ProbeError::Configuration(format!("{TIMEOUT_ENV} is not a whole number: '{secs}'"))
            })?;
            self.timeout = timeout_from_secs(parsed)?;
        }
        self.validate()
    }

    /// Full URL requests are POSTed to.
    pub fn endpoint(&self) -> String {
        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };
        format!("http://{}:{}{}", self.host, self.port, path)
    }

    fn validate(self) -> Result<Self> {
        if self.host.trim().is_empty() {
            return Err(ProbeError::Configuration("host must not be empty".into()));
        }
        if self.port == 0 {
            return Err(ProbeError::Configuration("port must be non-zero".into()));
        }
        Ok(self)
    }
}

fn timeout_from_secs(secs: u64) -> Result<Duration> {
    if secs == 0 {
        return Err(ProbeError::Configuration("timeout must be at least one second".into()));
    }
    Ok(Duration::from_secs(secs))
}

/// Serializes tests that touch `MCP_PROBE_*` variables.
#[cfg(test)]
pub(crate) fn env_lock_guard() -> std::sync::MutexGuard<'static, ()> {
    use std::sync::{Mutex, OnceLock};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn clear_env() {
        for key in [HOST_ENV, PORT_ENV, TIMEOUT_ENV] {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn defaults_point_at_local_plugin() {
        let config = ProbeConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 8765);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.endpoint(), "http://localhost:8765/");
    }

    #[test]
    fn endpoint_normalizes_relative_path() {
        let config = ProbeConfig::builder().host("10.0.0.2").path("rpc").build();
        assert_eq!(config.endpoint(), "http://10.0.0.2:8765/rpc");
    }

    #[test]
    fn env_overrides_defaults() {
        let _lock = env_lock_guard();
        clear_env();
        std::env::set_var(HOST_ENV, "godot.local");
        std::env::set_var(PORT_ENV, "9100");
        std::env::set_var(TIMEOUT_ENV, "12");

        let config = ProbeConfig::default().with_env().unwrap();
        clear_env();

        assert_eq!(config.host, "godot.local");
        assert_eq!(config.port, 9100);
        assert_eq!(config.timeout, Duration::from_secs(12));
    }

    #[test]
    fn env_rejects_garbage_port() {
        let _lock = env_lock_guard();
        clear_env();
        std::env::set_var(PORT_ENV, "eighty");

        let err = ProbeConfig::default().with_env().unwrap_err();
        clear_env();

        assert!(matches!(err, ProbeError::Configuration(_)));
        assert!(err.to_string().contains("MCP_PROBE_PORT"));
    }

    #[test]
    fn dotenv_file_feeds_env_layer() {
        let _lock = env_lock_guard();
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let dotenv = dir.path().join(".env");
        std::fs::write(&dotenv, "MCP_PROBE_PORT=9555\nMCP_PROBE_HOST=from-dotenv\n").unwrap();
        std::env::set_var(HOST_ENV, "from-shell");

        let config = ProbeConfig::default().with_dotenv(Some(dotenv.as_path())).unwrap();
        clear_env();

        assert_eq!(config.port, 9555);
        assert_eq!(config.host, "from-shell");
    }

    #[test]
    fn default_dotenv_is_read_from_working_directory() {
        let _lock = env_lock_guard();
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "MCP_PROBE_TIMEOUT_SECS=7\n").unwrap();
        let previous = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();

        let config = ProbeConfig::from_env();
        std::env::set_current_dir(previous).unwrap();
        clear_env();

        assert_eq!(config.unwrap().timeout, Duration::from_secs(7));
    }

    #[test]
    fn missing_explicit_dotenv_is_a_configuration_error() {
        let _lock = env_lock_guard();
        let dir = tempfile::tempdir().unwrap();

        let err = ProbeConfig::default()
            .with_dotenv(Some(dir.path().join("absent.env").as_path()))
            .unwrap_err();

        assert!(matches!(err, ProbeError::Configuration(_)));
    }

    #[test]
    fn file_layer_overrides_selected_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 9999\ntimeout_secs = 2").unwrap();

        let config = ProbeConfig::default().with_file(file.path()).unwrap();

        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 9999);
        assert_eq!(config.timeout, Duration::from_secs(2));
    }

    #[test]
    fn file_layer_rejects_unknown_keys_and_zero_timeout() {
        let mut unknown = tempfile::NamedTempFile::new().unwrap();
        writeln!(unknown, "prot = 1").unwrap();
        assert!(matches!(
            ProbeConfig::default().with_file(unknown.path()),
            Err(ProbeError::ConfigFile(_))
        ));

        let mut zero = tempfile::NamedTempFile::new().unwrap();
        writeln!(zero, "timeout_secs = 0").unwrap();
        assert!(matches!(
            ProbeConfig::default().with_file(zero.path()),
            Err(ProbeError::Configuration(_))
        ));
    }
}
