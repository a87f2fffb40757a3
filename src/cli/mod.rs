//! Command-line surface.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::ProbeConfig;
use crate::error::Result;
use crate::runner::Suite;

/// Probe a Godot MCP server and report which calls behave.
#[derive(Parser, Debug)]
#[command(name = "mcp-probe", version, about = "Conformance probe for the Godot MCP server")]
pub struct Cli {
    /// Server host (default: localhost)
    #[arg(long)]
    pub host: Option<String>,

    /// Server port (default: 8765)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Per-request timeout in seconds (default: 5)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// TOML file with host, port, timeout_secs and path keys
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Dotenv file to load instead of `./.env`
    #[arg(long)]
    pub env_file: Option<PathBuf>,

    /// Which step script to run
    #[arg(short, long, value_enum, default_value_t = SuiteChoice::Smoke)]
    pub suite: SuiteChoice,

    /// Output format on stdout
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Console)]
    pub format: OutputFormat,

    /// Also write JSON-lines events to this file
    #[arg(long)]
    pub report_file: Option<PathBuf>,

    /// Log requests and classifications to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SuiteChoice {
    Smoke,
    Features,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Console,
    Json,
}

impl SuiteChoice {
    pub fn suites(self) -> Vec<Suite> {
        match self {
            Self::Smoke => vec![crate::suites::smoke()],
            Self::Features => vec![crate::suites::features()],
            Self::All => vec![crate::suites::smoke(), crate::suites::features()],
        }
    }
}

impl Cli {
    /// Layer config file, environment and flags over the defaults.
    pub fn resolve_config(&self) -> Result<ProbeConfig> {
        let mut config = ProbeConfig::default();
        if let Some(path) = &self.config {
            config = config.with_file(path)?;
        }
        let mut config = config.with_dotenv(self.env_file.as_deref())?;

        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(secs) = self.timeout {
            config.timeout = std::time::Duration::from_secs(secs);
        }
        Ok(config)
    }
}
