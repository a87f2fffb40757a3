//! mcp-probe: drives a JSON-RPC tool server through a fixed script of calls
//! and reports which ones behaved.
//!
//! Every exchange is classified into exactly one of `transport_error`,
//! `protocol_error`, `tool_error` or `success`; steps declare which of those
//! they accept, and a suite runs every step regardless of earlier failures.
//!
//! ```no_run
//! use mcp_probe::client::ProbeClient;
//! use mcp_probe::config::ProbeConfig;
//! use mcp_probe::report::ConsoleReporter;
//!
//! # async fn example() -> mcp_probe::error::Result<()> {
//! let client = ProbeClient::from_config(&ProbeConfig::default())?;
//! let summary = mcp_probe::suites::smoke()
//!     .run(&client, &mut ConsoleReporter::stdout())
//!     .await;
//! std::process::exit(summary.exit_code());
//! # }
//! ```

pub mod classify;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod prelude;
pub mod protocol;
pub mod report;
pub mod runner;
pub mod suites;
pub mod transport;
