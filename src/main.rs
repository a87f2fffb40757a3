//! mcp-probe binary entry point.

use std::fs::File;
use std::io::BufWriter;

use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use mcp_probe::cli::{Cli, OutputFormat};
use mcp_probe::client::ProbeClient;
use mcp_probe::report::{ConsoleReporter, JsonReporter, Reporter};
use mcp_probe::runner::SuiteSummary;

fn init_tracing(verbose: bool) {
    let default = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    let env_filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(summary) => std::process::exit(summary.exit_code()),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    }
}

async fn run(cli: Cli) -> mcp_probe::error::Result<SuiteSummary> {
    let config = cli.resolve_config()?;
    let client = ProbeClient::from_config(&config)?;

    let mut reporters: Vec<Box<dyn Reporter>> = Vec::new();
    match cli.format {
        OutputFormat::Console => reporters.push(Box::new(ConsoleReporter::stdout())),
        OutputFormat::Json => reporters.push(Box::new(JsonReporter::new(std::io::stdout()))),
    }
    if let Some(path) = &cli.report_file {
        let file = File::create(path)?;
        reporters.push(Box::new(JsonReporter::new(BufWriter::new(file))));
    }

    let mut summary = SuiteSummary::default();
    for suite in cli.suite.suites() {
        summary.merge(suite.run(&client, &mut reporters).await);
    }
    Ok(summary)
}
