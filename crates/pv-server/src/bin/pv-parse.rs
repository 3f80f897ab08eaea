//! pv-parse: parse a complete trace file and print every recognized event.
//!
//! Usage: `pv-parse <trace-file>`. Events are written to stdout as pretty
//! JSON; a summary is logged to stderr.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use pv_trace_tools::parse_lines;
use pv_trace_tools::source::read_lines;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let path = std::env::args()
        .nth(1)
        .context("usage: pv-parse <trace-file>")?;

    let lines = read_lines(&path).await?;
    let events = parse_lines(&lines);

    for event in &events {
        println!("{}", serde_json::to_string_pretty(event)?);
    }

    tracing::info!(
        path = %path,
        lines = lines.len(),
        events = events.len(),
        "trace file parsed"
    );
    Ok(())
}
