use anyhow::Context;
use clap::Parser;

use stockcast_cli::settings::log_format_from_env;
use stockcast_cli::{Args, Settings, parse_events, read_input, run};

fn main() -> anyhow::Result<()> {
    let (log_format, bad_format) = log_format_from_env();
    stockcast_observability::init_with(log_format);
    if let Some(raw) = bad_format {
        tracing::warn!(value = %raw, "unknown STOCKCAST_LOG_FORMAT; using json");
    }

    let args = Args::parse();

    let settings = Settings::from_env();
    let raw = read_input(&args.source())?;
    let events = parse_events(&raw)?;

    let report = run(&args, &settings, &events)?;
    let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
    println!("{json}");
    Ok(())
}
