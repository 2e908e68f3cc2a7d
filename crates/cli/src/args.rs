//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Where the consumption events come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "stockcast")]
#[command(about = "Forecast item consumption from a JSON array of {timestamp, quantity} events", long_about = None)]
pub struct Args {
    /// Events file; stdin when omitted or '-'
    #[arg(value_name = "EVENTS_JSON")]
    pub input: Option<PathBuf>,

    /// Days to forecast; overrides STOCKCAST_HORIZON_DAYS
    #[arg(long, value_name = "DAYS")]
    pub horizon: Option<u32>,

    /// Item name echoed in the report
    #[arg(long, value_name = "NAME")]
    pub item: Option<String>,

    /// Current stock; the report then projects stock after the horizon
    #[arg(long, value_name = "QUANTITY", allow_negative_numbers = true)]
    pub stock: Option<i64>,
}

impl Args {
    pub fn source(&self) -> Input {
        match &self.input {
            Some(path) if path.as_os_str() != "-" => Input::File(path.clone()),
            _ => Input::Stdin,
        }
    }
}
