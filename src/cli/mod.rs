//! Command-line parsing for the COVID-19 time-series tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the loading/resolution code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::Source;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "covid", version, about = "COVID-19 time series: load, derive and plot")]
pub struct Cli {
    /// Data root holding the upstream repositories (overrides COVID_DATA_DIR).
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve one field for one scope and print it as a table.
    Load(LoadArgs),
    /// Plot one field for several scopes (or saved series) in the terminal.
    Plot(PlotArgs),
    /// Clone or pull the upstream data repositories.
    Refresh(SourceArgs),
    /// Apply the known fixes to the on-disk snapshot files.
    Patch(SourceArgs),
}

/// Options controlling how data is prepared before the first load.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Data source.
    #[arg(long, value_enum, default_value_t = Source::Italy)]
    pub source: Source,

    /// Label days as MM-DD instead of YYYY-MM-DD.
    #[arg(long)]
    pub short_dates: bool,

    /// Use the local data as-is (skip the git pull).
    #[arg(long)]
    pub no_refresh: bool,

    /// Apply the known fixes to the snapshot files before loading.
    #[arg(long)]
    pub patch: bool,
}

#[derive(Debug, Args, Clone)]
pub struct LoadArgs {
    /// Field to resolve, e.g. `totale_casi`, `incremento_relativo_totale_casi`,
    /// `percentuale_tamponi_positivi`, `increase_Confirmed`.
    pub field: String,

    #[command(flatten)]
    pub data: DataArgs,

    /// Whole-country total (the default when no other scope is given).
    #[arg(long, conflicts_with_all = ["region", "province", "country"])]
    pub national: bool,

    /// Region name, e.g. `Lombardia`.
    #[arg(long)]
    pub region: Option<String>,

    /// Province name, e.g. `Bergamo` (or a world province/state).
    #[arg(long)]
    pub province: Option<String>,

    /// Country name (world source).
    #[arg(long)]
    pub country: Option<String>,

    /// Export the series to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the series to JSON (readable by `covid plot --input`).
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// Field to resolve for every scope.
    pub field: Option<String>,

    #[command(flatten)]
    pub data: DataArgs,

    /// Include the whole-country total.
    #[arg(long)]
    pub national: bool,

    /// Region to include (repeatable).
    #[arg(long)]
    pub region: Vec<String>,

    /// Province to include (repeatable).
    #[arg(long)]
    pub province: Vec<String>,

    /// Country to include (repeatable, world source).
    #[arg(long)]
    pub country: Vec<String>,

    /// Saved series JSON to include (repeatable).
    #[arg(long, value_name = "JSON")]
    pub input: Vec<PathBuf>,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Also render the chart to an SVG file.
    #[arg(long, value_name = "PATH")]
    pub svg: Option<PathBuf>,

    /// Chart title (SVG).
    #[arg(long)]
    pub title: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Source to act on (all sources when omitted).
    #[arg(long, value_enum)]
    pub source: Option<Source>,
}

impl SourceArgs {
    pub fn sources(&self) -> Vec<Source> {
        match self.source {
            Some(source) => vec![source],
            None => Source::ALL.to_vec(),
        }
    }
}
