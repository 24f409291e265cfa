//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - installs logging
//! - parses CLI arguments
//! - loads series through the loader registry
//! - prints tables/plots
//! - writes optional exports

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, LoadArgs, PlotArgs, SourceArgs};
use crate::config::DataConfig;
use crate::domain::{LabeledSeries, Scope, Source};
use crate::error::AppError;
use crate::patch::{NoPatch, Patch, WorldPatcher};
use crate::plot::PlotStyle;
use crate::refresh::{GitRefresher, Refresh};

pub mod pipeline;

/// Entry point for the `covid` binary.
pub fn run() -> Result<(), AppError> {
    init_tracing();
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Load(args) => handle_load(cli.data_dir, args),
        Command::Plot(args) => handle_plot(cli.data_dir, args),
        Command::Refresh(args) => handle_refresh(cli.data_dir, args),
        Command::Patch(args) => handle_patch(cli.data_dir, args),
    }
}

/// Log to stderr so stdout carries only tables and charts.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_load(data_dir: Option<PathBuf>, args: LoadArgs) -> Result<(), AppError> {
    let scope = Scope::from_parts(args.region.clone(), args.province.clone(), args.country.clone())?;
    let source = args.data.source;

    let mut registry = pipeline::build_registry(data_dir, &args.data);
    let series = pipeline::load_series(&mut registry, source, &args.field, &[scope])?;

    for s in &series {
        println!("{}", crate::report::format_series_table(s));
    }

    // Optional exports.
    if let Some(path) = &args.export {
        crate::io::export::write_series_csv(path, &series)?;
        info!("Wrote {}", path.display());
    }
    if let (Some(path), Some(s)) = (&args.export_json, series.first()) {
        crate::io::series::write_series_json(path, source, s)?;
        info!("Wrote {}", path.display());
    }

    Ok(())
}

fn handle_plot(data_dir: Option<PathBuf>, args: PlotArgs) -> Result<(), AppError> {
    let scopes = pipeline::plot_scopes(&args);

    let mut series: Vec<LabeledSeries> = Vec::new();
    match (&args.field, scopes.is_empty()) {
        (Some(field), false) => {
            let mut registry = pipeline::build_registry(data_dir, &args.data);
            series.extend(pipeline::load_series(&mut registry, args.data.source, field, &scopes)?);
        }
        (None, false) if args.input.is_empty() => {
            return Err(AppError::new(2, "Nothing to plot: give a FIELD or --input files."));
        }
        (None, false) => {
            return Err(AppError::new(2, "Scope flags need a FIELD to resolve."));
        }
        (_, true) => {}
    }
    for path in &args.input {
        series.push(crate::io::series::read_series_json(path)?.series);
    }
    if series.is_empty() {
        return Err(AppError::new(2, "Nothing to plot: give a FIELD or --input files."));
    }

    println!("{}", crate::report::format_summary(&series));
    println!("{}", crate::plot::render_ascii_chart(&series, args.width, args.height));

    if let Some(path) = &args.svg {
        let style = PlotStyle {
            title: args.title.clone(),
            y_desc: args.field.clone().unwrap_or_default(),
            ..PlotStyle::default()
        };
        crate::plot::render_svg_chart(path, &series, &style)?;
        info!("Wrote {}", path.display());
    }

    Ok(())
}

fn handle_refresh(data_dir: Option<PathBuf>, args: SourceArgs) -> Result<(), AppError> {
    let config = DataConfig::from_env(data_dir);
    for source in args.sources() {
        GitRefresher::new(config.repo(source).clone())
            .refresh(source)
            .map_err(|e| AppError::new(4, e.to_string()))?;
    }
    Ok(())
}

fn handle_patch(data_dir: Option<PathBuf>, args: SourceArgs) -> Result<(), AppError> {
    let config = DataConfig::from_env(data_dir);
    for source in args.sources() {
        let patcher: Box<dyn Patch> = match source {
            Source::Italy => Box::new(NoPatch),
            Source::World => Box::new(WorldPatcher::new(config.root())),
        };
        info!("Patch {} data ...", source.display_name());
        patcher.patch(source)?;
    }
    Ok(())
}
