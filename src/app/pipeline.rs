//! Shared "load pipeline" logic used by the `load` and `plot` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! options -> registry -> load per scope -> labeled series
//!
//! The commands can then focus on presentation (tables, charts, exports).

use std::path::PathBuf;

use crate::cli::{DataArgs, PlotArgs};
use crate::config::DataConfig;
use crate::domain::{LabelFormat, LabeledSeries, Scope, Source};
use crate::error::LoadError;
use crate::loader::{LoaderOptions, LoaderRegistry};

pub fn loader_options(data: &DataArgs) -> LoaderOptions {
    LoaderOptions {
        update_data: !data.no_refresh,
        apply_patches: data.patch,
        label_format: if data.short_dates {
            LabelFormat::MonthDay
        } else {
            LabelFormat::Full
        },
    }
}

/// Build the composition root for one command run.
pub fn build_registry(data_dir: Option<PathBuf>, data: &DataArgs) -> LoaderRegistry {
    LoaderRegistry::new(DataConfig::from_env(data_dir), loader_options(data))
}

/// Resolve `field` for each scope, in order. The first failure aborts.
pub fn load_series(
    registry: &mut LoaderRegistry,
    source: Source,
    field: &str,
    scopes: &[Scope],
) -> Result<Vec<LabeledSeries>, LoadError> {
    scopes
        .iter()
        .map(|scope| {
            let series = registry.load(source, field, scope)?;
            Ok(LabeledSeries {
                field: field.to_string(),
                scope: scope.clone(),
                series,
            })
        })
        .collect()
}

/// Scopes requested by `covid plot`, national first.
///
/// With no scope flag at all the national total is plotted.
pub fn plot_scopes(args: &PlotArgs) -> Vec<Scope> {
    let mut scopes = Vec::new();
    if args.national {
        scopes.push(Scope::National);
    }
    scopes.extend(args.region.iter().cloned().map(Scope::Region));
    scopes.extend(args.province.iter().cloned().map(Scope::Province));
    scopes.extend(args.country.iter().cloned().map(Scope::Country));

    if scopes.is_empty() && args.input.is_empty() {
        scopes.push(Scope::National);
    }
    scopes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use clap::Parser;

    fn plot_args(argv: &[&str]) -> PlotArgs {
        match Cli::parse_from(argv).command {
            Command::Plot(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn plot_scopes_in_flag_order() {
        let args = plot_args(&["covid", "plot", "totale_casi", "--region", "Lazio", "--national"]);
        assert_eq!(
            plot_scopes(&args),
            [Scope::National, Scope::Region("Lazio".to_string())]
        );
    }

    #[test]
    fn plot_defaults_to_national() {
        let args = plot_args(&["covid", "plot", "totale_casi"]);
        assert_eq!(plot_scopes(&args), [Scope::National]);

        let args = plot_args(&["covid", "plot", "--input", "saved.json"]);
        assert!(plot_scopes(&args).is_empty());
    }

    #[test]
    fn options_follow_flags() {
        let args = plot_args(&["covid", "plot", "totale_casi", "--no-refresh", "--patch", "--short-dates"]);
        let options = loader_options(&args.data);
        assert!(!options.update_data);
        assert!(options.apply_patches);
        assert_eq!(options.label_format, LabelFormat::MonthDay);
    }
}
