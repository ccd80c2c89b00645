//! Density choropleth command-line front end.
//!
//! # Commands
//!
//! - `density run` - Join points to polygons, classify densities, write a map document
//! - `density breaks` - Classify a JSON array of numbers and print the breaks
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

mod breaks;
mod logging;
mod run;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Point-density choropleths from GeoJSON
#[derive(Parser)]
#[command(name = "density")]
#[command(about = "Point-density choropleth pipeline", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline over point and polygon GeoJSON files
    Run(run::RunArgs),

    /// Compute class breaks for a list of values
    Breaks(breaks::BreaksArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Run(args) => run::run(&args),
        Commands::Breaks(args) => breaks::run(&args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "density",
            "run",
            "--points",
            "p.geojson",
            "--polygons",
            "t.geojson",
            "--classifier",
            "quantile",
            "--tie-rule",
            "lowest-id",
            "--output",
            "map.json",
        ])
        .unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.classifier, Some(density::ClassifierKind::Quantile));
        assert_eq!(args.tie_rule, Some(density::BoundaryRule::LowestId));
        assert_eq!(args.epsg, 4326);
    }

    #[test]
    fn test_unknown_classifier_rejected() {
        let parsed = Cli::try_parse_from(["density", "breaks", "v.json", "--classifier", "jenks-ish"]);
        assert!(parsed.is_err());
    }
}
