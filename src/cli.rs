use clap::{Args, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

/// Survey coverage statistics and maps
#[derive(Parser, Debug)]
#[command(name = "survey-coverage", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// JSON configuration file (column names, labels, target EPSG, map layout)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write per-institution statistics and the institution overview as CSV
    Stats(StatsArgs),

    /// Draw per-institution and overview coverage maps as SVG
    Maps(MapsArgs),

    /// Statistics and maps in one pass over the input
    Run(RunArgs),
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Input GeoPackage file, or a directory of shapefiles
    #[arg(value_hint = ValueHint::AnyPath)]
    pub input: PathBuf,

    /// Output directory for statistics_*.csv and institution_overview.csv
    #[arg(value_hint = ValueHint::DirPath)]
    pub stats_dir: PathBuf,
}

#[derive(Args, Debug)]
pub struct MapsArgs {
    /// Input GeoPackage file, or a directory of shapefiles
    #[arg(value_hint = ValueHint::AnyPath)]
    pub input: PathBuf,

    /// Basemap shapefile with a land-cover category column
    #[arg(value_hint = ValueHint::FilePath)]
    pub basemap: PathBuf,

    /// Output directory for Antarctica_coverage_*.svg
    #[arg(value_hint = ValueHint::DirPath)]
    pub map_dir: PathBuf,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Input GeoPackage file, or a directory of shapefiles
    #[arg(value_hint = ValueHint::AnyPath)]
    pub input: PathBuf,

    /// Basemap shapefile with a land-cover category column
    #[arg(value_hint = ValueHint::FilePath)]
    pub basemap: PathBuf,

    /// Output directory for coverage maps
    #[arg(value_hint = ValueHint::DirPath)]
    pub map_dir: PathBuf,

    /// Output directory for statistics CSVs
    #[arg(value_hint = ValueHint::DirPath)]
    pub stats_dir: PathBuf,
}
