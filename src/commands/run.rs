use anyhow::Result;
use tracing::info;

use survey_coverage::{
    io::{open_source, CsvStatisticsWriter},
    write_coverage_maps, Basemap, CoverageCollector,
};

use crate::cli::{Cli, RunArgs};

pub fn run(cli: &Cli, args: &RunArgs) -> Result<()> {
    let config = super::load_config(cli)?;
    info!(
        input = %args.input.display(),
        maps = %args.map_dir.display(),
        stats = %args.stats_dir.display(),
        "run"
    );

    let basemap = Basemap::from_shapefile(&args.basemap, &config.columns.category, config.target_crs()?)?;

    let source = open_source(&args.input, &config.columns)?;
    let mut writer = CsvStatisticsWriter::new(&args.stats_dir, config.total_row_labels())?;
    let mut collector = CoverageCollector::new();
    let report = survey_coverage::run(source.as_ref(), &config, &mut writer, Some(&mut collector))?;

    let written = write_coverage_maps(&collector, &basemap, &config.map, &args.map_dir)?;

    print!("{}", report.overview.to_csv_string()?);
    println!("Wrote {} maps to {}", written.len(), args.map_dir.display());
    if !report.skipped.is_empty() {
        eprintln!("Skipped {} layer(s); rerun with -v for details.", report.skipped.len());
    }
    Ok(())
}
