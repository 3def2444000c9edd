use anyhow::Result;
use tracing::info;

use survey_coverage::{collect_coverage, io::open_source, write_coverage_maps, Basemap, CoverageCollector};

use crate::cli::{Cli, MapsArgs};

pub fn run(cli: &Cli, args: &MapsArgs) -> Result<()> {
    let config = super::load_config(cli)?;
    info!(input = %args.input.display(), basemap = %args.basemap.display(), out = %args.map_dir.display(), "maps");

    // Read the basemap first so a bad one fails before the layers are processed.
    let basemap = Basemap::from_shapefile(&args.basemap, &config.columns.category, config.target_crs()?)?;

    let source = open_source(&args.input, &config.columns)?;
    let mut collector = CoverageCollector::new();
    let skipped = collect_coverage(source.as_ref(), &config, &mut collector)?;

    let written = write_coverage_maps(&collector, &basemap, &config.map, &args.map_dir)?;
    println!("Wrote {} maps to {}", written.len(), args.map_dir.display());
    if !skipped.is_empty() {
        eprintln!("Skipped {} layer(s); rerun with -v for details.", skipped.len());
    }
    Ok(())
}
