use anyhow::Result;
use tracing::info;

use survey_coverage::io::{open_source, CsvStatisticsWriter};

use crate::cli::{Cli, StatsArgs};

pub fn run(cli: &Cli, args: &StatsArgs) -> Result<()> {
    let config = super::load_config(cli)?;
    info!(input = %args.input.display(), out = %args.stats_dir.display(), "stats");

    let source = open_source(&args.input, &config.columns)?;
    let mut writer = CsvStatisticsWriter::new(&args.stats_dir, config.total_row_labels())?;
    let report = survey_coverage::run(source.as_ref(), &config, &mut writer, None)?;

    print!("{}", report.overview.to_csv_string()?);
    if !report.skipped.is_empty() {
        eprintln!("Skipped {} layer(s); rerun with -v for details.", report.skipped.len());
    }
    Ok(())
}
