//! CSV writing operations.

use std::{fs::File, path::{Path, PathBuf}};

use anyhow::{Context, Result};
use polars::{frame::DataFrame, io::SerWriter, prelude::CsvWriter};
use tracing::debug;

use crate::{
    common::{ensure_dir_exists, sanitize_file_name},
    pipeline::StatisticsSink,
    stats::{InstitutionTable, OverviewTable, TotalRowLabels},
};

/// Write a DataFrame to a CSV file.
pub(crate) fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("[io::csv::write] Failed to create CSV file: {}", path.display()))?;
    CsvWriter::new(file)
        .finish(df)
        .with_context(|| format!("[io::csv::write] Failed to write CSV to {:?}", path))
}

/// Write a DataFrame to a CSV string.
fn write_csv_string(df: &mut DataFrame) -> Result<String> {
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer)
        .finish(df)
        .with_context(|| "[io::csv::write] Failed to write CSV to string")?;
    String::from_utf8(buffer)
        .with_context(|| "[io::csv::write] CSV output is not valid UTF-8")
}

impl OverviewTable {
    /// The overview as CSV text, as written to `institution_overview.csv`.
    pub fn to_csv_string(&self) -> Result<String> {
        write_csv_string(&mut self.to_dataframe()?)
    }
}

/// Writes `statistics_{institution}.csv` on every snapshot (overwriting the
/// previous one) and `institution_overview.csv` at the end of the run.
pub struct CsvStatisticsWriter {
    dir: PathBuf,
    total_label: String,
    total_availability: String,
}

impl CsvStatisticsWriter {
    /// Create the writer, creating `dir` if needed.
    pub fn new(dir: &Path, labels: TotalRowLabels<'_>) -> Result<Self> {
        ensure_dir_exists(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            total_label: labels.campaign.to_string(),
            total_availability: labels.availability.to_string(),
        })
    }

    pub fn institution_path(&self, institution: &str) -> PathBuf {
        self.dir.join(format!("statistics_{}.csv", sanitize_file_name(institution)))
    }

    pub fn overview_path(&self) -> PathBuf {
        self.dir.join("institution_overview.csv")
    }
}

impl StatisticsSink for CsvStatisticsWriter {
    fn institution_table(&mut self, table: &InstitutionTable) -> Result<()> {
        let labels = TotalRowLabels { campaign: &self.total_label, availability: &self.total_availability };
        let mut df = table.to_dataframe(labels)?;
        let path = self.institution_path(&table.institution);
        write_csv(&mut df, &path)?;
        debug!(institution = %table.institution, path = %path.display(), "wrote institution statistics");
        Ok(())
    }

    fn overview(&mut self, overview: &OverviewTable) -> Result<()> {
        let mut df = overview.to_dataframe()?;
        write_csv(&mut df, &self.overview_path())
    }
}
