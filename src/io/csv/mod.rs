//! CSV output of statistics tables.

mod write;

pub use write::CsvStatisticsWriter;
