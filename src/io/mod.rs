//! IO module for format-specific reading and writing operations.
//!
//! Organized by format rather than by domain:
//!
//! - `source` - the [`LayerSource`] seam the pipeline reads through
//! - `gpkg` - GeoPackage feature tables (SQLite)
//! - `shp` - directories of shapefiles, `.prj` EPSG detection
//! - `wkb` - WKB and GeoPackage geometry blobs
//! - `csv` - statistics tables
//! - `svg` - coverage map drawing primitives

pub(crate) mod csv;
pub(crate) mod gpkg;
pub(crate) mod shp;
pub(crate) mod source;
pub(crate) mod svg;
pub(crate) mod wkb;

pub use csv::CsvStatisticsWriter;
pub use gpkg::GeoPackage;
pub use shp::ShapefileDir;
pub use source::{open_source, InMemorySource, LayerSource};
