//! Shapefile input: survey layers and the basemap.

mod prj;
mod read;

pub(crate) use prj::crs_from_prj;
pub(crate) use read::{field_to_string, find_field, read_shapes_and_records, shape_to_geometry};
pub use read::ShapefileDir;
