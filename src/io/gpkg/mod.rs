//! GeoPackage input.

mod read;

pub use read::GeoPackage;
