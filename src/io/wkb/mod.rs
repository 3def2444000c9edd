//! Well-Known Binary geometry decoding, including the GeoPackage blob header.

mod read;

#[cfg(test)]
pub(crate) mod write;

pub(crate) use read::*;
