//! SVG format writing operations for coverage maps.

mod geometry;
mod writer;

pub(crate) use geometry::*;
pub(crate) use writer::*;
