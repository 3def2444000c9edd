//! Coverage maps: survey features over a land-cover basemap, as SVG.

mod basemap;
mod collect;
mod map;

pub use basemap::{category_color, Basemap, BasemapFeature};
pub use collect::{CoverageCollector, CoverageFeature};
pub use map::{availability_color, availability_label, write_coverage_maps, CoverageMap};
