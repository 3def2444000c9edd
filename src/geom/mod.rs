mod crs;
mod distance;
mod proj;

pub use crs::Crs;
pub use distance::distance_km;
pub use proj::normalize_layer;
pub(crate) use proj::Reprojector;
