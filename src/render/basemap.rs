use std::path::Path;

use anyhow::{bail, Context, Result};
use geo::Geometry;
use tracing::debug;

use crate::{
    geom::{Crs, Reprojector},
    io::shp::{crs_from_prj, field_to_string, find_field, read_shapes_and_records, shape_to_geometry},
};

/// Fill color of a basemap category; unknown or missing categories are grey.
pub fn category_color(category: Option<&str>) -> &'static str {
    match category {
        Some("Ocean") => "#a3bdd1",
        Some("Ice shelf") => "#cfe1eb",
        Some("Land") => "#f0f0f0",
        Some("Sub-antarctic_G") => "lightgreen",
        Some("Sub-antarctic_L") => "lightblue",
        Some("Ice tongue") => "lightgrey",
        Some("Rumple") => "yellow",
        _ => "grey",
    }
}

/// One land-cover polygon of the basemap.
#[derive(Debug, Clone, PartialEq)]
pub struct BasemapFeature {
    pub geometry: Geometry<f64>,
    pub category: Option<String>,
}

/// Background polygons drawn beneath the survey features.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Basemap {
    features: Vec<BasemapFeature>,
}

impl Basemap {
    pub fn new(features: Vec<BasemapFeature>) -> Self {
        Self { features }
    }

    /// Read a basemap shapefile, coloured by `category_column`, expressed in `target`.
    ///
    /// A basemap without the category column cannot be coloured and is rejected.
    pub fn from_shapefile(path: &Path, category_column: &str, target: Crs) -> Result<Self> {
        let items = read_shapes_and_records(path)?;

        if let Some((_, record)) = items.first() {
            if find_field(record, category_column).is_none() {
                bail!("[render::basemap] Basemap {} has no {:?} column", path.display(), category_column);
            }
        }

        let reprojector = match crs_from_prj(path)? {
            Some(source) if source != target => Some(Reprojector::new(source, target)?),
            _ => None,
        };

        let features = items.into_iter()
            .map(|(shape, record)| {
                let mut geometry = shape_to_geometry(shape);
                if let Some(reprojector) = &reprojector {
                    geometry = reprojector.reproject(&geometry)
                        .with_context(|| format!("[render::basemap] Failed to reproject {}", path.display()))?;
                }
                Ok(BasemapFeature { geometry, category: find_field(&record, category_column).and_then(field_to_string) })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(path = %path.display(), features = features.len(), "read basemap");
        Ok(Self { features })
    }

    #[inline] pub fn features(&self) -> &[BasemapFeature] { &self.features }

    #[inline] pub fn is_empty(&self) -> bool { self.features.is_empty() }
}
