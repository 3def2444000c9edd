use geo::{Coord, Geometry, MapCoords};
use proj4rs::{proj::Proj as Proj4, transform::transform};
use tracing::debug;

use crate::{error::CoverageError, geom::Crs, layer::Layer};

/// Coordinate transformation between two registered systems.
pub(crate) struct Reprojector {
    source: Crs,
    target: Crs,
    from: Proj4,
    to: Proj4,
}

impl Reprojector {
    pub(crate) fn new(source: Crs, target: Crs) -> Result<Self, CoverageError> {
        /// Build a proj4rs projection from the registry definition.
        fn build(crs: Crs, other: Crs) -> Result<Proj4, CoverageError> {
            let definition = crs.proj4();
            Proj4::from_proj_string(definition)
                .map_err(|e| CoverageError::Projection {
                    from: crs.to_string(),
                    to: other.to_string(),
                    message: format!("failed to build PROJ.4 {definition:?}: {e}"),
                })
        }

        Ok(Self { source, target, from: build(source, target)?, to: build(target, source)? })
    }

    /// Transform one coordinate (degrees in/out for geographic systems, metres otherwise).
    fn reproject_coord(&self, coord: Coord<f64>) -> Result<Coord<f64>, CoverageError> {
        let mut point = if self.source.is_geographic() {
            (coord.x.to_radians(), coord.y.to_radians(), 0.0)
        } else {
            (coord.x, coord.y, 0.0)
        };

        transform(&self.from, &self.to, &mut point)
            .map_err(|e| CoverageError::Projection {
                from: self.source.to_string(),
                to: self.target.to_string(),
                message: format!("({}, {}): {e}", coord.x, coord.y),
            })?;

        Ok(if self.target.is_geographic() {
            Coord { x: point.0.to_degrees(), y: point.1.to_degrees() }
        } else {
            Coord { x: point.0, y: point.1 }
        })
    }

    /// Reproject every coordinate of a geometry, failing on the first bad coordinate.
    pub(crate) fn reproject(&self, geometry: &Geometry<f64>) -> Result<Geometry<f64>, CoverageError> {
        geometry.try_map_coords(|coord| self.reproject_coord(coord))
    }
}

/// Express a layer in the `target` reference system.
///
/// A layer without CRS metadata is *assumed* to already be in `target`: it is
/// tagged, not reprojected, even if its coordinates say otherwise. A layer in
/// another system is reprojected; a layer already in `target` passes through.
pub fn normalize_layer(mut layer: Layer, target: Crs) -> Result<Layer, CoverageError> {
    match layer.crs {
        None => {
            debug!(layer = %layer.name, crs = %target, "no CRS metadata, assuming target");
            layer.crs = Some(target);
        }
        Some(source) if source == target => {}
        Some(source) => {
            debug!(layer = %layer.name, from = %source, to = %target, "reprojecting layer");
            let reprojector = Reprojector::new(source, target)?;
            for record in &mut layer.records {
                record.geometry = reprojector.reproject(&record.geometry)?;
            }
            layer.crs = Some(target);
        }
    }
    Ok(layer)
}
