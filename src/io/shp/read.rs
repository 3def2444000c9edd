//! Shapefile reading: one `.shp` file per layer.

use std::{fs, path::{Path, PathBuf}};

use anyhow::{bail, Context, Result};
use geo::{Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use shapefile::{dbase::{FieldValue, Record}, Reader, Shape};
use tracing::debug;

use crate::{
    config::ColumnNames,
    geom::Crs,
    io::{shp::prj::crs_from_prj, source::LayerSource},
    layer::{Layer, LayerSchema, SurveyRecord},
};

/// A directory whose `*.shp` files are the layers, ordered by file name.
pub struct ShapefileDir {
    dir: PathBuf,
    columns: ColumnNames,
}

/// Ensure first and last are the same for geo::LineString coords
fn ensure_closed(coords: &mut Vec<Coord<f64>>) {
    if let (Some(&first), Some(&last)) = (coords.first(), coords.last()) {
        if first != last { coords.push(first) }
    }
}

/// Twice the signed area of a ring (negative for clockwise).
fn signed_area(pts: &[Coord<f64>]) -> f64 {
    pts.windows(2).map(|w| w[0].x * w[1].y - w[1].x * w[0].y).sum()
}

/// Group shapefile rings into polygons: clockwise rings are exteriors, each followed by its holes.
fn rings_to_multipolygon(rings: Vec<Vec<Coord<f64>>>) -> MultiPolygon<f64> {
    let mut polys = Vec::new();
    let mut current_exterior: Option<LineString<f64>> = None;
    let mut current_holes = Vec::new();

    for mut coords in rings {
        ensure_closed(&mut coords);
        let is_exterior = signed_area(&coords) < 0.0;
        let ring = LineString(coords);
        if is_exterior {
            if let Some(exterior) = current_exterior.replace(ring) {
                polys.push(Polygon::new(exterior, std::mem::take(&mut current_holes)));
            }
        } else {
            current_holes.push(ring);
        }
    }
    if let Some(exterior) = current_exterior {
        polys.push(Polygon::new(exterior, current_holes));
    }

    MultiPolygon(polys)
}

/// Single-part polylines become line strings; multi-part ones stay multi.
fn parts_to_geometry(mut parts: Vec<Vec<Coord<f64>>>) -> Geometry<f64> {
    match parts.len() {
        1 => Geometry::LineString(LineString(parts.remove(0))),
        _ => Geometry::MultiLineString(MultiLineString(parts.into_iter().map(LineString).collect())),
    }
}

/// Convert any shapefile shape into a geo geometry, dropping Z and M.
pub(crate) fn shape_to_geometry(shape: Shape) -> Geometry<f64> {
    macro_rules! coords {
        ($points:expr) => { $points.iter().map(|pt| Coord { x: pt.x, y: pt.y }).collect::<Vec<_>>() };
    }

    match shape {
        Shape::Point(p) => Geometry::Point(Point::new(p.x, p.y)),
        Shape::PointM(p) => Geometry::Point(Point::new(p.x, p.y)),
        Shape::PointZ(p) => Geometry::Point(Point::new(p.x, p.y)),
        Shape::Multipoint(mp) => Geometry::MultiPoint(MultiPoint::from(coords!(mp.points()))),
        Shape::MultipointM(mp) => Geometry::MultiPoint(MultiPoint::from(coords!(mp.points()))),
        Shape::MultipointZ(mp) => Geometry::MultiPoint(MultiPoint::from(coords!(mp.points()))),
        Shape::Polyline(pl) => parts_to_geometry(pl.parts().iter().map(|part| coords!(part)).collect()),
        Shape::PolylineM(pl) => parts_to_geometry(pl.parts().iter().map(|part| coords!(part)).collect()),
        Shape::PolylineZ(pl) => parts_to_geometry(pl.parts().iter().map(|part| coords!(part)).collect()),
        Shape::Polygon(p) => Geometry::MultiPolygon(rings_to_multipolygon(p.rings().iter().map(|r| coords!(r.points())).collect())),
        Shape::PolygonM(p) => Geometry::MultiPolygon(rings_to_multipolygon(p.rings().iter().map(|r| coords!(r.points())).collect())),
        Shape::PolygonZ(p) => Geometry::MultiPolygon(rings_to_multipolygon(p.rings().iter().map(|r| coords!(r.points())).collect())),
        Shape::NullShape | Shape::Multipatch(_) => Geometry::GeometryCollection(GeometryCollection(Vec::new())),
    }
}

/// Stringify a dBase cell; blank and null values become `None`.
pub(crate) fn field_to_string(value: &FieldValue) -> Option<String> {
    let text = match value {
        FieldValue::Character(Some(s)) | FieldValue::Memo(s) => s.trim().to_string(),
        // Whole numbers print without a fraction so years read as `2019`.
        FieldValue::Numeric(Some(n)) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
        FieldValue::Numeric(Some(n)) => n.to_string(),
        FieldValue::Float(Some(f)) => f.to_string(),
        FieldValue::Double(d) => d.to_string(),
        FieldValue::Integer(i) => i.to_string(),
        FieldValue::Logical(Some(b)) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Longest field name a dBase table can hold; exporters truncate longer column names.
const DBASE_FIELD_NAME_LEN: usize = 10;

/// Look up `column` in a dBase record, falling back to its truncated field name
/// (`availability` is stored as `availabili`).
pub(crate) fn find_field<'r>(record: &'r Record, column: &str) -> Option<&'r FieldValue> {
    record.get(column).or_else(|| {
        let truncated = column.char_indices().nth(DBASE_FIELD_NAME_LEN).map(|(end, _)| &column[..end])?;
        record.get(truncated)
    })
}

/// Read every shape and record of one `.shp` file.
pub(crate) fn read_shapes_and_records(path: &Path) -> Result<Vec<(Shape, Record)>> {
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("[io::shp::read] Failed to open shapefile: {}", path.display()))?;

    let mut items = Vec::new();
    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result
            .with_context(|| format!("[io::shp::read] Error reading shape+record in {}", path.display()))?;
        items.push((shape, record));
    }
    Ok(items)
}

impl ShapefileDir {
    pub fn open(dir: &Path, columns: ColumnNames) -> Result<Self> {
        if !dir.is_dir() {
            bail!("[io::shp::read] Not a directory: {}", dir.display());
        }
        Ok(Self { dir: dir.to_path_buf(), columns })
    }

    fn layer_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.shp"))
    }
}

impl LayerSource for ShapefileDir {
    fn layer_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("[io::shp::read] Failed to list {}", self.dir.display()))?
        {
            let path = entry?.path();
            let is_shp = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("shp"));
            if let (true, Some(stem)) = (is_shp, path.file_stem().and_then(|s| s.to_str())) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn read_layer(&self, name: &str) -> Result<Layer> {
        let path = self.layer_path(name);
        let crs: Option<Crs> = crs_from_prj(&path)?;
        let items = read_shapes_and_records(&path)?;

        // dBase records carry every field, so the first one tells which columns exist.
        let schema = items.first()
            .map(|(_, record)| LayerSchema {
                has_institution: find_field(record, &self.columns.institution).is_some(),
                has_campaign: find_field(record, &self.columns.campaign).is_some(),
                has_availability: find_field(record, &self.columns.availability).is_some(),
            })
            .unwrap_or_default();

        let field = |record: &Record, column: &str| find_field(record, column).and_then(field_to_string);
        let records = items.into_iter()
            .map(|(shape, record)| SurveyRecord {
                geometry: shape_to_geometry(shape),
                institution: field(&record, &self.columns.institution),
                campaign: field(&record, &self.columns.campaign),
                availability: field(&record, &self.columns.availability),
            })
            .collect::<Vec<_>>();

        debug!(layer = %name, records = records.len(), crs = ?crs, "read shapefile layer");
        Ok(Layer::new(name, crs, schema, records))
    }
}
