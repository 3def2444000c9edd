//! Geometry to SVG element conversion.

use std::io::Write;

use anyhow::Result;
use geo::{Coord, CoordsIter, Geometry, LineString, Point, Polygon};

/// Projection function: map coords -> SVG coords (x,y)
pub(crate) type Projection = dyn Fn(&Coord<f64>) -> (f64, f64);

/// Append a line as an SVG subpath: "M x,y L x,y ...", closed with `Z` for rings.
fn push_subpath(line: &LineString<f64>, project: &Projection, close: bool, out: &mut String) {
    let mut coords = line.coords_iter().map(|coord| project(&coord));
    if let Some((x, y)) = coords.next() {
        out.push_str(&format!(" M{x:.3},{y:.3}"));
        for (x, y) in coords {
            out.push_str(&format!(" L{x:.3},{y:.3}"));
        }
        if close { out.push('Z') }
    }
}

/// Build a compact SVG path string for polygons (exteriors + holes).
pub(crate) fn polygons_to_path<'a>(polygons: impl IntoIterator<Item = &'a Polygon<f64>>, project: &Projection) -> String {
    let mut out = String::new();
    for polygon in polygons {
        push_subpath(polygon.exterior(), project, true, &mut out);
        for interior in polygon.interiors() {
            push_subpath(interior, project, true, &mut out);
        }
    }
    out
}

/// Build a compact SVG path string for open lines.
pub(crate) fn lines_to_path<'a>(lines: impl IntoIterator<Item = &'a LineString<f64>>, project: &Projection) -> String {
    let mut out = String::new();
    for line in lines {
        push_subpath(line, project, false, &mut out);
    }
    out
}

fn write_circles<'a>(writer: &mut impl Write, points: impl IntoIterator<Item = &'a Point<f64>>, radius: f64, project: &Projection) -> Result<()> {
    for point in points {
        let (cx, cy) = project(&point.0);
        writeln!(writer, r#"<circle class="point" cx="{cx:.3}" cy="{cy:.3}" r="{radius}"/>"#)?;
    }
    Ok(())
}

fn write_path(writer: &mut impl Write, class: &str, d: &str) -> Result<()> {
    if !d.is_empty() {
        writeln!(writer, r#"<path class="{class}" d="{d}"/>"#)?;
    }
    Ok(())
}

/// Draw one geometry: lines as stroked paths, points as circles, polygons as filled paths.
/// Colors come from the enclosing group.
pub(crate) fn draw_geometry(writer: &mut impl Write, geometry: &Geometry<f64>, point_radius: f64, project: &Projection) -> Result<()> {
    match geometry {
        Geometry::Point(p) => write_circles(writer, [p], point_radius, project),
        Geometry::MultiPoint(mp) => write_circles(writer, &mp.0, point_radius, project),
        Geometry::Line(l) => write_path(writer, "line", &lines_to_path([&LineString::from(*l)], project)),
        Geometry::LineString(l) => write_path(writer, "line", &lines_to_path([l], project)),
        Geometry::MultiLineString(ml) => write_path(writer, "line", &lines_to_path(&ml.0, project)),
        Geometry::Polygon(p) => write_path(writer, "area", &polygons_to_path([p], project)),
        Geometry::MultiPolygon(mp) => write_path(writer, "area", &polygons_to_path(&mp.0, project)),
        Geometry::Rect(r) => write_path(writer, "area", &polygons_to_path([&r.to_polygon()], project)),
        Geometry::Triangle(t) => write_path(writer, "area", &polygons_to_path([&t.to_polygon()], project)),
        Geometry::GeometryCollection(gc) => {
            for member in &gc.0 {
                draw_geometry(writer, member, point_radius, project)?;
            }
            Ok(())
        }
    }
}
